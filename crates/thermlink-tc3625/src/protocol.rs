//! TC-36-25 frame codec: checksummed ASCII request/response frames.
//!
//! The controller speaks a fixed-layout ASCII protocol over the serial
//! link. Every exchange is one 16-byte request and one 12-byte response.
//!
//! # Request format (16 bytes)
//!
//! ```text
//! '*' | "00" | CC | VVVVVVVV | KK | '\r'
//! ```
//!
//! - `'*'`: start marker.
//! - `"00"`: device address. The controller's multi-drop addressing is a
//!   reserved feature; every unit answers at `00`.
//! - `CC`: two lowercase hex characters selecting the register.
//! - `VVVVVVVV`: the value as 8 lowercase hex digits of its 32-bit
//!   two's-complement representation (`00000000` for reads).
//! - `KK`: checksum, two lowercase hex digits.
//!
//! # Response format (12 bytes)
//!
//! ```text
//! '*' | VVVVVVVV | KK | '\r'
//! ```
//!
//! plus two sentinel shapes: twelve zero bytes when nothing answered
//! within the response window, and the literal `*XXXXXXXXc0\r` when the
//! controller rejected the request's checksum.
//!
//! # Checksum
//!
//! The low byte of the sum of the ASCII codes of the covered characters:
//! address + command + value on requests, the 8 value digits on responses.
//! The start marker, the checksum itself, and the terminator are never
//! covered.
//!
//! # Value signedness
//!
//! The 8 hex digits are read as a 32-bit two's-complement signed value,
//! making [`decode_response`] the exact inverse of [`encode_command`] for
//! every `i32`. Registers holding raw ADC counts stay well below the sign
//! boundary, so they are unaffected.
//!
//! All functions here are pure; no I/O is performed.

use bytes::{BufMut, BytesMut};
use thermlink_core::{Error, Result};

/// Request/response start marker byte.
pub const START: u8 = b'*';

/// Frame terminator byte.
pub const TERMINATOR: u8 = b'\r';

/// Fixed device address field; multi-drop addressing is reserved.
pub const DEVICE_ADDRESS: &[u8; 2] = b"00";

/// Exact length of every request frame.
pub const REQUEST_LEN: usize = 16;

/// Exact length of every response frame.
pub const RESPONSE_LEN: usize = 12;

/// Literal response sent when the controller rejects a request checksum.
pub const CHECKSUM_REJECTED: &[u8; RESPONSE_LEN] = b"*XXXXXXXXc0\r";

/// A two-character register code, e.g. `01` (INPUT1) or `1c` (fixed
/// desired control setting).
///
/// The controller's register space is a single byte written as two
/// lowercase hex characters. Construction normalises case and rejects
/// anything that is not a hex pair, so a `CommandCode` held anywhere in
/// the system is always valid on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandCode([u8; 2]);

impl CommandCode {
    /// Parse a command code from a 2-character hex string.
    ///
    /// Uppercase input is normalised to lowercase (the wire format, and the
    /// checksum, are case-sensitive).
    pub fn new(code: &str) -> Result<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 2 {
            return Err(Error::Protocol(format!(
                "command code must be exactly 2 characters, got {:?}",
                code
            )));
        }
        let lower = [
            bytes[0].to_ascii_lowercase(),
            bytes[1].to_ascii_lowercase(),
        ];
        if !lower.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::Protocol(format!(
                "command code must be 2 hex characters, got {:?}",
                code
            )));
        }
        Ok(CommandCode(lower))
    }

    /// Build a command code from two known-good ASCII hex bytes.
    ///
    /// Intended for the static register constants in
    /// [`commands::codes`](crate::commands::codes); panics at compile time
    /// if handed a non-hex byte.
    pub const fn from_ascii(code: [u8; 2]) -> Self {
        assert!(matches!(code[0], b'0'..=b'9' | b'a'..=b'f'));
        assert!(matches!(code[1], b'0'..=b'9' | b'a'..=b'f'));
        CommandCode(code)
    }

    /// The code as wire bytes.
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl std::fmt::Display for CommandCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Always valid ASCII by construction.
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl std::fmt::Debug for CommandCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CommandCode({self})")
    }
}

impl std::str::FromStr for CommandCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CommandCode::new(s)
    }
}

impl TryFrom<String> for CommandCode {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        CommandCode::new(&s)
    }
}

/// A complete, checksummed 16-byte request frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame([u8; REQUEST_LEN]);

impl RequestFrame {
    /// The frame as wire bytes, ready for [`Transport::send`].
    ///
    /// [`Transport::send`]: thermlink_core::Transport::send
    pub fn as_bytes(&self) -> &[u8; REQUEST_LEN] {
        &self.0
    }
}

impl std::fmt::Display for RequestFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Everything but the terminator is printable ASCII.
        for &b in &self.0[..REQUEST_LEN - 1] {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RequestFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestFrame({self}\\r)")
    }
}

/// Classification of a response frame that did not yield a value.
///
/// These are expected, per-exchange verdicts -- the reconciler records
/// them as data rather than propagating them as hard errors, which is why
/// this type is `Copy + Eq` and separate from
/// [`thermlink_core::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ResponseError {
    /// Twelve zero bytes: no device present, link down, or the request
    /// timed out. The protocol cannot tell these apart.
    #[error("no response from controller")]
    NoResponse,

    /// The controller reported that our request's checksum was wrong
    /// (the `*XXXXXXXXc0\r` sentinel).
    #[error("controller rejected request checksum")]
    ChecksumRejected,

    /// The response failed local validation: its checksum does not match
    /// its value field, or the value field is not hexadecimal.
    #[error("response failed checksum validation")]
    ChecksumMismatch,
}

/// Compute the frame checksum over the covered bytes.
///
/// Wrapping sum of the ASCII byte values; only the low byte survives. It
/// is rendered on the wire as two lowercase hex digits.
pub fn checksum(covered: &[u8]) -> u8 {
    covered
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Encode a register access into a 16-byte request frame.
///
/// A read is a request with value `0`; a write carries the value to
/// store. Pure function: identical inputs always produce the identical
/// frame.
///
/// # Errors
///
/// [`Error::ValueOutOfRange`] if `value` does not fit the protocol's
/// 32-bit signed field. Out-of-range values are never truncated.
///
/// # Example
///
/// ```
/// use thermlink_tc3625::protocol::{encode_command, CommandCode};
///
/// let input1 = CommandCode::new("01").unwrap();
/// let frame = encode_command(input1, 2043).unwrap();
/// assert_eq!(frame.as_bytes(), b"*0001000007fbb0\r");
/// ```
pub fn encode_command(code: CommandCode, value: i64) -> Result<RequestFrame> {
    let value = i32::try_from(value).map_err(|_| Error::ValueOutOfRange(value))?;

    // Covered region: address + command + value digits.
    let mut core = BytesMut::with_capacity(REQUEST_LEN - 4);
    core.put_slice(DEVICE_ADDRESS);
    core.put_slice(code.as_bytes());
    core.put_slice(format!("{:08x}", value as u32).as_bytes());

    let sum = checksum(&core);

    let mut buf = BytesMut::with_capacity(REQUEST_LEN);
    buf.put_u8(START);
    buf.put_slice(&core);
    buf.put_slice(format!("{sum:02x}").as_bytes());
    buf.put_u8(TERMINATOR);

    let mut frame = [0u8; REQUEST_LEN];
    frame.copy_from_slice(&buf);
    Ok(RequestFrame(frame))
}

/// Decode a 12-byte response frame into a value or a classification.
///
/// Classification order:
///
/// 1. all bytes zero -> [`ResponseError::NoResponse`];
/// 2. the literal `*XXXXXXXXc0\r` -> [`ResponseError::ChecksumRejected`];
/// 3. recomputed checksum over the 8 value digits differs from the
///    transmitted one -> [`ResponseError::ChecksumMismatch`];
/// 4. otherwise the value digits parse as 32-bit two's complement.
///
/// A frame whose checksum verifies but whose value field is not valid
/// hexadecimal is corrupt in transit and classified as
/// [`ResponseError::ChecksumMismatch`].
///
/// # Example
///
/// ```
/// use thermlink_tc3625::protocol::decode_response;
///
/// assert_eq!(decode_response(b"*000007fbef\r"), Ok(2043));
/// ```
pub fn decode_response(raw: &[u8; RESPONSE_LEN]) -> std::result::Result<i32, ResponseError> {
    if raw.iter().all(|&b| b == 0) {
        return Err(ResponseError::NoResponse);
    }
    if raw == CHECKSUM_REJECTED {
        return Err(ResponseError::ChecksumRejected);
    }

    let value_digits = &raw[1..9];
    let sum = checksum(value_digits);
    let expected = format!("{sum:02x}");
    if expected.as_bytes() != &raw[9..11] {
        return Err(ResponseError::ChecksumMismatch);
    }

    let digits = std::str::from_utf8(value_digits).map_err(|_| ResponseError::ChecksumMismatch)?;
    let magnitude =
        u32::from_str_radix(digits, 16).map_err(|_| ResponseError::ChecksumMismatch)?;
    Ok(magnitude as i32)
}

/// Encode a value as a well-formed 12-byte response frame.
///
/// This is the device's side of the protocol. It exists for the test
/// harness and the CLI's `--mock` mode; nothing in the control path calls
/// it.
pub fn encode_response(value: i32) -> [u8; RESPONSE_LEN] {
    let digits = format!("{:08x}", value as u32);
    let sum = checksum(digits.as_bytes());

    let mut frame = [0u8; RESPONSE_LEN];
    frame[0] = START;
    frame[1..9].copy_from_slice(digits.as_bytes());
    frame[9..11].copy_from_slice(format!("{sum:02x}").as_bytes());
    frame[11] = TERMINATOR;
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CommandCode {
        CommandCode::new(s).unwrap()
    }

    // ---------------------------------------------------------------
    // Checksum
    // ---------------------------------------------------------------

    #[test]
    fn checksum_of_scenario_a_core() {
        // "0001000007fb" has ASCII sum 688; low byte 0xb0.
        assert_eq!(checksum(b"0001000007fb"), 0xb0);
    }

    #[test]
    fn checksum_of_value_field() {
        // "000007fb" has ASCII sum 495; low byte 0xef.
        assert_eq!(checksum(b"000007fb"), 0xef);
    }

    #[test]
    fn checksum_keeps_only_low_byte() {
        // 8 x 'f' = 816 = 0x330.
        assert_eq!(checksum(b"ffffffff"), 0x30);
    }

    #[test]
    fn checksum_empty_is_zero() {
        assert_eq!(checksum(b""), 0);
    }

    // ---------------------------------------------------------------
    // Command codes
    // ---------------------------------------------------------------

    #[test]
    fn command_code_accepts_hex_pairs() {
        assert_eq!(code("01").as_bytes(), b"01");
        assert_eq!(code("5a").as_bytes(), b"5a");
        assert_eq!(code("1c").as_bytes(), b"1c");
    }

    #[test]
    fn command_code_normalises_case() {
        assert_eq!(code("5A").as_bytes(), b"5a");
        assert_eq!(CommandCode::new("5A").unwrap(), code("5a"));
    }

    #[test]
    fn command_code_rejects_wrong_length() {
        assert!(CommandCode::new("1").is_err());
        assert!(CommandCode::new("011").is_err());
        assert!(CommandCode::new("").is_err());
    }

    #[test]
    fn command_code_rejects_non_hex() {
        assert!(CommandCode::new("g1").is_err());
        assert!(CommandCode::new("0*").is_err());
        assert!(CommandCode::new("  ").is_err());
    }

    #[test]
    fn command_code_display() {
        assert_eq!(code("4b").to_string(), "4b");
    }

    // ---------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_input1_read_of_2043() {
        // Concrete vector from the controller manual worked example.
        let frame = encode_command(code("01"), 2043).unwrap();
        assert_eq!(frame.as_bytes(), b"*0001000007fbb0\r");
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode_command(code("01"), 2043).unwrap();
        let b = encode_command(code("01"), 2043).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn encode_read_is_value_zero() {
        let frame = encode_command(code("50"), 0).unwrap();
        assert_eq!(frame.as_bytes(), b"*00500000000045\r");
    }

    #[test]
    fn encode_write_500_via_1c() {
        let frame = encode_command(code("1c"), 500).unwrap();
        assert_eq!(frame.as_bytes(), b"*001c000001f4af\r");
    }

    #[test]
    fn encode_always_16_bytes() {
        for value in [0i64, 1, -1, 2043, i32::MAX as i64, i32::MIN as i64] {
            let frame = encode_command(code("2d"), value).unwrap();
            assert_eq!(frame.as_bytes().len(), REQUEST_LEN);
            assert_eq!(frame.as_bytes()[0], START);
            assert_eq!(frame.as_bytes()[REQUEST_LEN - 1], TERMINATOR);
        }
    }

    #[test]
    fn encode_negative_as_twos_complement() {
        let frame = encode_command(code("26"), -1).unwrap();
        assert_eq!(&frame.as_bytes()[5..13], b"ffffffff");
    }

    #[test]
    fn encode_rejects_value_above_i32() {
        let err = encode_command(code("01"), i64::from(i32::MAX) + 1).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange(v) if v == i64::from(i32::MAX) + 1));
    }

    #[test]
    fn encode_rejects_value_below_i32() {
        let err = encode_command(code("01"), i64::from(i32::MIN) - 1).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange(_)));
    }

    #[test]
    fn encode_accepts_i32_extremes() {
        assert!(encode_command(code("01"), i64::from(i32::MAX)).is_ok());
        assert!(encode_command(code("01"), i64::from(i32::MIN)).is_ok());
    }

    #[test]
    fn request_frame_display_omits_terminator() {
        let frame = encode_command(code("01"), 2043).unwrap();
        assert_eq!(frame.to_string(), "*0001000007fbb0");
    }

    // ---------------------------------------------------------------
    // Decoding -- success
    // ---------------------------------------------------------------

    #[test]
    fn decode_2043() {
        assert_eq!(decode_response(b"*000007fbef\r"), Ok(2043));
    }

    #[test]
    fn decode_zero_value() {
        // A value of zero with a valid checksum is a real reading, not the
        // all-zero no-response sentinel.
        assert_eq!(decode_response(b"*0000000080\r"), Ok(0));
    }

    #[test]
    fn decode_500() {
        assert_eq!(decode_response(b"*000001f4bb\r"), Ok(500));
    }

    #[test]
    fn decode_thermistor_counts() {
        // INPUT2 raw counts from the factory profile.
        assert_eq!(decode_response(b"*00003cce1e\r"), Ok(15566));
    }

    #[test]
    fn decode_negative_one() {
        assert_eq!(decode_response(b"*ffffffff30\r"), Ok(-1));
    }

    #[test]
    fn decode_rejects_uppercase_digits_against_lowercase_checksum() {
        // The controller always emits lowercase; an uppercase digit changes
        // the ASCII sum, so such a frame fails validation.
        assert_eq!(
            decode_response(b"*000007FBef\r"),
            Err(ResponseError::ChecksumMismatch)
        );
    }

    // ---------------------------------------------------------------
    // Decoding -- sentinels and corruption
    // ---------------------------------------------------------------

    #[test]
    fn decode_all_zero_is_no_response() {
        assert_eq!(
            decode_response(&[0u8; RESPONSE_LEN]),
            Err(ResponseError::NoResponse)
        );
    }

    #[test]
    fn decode_rejection_sentinel() {
        assert_eq!(
            decode_response(b"*XXXXXXXXc0\r"),
            Err(ResponseError::ChecksumRejected)
        );
    }

    #[test]
    fn decode_bad_checksum() {
        // The narrative vector with checksum "5f": the sum over "000007fb"
        // is 0xef, so this frame must be rejected.
        assert_eq!(
            decode_response(b"*000007fb5f\r"),
            Err(ResponseError::ChecksumMismatch)
        );
    }

    #[test]
    fn decode_detects_corruption_at_every_value_position() {
        let clean = encode_response(2043);
        for pos in 1..9 {
            let mut corrupt = clean;
            corrupt[pos] = if corrupt[pos] == b'1' { b'2' } else { b'1' };
            assert_eq!(
                decode_response(&corrupt),
                Err(ResponseError::ChecksumMismatch),
                "corruption at byte {pos} went undetected"
            );
        }
    }

    #[test]
    fn decode_non_hex_value_with_fixed_checksum() {
        // 'z' is not hex; even with the checksum recomputed to match, the
        // frame is corrupt.
        let mut frame = *b"*z0000000??\r";
        let sum = checksum(&frame[1..9]);
        frame[9..11].copy_from_slice(format!("{sum:02x}").as_bytes());
        assert_eq!(
            decode_response(&frame),
            Err(ResponseError::ChecksumMismatch)
        );
    }

    // ---------------------------------------------------------------
    // Device-side encoding (harness support)
    // ---------------------------------------------------------------

    #[test]
    fn encode_response_matches_known_vector() {
        assert_eq!(&encode_response(2043), b"*000007fbef\r");
    }

    #[test]
    fn response_round_trip_signed_values() {
        for value in [0, 1, -1, 500, 2043, 15566, i32::MAX, i32::MIN] {
            assert_eq!(decode_response(&encode_response(value)), Ok(value));
        }
    }
}
