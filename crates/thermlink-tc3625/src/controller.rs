//! The TC-36-25 session: one exclusive transport, one exchange at a time.
//!
//! [`Tc3625`] ties the pure frame codec ([`protocol`](crate::protocol)) to
//! a [`Transport`]. The protocol has no request identifiers and no
//! pipelining, so every operation is a strict write-then-read transaction:
//! send one 16-byte request, then block on a fixed 12-byte response read
//! bounded by the response timeout. A read that times out part-way leaves
//! the remainder of the buffer zero-filled, which is exactly the shape the
//! decoder classifies as "no response".

use std::time::Duration;

use thermlink_core::error::{Error, Result};
use thermlink_core::transport::Transport;
use tracing::{debug, trace, warn};

use crate::commands::codes;
use crate::protocol::{self, CommandCode, ResponseError, RESPONSE_LEN};

/// Default response window. The controller answers well inside a second;
/// a silent second means nothing is going to arrive.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// The per-exchange verdict: a decoded value, or the protocol-level
/// classification of why there is none.
///
/// Deliberately distinct from [`thermlink_core::Result`]: a hard error
/// (port gone, malformed request) propagates as `Err`, while a classified
/// response failure is data the caller inspects.
pub type Verdict = std::result::Result<i32, ResponseError>;

/// Convert a centi-degree register value to degrees.
///
/// The controller reports temperatures in hundredths of a degree in the
/// configured working units.
pub fn centi_to_degrees(value: i32) -> f64 {
    f64::from(value) / 100.0
}

/// Convert degrees to the centi-degree register representation.
///
/// # Errors
///
/// [`Error::ValueOutOfRange`] if the scaled value does not fit the
/// protocol's 32-bit field.
pub fn degrees_to_centi(degrees: f64) -> Result<i32> {
    let centi = (degrees * 100.0).round();
    if !centi.is_finite() || centi < f64::from(i32::MIN) || centi > f64::from(i32::MAX) {
        return Err(Error::ValueOutOfRange(centi as i64));
    }
    Ok(centi as i32)
}

/// A connected TC-36-25 temperature controller.
///
/// Constructed via [`Tc3625Builder`](crate::builder::Tc3625Builder). Holds
/// the transport exclusively for the lifetime of the session; drop or
/// [`close`](Tc3625::close) releases the link.
pub struct Tc3625 {
    transport: Box<dyn Transport>,
    response_timeout: Duration,
}

impl Tc3625 {
    pub(crate) fn new(transport: Box<dyn Transport>, response_timeout: Duration) -> Self {
        Tc3625 {
            transport,
            response_timeout,
        }
    }

    /// Perform one request/response exchange.
    ///
    /// Encodes `(code, value)`, sends the frame, reads exactly
    /// [`RESPONSE_LEN`] bytes (zero-filling on timeout), and decodes.
    ///
    /// The outer `Result` carries hard failures: encoding errors and
    /// transport I/O errors. The inner [`Verdict`] is the protocol
    /// classification of the response.
    pub async fn exchange(&mut self, code: CommandCode, value: i64) -> Result<Verdict> {
        let frame = protocol::encode_command(code, value)?;
        trace!(%code, value, frame = %frame, "sending request");
        self.transport.send(frame.as_bytes()).await?;

        let raw = self.read_response().await?;
        let verdict = protocol::decode_response(&raw);
        match verdict {
            Ok(v) => trace!(%code, value = v, "response decoded"),
            Err(e) => debug!(%code, error = %e, "response classified as failure"),
        }
        Ok(verdict)
    }

    /// Read a parameter (an exchange with value `0`).
    pub async fn read_parameter(&mut self, code: CommandCode) -> Result<Verdict> {
        self.exchange(code, 0).await
    }

    /// Write a parameter. The controller echoes the stored value in the
    /// response, which is returned as the verdict.
    pub async fn write_parameter(&mut self, code: CommandCode, value: i32) -> Result<Verdict> {
        self.exchange(code, i64::from(value)).await
    }

    /// Read INPUT1, the primary control thermistor, in degrees.
    pub async fn read_temperature(&mut self) -> Result<f64> {
        let value = require_value(self.read_parameter(codes::INPUT1).await?)?;
        Ok(centi_to_degrees(value))
    }

    /// Read the fixed desired control setting (the setpoint), in degrees.
    pub async fn read_setpoint(&mut self) -> Result<f64> {
        let value = require_value(self.read_parameter(codes::FIXED_SETPOINT).await?)?;
        Ok(centi_to_degrees(value))
    }

    /// Set the fixed desired control setting, in degrees.
    ///
    /// The controller echoes the stored value; an echo that differs from
    /// what was sent is surfaced as a protocol error.
    pub async fn set_setpoint(&mut self, degrees: f64) -> Result<()> {
        let centi = degrees_to_centi(degrees)?;
        let echoed = require_value(
            self.write_parameter(codes::SET_FIXED_SETPOINT, centi)
                .await?,
        )?;
        if echoed != centi {
            return Err(Error::Protocol(format!(
                "setpoint write echoed {echoed}, expected {centi}"
            )));
        }
        debug!(degrees, centi, "setpoint updated");
        Ok(())
    }

    /// Clear a latched alarm via the write-only reset trigger.
    pub async fn reset_alarm_latch(&mut self) -> Result<()> {
        let verdict = self.write_parameter(codes::ALARM_LATCH_RESET, 0).await?;
        if let Err(e) = verdict {
            // The trigger register's echo is unreliable on some firmware;
            // report but do not fail the reset.
            warn!(error = %e, "alarm latch reset not acknowledged");
        }
        Ok(())
    }

    /// The configured response window.
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Whether the underlying transport is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the session and release the serial link.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Read exactly [`RESPONSE_LEN`] bytes, or as many as arrive inside
    /// the response window.
    ///
    /// A timeout (or a transport that stops yielding bytes) leaves the
    /// remainder zero-filled rather than failing the call: the all-zero
    /// and partially-filled shapes are meaningful to the decoder. Real
    /// I/O failures still propagate.
    async fn read_response(&mut self) -> Result<[u8; RESPONSE_LEN]> {
        let mut buf = [0u8; RESPONSE_LEN];
        let mut filled = 0;
        while filled < RESPONSE_LEN {
            match self
                .transport
                .receive(&mut buf[filled..], self.response_timeout)
                .await
            {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }
        if filled < RESPONSE_LEN {
            debug!(filled, "short response, remainder zero-filled");
        }
        Ok(buf)
    }
}

/// Flatten a [`Verdict`] for session operations where any response
/// failure is simply an error to the caller.
fn require_value(verdict: Verdict) -> Result<i32> {
    verdict.map_err(|e| Error::Protocol(e.to_string()))
}
