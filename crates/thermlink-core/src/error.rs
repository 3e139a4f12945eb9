//! Error types for thermlink.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport failures, protocol usage
//! errors, and profile loading problems are all captured here.
//!
//! Protocol-level *classification* of a controller response (no response,
//! rejected checksum, corrupted response) is deliberately not part of this
//! enum: those are expected, per-exchange verdicts that the reconciler
//! records as data, and they live in `thermlink-tc3625` as `ResponseError`.

/// The error type for all thermlink operations.
///
/// Variants cover the failure modes of talking to a temperature controller
/// over a serial link: physical transport failures, timeouts, malformed
/// requests, and bad configuration profiles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (opening or configuring the serial port).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol usage error (bad command code, malformed profile entry).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The value cannot be represented in the 8-digit two's-complement
    /// hexadecimal field of a request frame.
    ///
    /// The controller protocol carries 32-bit signed values; anything
    /// outside that range is a caller error at frame construction time and
    /// is never silently truncated.
    #[error("value out of range for 32-bit command field: {0}")]
    ValueOutOfRange(i64),

    /// Timed out waiting for bytes from the controller.
    ///
    /// The session layer converts a timeout on a fixed-length read into the
    /// controller's all-zero "no response" shape; a `Timeout` that escapes
    /// to the caller means a send or open operation stalled.
    #[error("timeout waiting for controller")]
    Timeout,

    /// No connection to the controller has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the controller was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// A configuration profile could not be loaded or validated.
    #[error("profile error: {0}")]
    Config(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
