//! Tc3625Builder -- fluent builder for constructing [`Tc3625`] sessions.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and the response timeout before establishing
//! the transport connection.
//!
//! # Example
//!
//! ```no_run
//! use thermlink_tc3625::builder::Tc3625Builder;
//! use std::time::Duration;
//!
//! # async fn example() -> thermlink_core::Result<()> {
//! let tc = Tc3625Builder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .response_timeout(Duration::from_millis(500))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use thermlink_core::error::{Error, Result};
use thermlink_core::transport::Transport;

use crate::controller::{Tc3625, DEFAULT_RESPONSE_TIMEOUT};

/// The controller's fixed line rate. The TC-36-25 talks 9600-8-N-1 only.
pub const BAUD_RATE: u32 = 9600;

/// Fluent builder for [`Tc3625`].
///
/// The only required setting for [`build()`](Self::build) is the serial
/// port path; everything else has defaults matching the hardware.
#[derive(Debug, Clone, Default)]
pub struct Tc3625Builder {
    serial_port: Option<String>,
    response_timeout: Option<Duration>,
}

impl Tc3625Builder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Set the response window for each exchange (default: 1s).
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    /// Build a [`Tc3625`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `thermlink-test-harness`) and for advanced
    /// use cases where the caller manages the transport directly.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Tc3625 {
        Tc3625::new(
            transport,
            self.response_timeout.unwrap_or(DEFAULT_RESPONSE_TIMEOUT),
        )
    }

    /// Build a [`Tc3625`] over a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been
    /// called. The line parameters are fixed at the controller's
    /// 9600-8-N-1.
    pub async fn build(self) -> Result<Tc3625> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::Config("serial_port is required for build()".into()))?;

        let transport = thermlink_transport::SerialTransport::open(port, BAUD_RATE).await?;
        Ok(self.build_with_transport(Box::new(transport)))
    }
}
