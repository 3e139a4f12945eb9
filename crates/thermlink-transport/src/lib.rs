//! Transport implementations for thermlink.
//!
//! This crate provides the concrete [`Transport`](thermlink_core::Transport)
//! implementation for the RS-232/USB serial link to a TC-36-25 controller.
//!
//! # Example
//!
//! ```no_run
//! use thermlink_transport::SerialTransport;
//! use thermlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> thermlink_core::Result<()> {
//! // The controller ships fixed at 9600 baud.
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//!
//! // Send a read request for INPUT1 and collect the 12-byte response.
//! transport.send(b"*00010000000041\r").await?;
//! let mut buf = [0u8; 12];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
