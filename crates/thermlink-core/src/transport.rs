//! Transport trait for controller communication.
//!
//! The [`Transport`] trait abstracts over the physical link to the
//! temperature controller. The production implementation is the serial
//! port transport in `thermlink-transport`; tests use the deterministic
//! `MockTransport` from `thermlink-test-harness`.
//!
//! The protocol session (`Tc3625` in `thermlink-tc3625`) operates on a
//! `Box<dyn Transport>` rather than on a serial port directly, so every
//! codec and reconciliation path can be exercised without hardware.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a controller.
///
/// The TC-36-25 protocol has no request identifiers and no pipelining, so
/// a transport is an exclusive resource: one request must fully resolve
/// (response or timeout) before the next is written. The session layer
/// enforces this by holding the transport behind `&mut self`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the controller.
    ///
    /// Implementations should not return until all bytes have been handed
    /// to the underlying link (serial TX buffer flushed).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the controller into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// `buf.len()`. Waits up to `timeout` for data to arrive and returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if none does; the
    /// caller decides whether a timeout is fatal or, as in the fixed-length
    /// response read, stands for "no device answered".
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport and release the underlying link.
    ///
    /// After `close()`, subsequent `send()` and `receive()` calls return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
