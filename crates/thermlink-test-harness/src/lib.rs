//! thermlink-test-harness: Mock transports for testing thermlink
//! protocol code without controller hardware.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing
//! of frame encoding, response decoding, and session logic against a
//! scripted serial line.

pub mod mock_serial;

pub use mock_serial::MockTransport;
