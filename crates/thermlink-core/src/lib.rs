//! thermlink-core: transport trait and error definitions for thermlink.
//!
//! This crate defines the device-agnostic pieces that the protocol crate
//! (`thermlink-tc3625`) and the transport implementations build on. It has
//! no serial-port or protocol knowledge of its own.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;

pub use error::{Error, Result};
pub use transport::Transport;
