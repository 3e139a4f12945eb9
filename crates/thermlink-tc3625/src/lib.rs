//! TE Technology TC-36-25 temperature controller backend for thermlink.
//!
//! This crate implements the ASCII register protocol spoken by the
//! TC-36-25 thermoelectric cooler controller over its RS-232 port. It
//! provides:
//!
//! - **Protocol codec** ([`protocol`]) -- encode fixed 16-byte command
//!   frames and decode fixed 12-byte responses, with checksum validation
//!   and classification of the controller's failure sentinels.
//! - **Command registry** ([`commands`]) -- named parameter definitions
//!   pairing read/write register codes with enforced values, plus the
//!   factory default profile.
//! - **Profiles** ([`profile`]) -- TOML-persisted command tables for
//!   site-specific configurations.
//! - **Session** ([`controller`]) -- [`Tc3625`], the exclusive serial
//!   session driving strict request/response exchanges, temperature and
//!   setpoint operations.
//! - **Reconciler** ([`reconcile`]) -- audit a command table against the
//!   live controller and repair writable parameters that have drifted.
//! - **Builder** ([`builder`]) -- fluent construction of [`Tc3625`]
//!   sessions.
//!
//! # Protocol shape
//!
//! Every request is exactly 16 bytes: `*` + device address `00` + a
//! two-character register code + eight hex digits of value + a two-digit
//! checksum + CR. Every response is exactly 12 bytes: `*` + eight hex
//! digits + checksum + CR. There is no pipelining; one request gets one
//! response.
//!
//! # Example
//!
//! ```
//! use thermlink_tc3625::protocol::{encode_command, decode_response};
//! use thermlink_tc3625::commands::codes;
//!
//! // Build a "read INPUT1" request.
//! let frame = encode_command(codes::INPUT1, 0)?;
//! assert_eq!(frame.as_bytes(), b"*00010000000041\r");
//!
//! // Decode the controller reporting 20.43 degrees.
//! let raw = *b"*000007fbef\r";
//! assert_eq!(decode_response(&raw), Ok(2043));
//! # thermlink_core::Result::Ok(())
//! ```

pub mod builder;
pub mod commands;
pub mod controller;
pub mod profile;
pub mod protocol;
pub mod reconcile;

// Re-export the primary types for ergonomic `use thermlink_tc3625::*`.
pub use builder::Tc3625Builder;
pub use commands::{CommandDefinition, CommandTable};
pub use controller::{Tc3625, Verdict};
pub use profile::Profile;
pub use protocol::{CommandCode, RequestFrame, ResponseError};
pub use reconcile::{Outcome, ReconcileReport};
