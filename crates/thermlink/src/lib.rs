//! # thermlink -- Async Serial Control for TE Technology TC Controllers
//!
//! `thermlink` is an asynchronous Rust library for talking to TE
//! Technology thermoelectric cooler controllers over RS-232. It is
//! designed for instrument automation where a host program owns the
//! controller: fluidics rigs, environmental chambers, optics benches.
//!
//! ## Quick Start
//!
//! Add `thermlink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! thermlink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a controller, bring its configuration into line, and read
//! the temperature:
//!
//! ```no_run
//! use thermlink::tc3625::{commands, Tc3625Builder};
//!
//! #[tokio::main]
//! async fn main() -> thermlink::Result<()> {
//!     let mut tc = Tc3625Builder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     let report = tc.reconcile(&commands::factory_profile()).await?;
//!     for outcome in report.outcomes() {
//!         println!("{outcome}");
//!     }
//!
//!     println!("INPUT1: {:.2} deg", tc.read_temperature().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                       |
//! |-----------------------|-----------------------------------------------|
//! | `thermlink-core`      | [`Transport`] trait, error types              |
//! | `thermlink-transport` | Serial transport implementation               |
//! | `thermlink-tc3625`    | TC-36-25 protocol codec, session, reconciler  |
//! | **`thermlink`**       | This facade crate -- re-exports everything    |
//!
//! ## Configuration Reconciliation
//!
//! The controller keeps its parameters in nonvolatile registers that can
//! drift from what an experiment assumes (front-panel edits, a swapped
//! unit, factory state). [`Tc3625::reconcile`](tc3625::Tc3625::reconcile)
//! audits a [`CommandTable`](tc3625::CommandTable) against the live
//! device and rewrites any writable parameter that disagrees, reporting
//! one verdict per parameter. Tables come from code
//! ([`factory_profile`](tc3625::commands::factory_profile)) or from TOML
//! profile files ([`Profile`](tc3625::Profile)).

pub use thermlink_core::*;

/// Serial transport implementation.
///
/// Provides [`SerialTransport`](transport::SerialTransport) over
/// tokio-serial, with the 9600-8-N-1 defaults the TC family uses.
pub mod transport {
    pub use thermlink_transport::*;
}

/// TC-36-25 protocol backend.
///
/// Provides the frame codec, the [`Tc3625`](tc3625::Tc3625) session, the
/// command registry, TOML profiles, and the configuration reconciler.
pub mod tc3625 {
    pub use thermlink_tc3625::*;
}
