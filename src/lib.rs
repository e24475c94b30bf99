//! byline library crate — re-exports for integration tests.
//!
//! The primary interface is the `byline` binary. This lib.rs exposes the
//! engine modules so that integration tests can drive the engine directly
//! without going through the CLI.

pub mod authorship;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod format;
pub mod gitio;
pub mod model;
pub mod stats;
pub mod telemetry;

// Command modules (record, finalize, report, init, doctor) live with the
// binary — not re-exported.
