//! Observability subsystem.
//!
//! Every step of the run emits `tracing` events with structured fields
//! (endpoint, attempt, path, exit code). `logging.rs` decides where they go.

pub mod logging;
