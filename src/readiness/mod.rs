//! Database readiness subsystem.
//!
//! # Data Flow
//! ```text
//! DatabaseSettings → Endpoint (host:port)
//!     → wait.rs loop
//!         → probe.rs (TCP connect + close, bounded by connect timeout)
//!         → on failure: log, delay (or yield), retry per RetryPolicy
//!     → ReadinessOutcome (Ready | Exhausted | Interrupted)
//! ```

pub mod probe;
pub mod wait;

pub use probe::{Endpoint, Probe, TcpProbe};
pub use wait::{wait_for, ReadinessOutcome, RetryPolicy};
