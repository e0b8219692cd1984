//! Application deployment.
//!
//! # Data Flow
//! ```text
//! DeploymentDescriptor
//!     → command.rs (fixed asadmin argument list)
//!     → process.rs (spawn, wait, capture status/stdout/stderr)
//!     → DeployOutcome
//!     → diagnostics.rs (log output; server.log tail on failure)
//! ```

pub mod command;
pub mod diagnostics;
pub mod process;

pub use command::DeployCommand;
pub use process::{DeployError, DeployOutcome, Deployer, ProcessDeployer};
