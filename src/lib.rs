//! RSS container entrypoint library.
//!
//! Patches the RSS property files from the environment, waits for the
//! database and deploys the web archive to the application server.

pub mod config;
pub mod deploy;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod readiness;
pub mod templating;

pub use config::schema::EntrypointConfig;
pub use error::RunnerError;
pub use lifecycle::{EntrypointRunner, Shutdown};
