//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → EntrypointConfig (immutable for the run)
//!
//! process environment
//!     → env.rs (pure map → Settings, all problems collected)
//! ```
//!
//! # Design Decisions
//! - The environment is read exactly once, as a map, so parsing is testable
//! - All file fields have defaults; an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{parse_database_env, parse_env, DatabaseSettings, EnvProblem, OAuthSettings, Settings};
pub use loader::{load_config, ConfigError};
pub use schema::{
    DeploymentDescriptor, EntrypointConfig, LogFormat, MissingKeyPolicy, Profile, RetryMode,
};
