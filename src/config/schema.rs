//! Configuration schema definitions.
//!
//! Everything the entrypoint does that is not supplied by the container
//! environment lives here: the deployment descriptor, property file
//! locations, the readiness policy and logging settings. All types derive
//! Serde traits so a TOML file can override any subset of fields.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::readiness::RetryPolicy;

/// Root configuration for the entrypoint.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EntrypointConfig {
    /// Which property files are patched and which variables are required.
    pub profile: Profile,

    /// Exit with `EX_CONFIG` instead of 0 when required variables are missing.
    pub strict_exit: bool,

    /// What gets deployed and how.
    pub deployment: DeploymentDescriptor,

    /// Property file locations.
    pub files: FilesConfig,

    /// Database readiness wait.
    pub readiness: ReadinessConfig,

    /// Property patching behaviour.
    pub templating: TemplatingConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Entrypoint profile.
///
/// `Oauth` is the stock image behaviour; `Database` patches the JDBC
/// settings instead; `Full` does both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Oauth,
    Database,
    Full,
}

impl Profile {
    /// Whether the OAuth variables are required and oauth.properties patched.
    pub fn uses_oauth(self) -> bool {
        matches!(self, Profile::Oauth | Profile::Full)
    }

    /// Whether database.properties is patched.
    pub fn uses_database_file(self) -> bool {
        matches!(self, Profile::Database | Profile::Full)
    }

    /// Retry mode used when the configuration does not pick one.
    pub fn default_retry_mode(self) -> RetryMode {
        match self {
            Profile::Oauth => RetryMode::Unbounded,
            Profile::Database | Profile::Full => RetryMode::Bounded,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Oauth => f.write_str("oauth"),
            Profile::Database => f.write_str("database"),
            Profile::Full => f.write_str("full"),
        }
    }
}

/// Static metadata identifying the archive handed to the application server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentDescriptor {
    /// Deploy tool invoked on the PATH (e.g., "asadmin").
    pub program: String,

    /// Path to the web archive.
    pub archive_path: String,

    /// Context root the application is mounted under.
    pub context_root: String,

    /// Application name registered with the server.
    pub name: String,

    /// Value passed to `--force`.
    pub force: bool,

    /// Number of server log lines to dump when a deploy fails.
    pub server_log_tail_lines: usize,
}

impl Default for DeploymentDescriptor {
    fn default() -> Self {
        Self {
            program: "asadmin".to_string(),
            archive_path: "./fiware-rss/target/DSRevenueSharing.war".to_string(),
            context_root: "DSRevenueSharing".to_string(),
            name: "DSRevenueSharing".to_string(),
            force: false,
            server_log_tail_lines: 50,
        }
    }
}

/// Property file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    pub oauth_properties: PathBuf,
    pub database_properties: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            oauth_properties: PathBuf::from("/etc/default/rss/oauth.properties"),
            database_properties: PathBuf::from("/etc/default/rss/database.properties"),
        }
    }
}

/// Retry mode for the readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    /// Retry until the endpoint answers.
    Unbounded,
    /// Give up after `max_attempts` and carry on.
    Bounded,
}

/// Readiness wait configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Retry mode; `None` defers to the profile default.
    pub mode: Option<RetryMode>,

    /// Maximum attempts in bounded mode.
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds; `None` defers to the mode
    /// default (0 for unbounded, 1000 for bounded).
    pub delay_ms: Option<u64>,

    /// Per-attempt connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: None,
            max_attempts: 20,
            delay_ms: None,
            connect_timeout_ms: 5_000,
        }
    }
}

impl ReadinessConfig {
    /// Resolve the effective retry policy for a profile.
    pub fn policy_for(&self, profile: Profile) -> RetryPolicy {
        let mode = self.mode.unwrap_or_else(|| profile.default_retry_mode());
        match mode {
            RetryMode::Unbounded => RetryPolicy::Unbounded {
                delay: Duration::from_millis(self.delay_ms.unwrap_or(0)),
            },
            RetryMode::Bounded => RetryPolicy::Bounded {
                max_attempts: self.max_attempts,
                delay: Duration::from_millis(self.delay_ms.unwrap_or(1_000)),
            },
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// What to do when a property key is not present in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Log a warning and keep going.
    #[default]
    Warn,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TemplatingConfig {
    pub on_missing_key: MissingKeyPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
