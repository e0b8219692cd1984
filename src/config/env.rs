//! Environment parsing.
//!
//! The container hands all secrets and endpoints over as environment
//! variables. They are read once, as a plain map, and turned into typed
//! settings by [`parse_env`]; nothing else in the crate calls
//! `std::env::var`.
//!
//! | Variable | Required by | Default |
//! |----------|-------------|---------|
//! | `RSS_CLIENT_ID` | `oauth`, `full` | none |
//! | `RSS_SECRET` | `oauth`, `full` | none |
//! | `RSS_URL` | `oauth`, `full` | none |
//! | `MYSQL_DBUSR` | | `root` |
//! | `MYSQL_DBPASSWORD` | | `toor` |
//! | `MYSQL_HOST` | | `db` |
//! | `MYSQL_PORT` | | `3306` |

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value};

use crate::config::loader::ConfigError;
use crate::config::schema::Profile;
use crate::readiness::Endpoint;

pub const RSS_CLIENT_ID: &str = "RSS_CLIENT_ID";
pub const RSS_SECRET: &str = "RSS_SECRET";
pub const RSS_URL: &str = "RSS_URL";
pub const MYSQL_DBUSR: &str = "MYSQL_DBUSR";
pub const MYSQL_DBPASSWORD: &str = "MYSQL_DBPASSWORD";
pub const MYSQL_HOST: &str = "MYSQL_HOST";
pub const MYSQL_PORT: &str = "MYSQL_PORT";

/// Application server home, used only to locate the server log.
pub const GLASSFISH_HOME: &str = "GLASSFISH_HOME";

/// Log format override (`pretty` or `json`).
pub const LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_DB_USER: &str = "root";
const DEFAULT_DB_PASSWORD: &str = "toor";
const DEFAULT_DB_HOST: &str = "db";
const DEFAULT_DB_PORT: u16 = 3306;

/// Path appended to `RSS_URL` to form the OAuth callback.
const CALLBACK_SUFFIX: &str = "/fiware-rss/callback";

const REDACTED: &str = "********";

/// A rejected environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvProblem {
    /// Required and unset (or empty).
    Missing(&'static str),
    /// Set, but unusable.
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for EnvProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvProblem::Missing(name) => write!(f, "{} is not set", name),
            EnvProblem::Invalid {
                name,
                value,
                reason,
            } => write!(f, "{}={:?} is invalid: {}", name, value, reason),
        }
    }
}

/// OAuth client credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Public base URL of the RSS service, used verbatim.
    pub base_url: String,
}

impl OAuthSettings {
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.base_url, CALLBACK_SUFFIX)
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl DatabaseSettings {
    /// JDBC URL for the RSS schema.
    pub fn jdbc_url(&self) -> String {
        format!("jdbc:mysql://{}:{}/RSS", self.host, self.port)
    }

    /// Endpoint probed by the readiness wait.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Everything the entrypoint takes from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: Profile,
    /// Present for profiles that patch oauth.properties.
    pub oauth: Option<OAuthSettings>,
    pub database: DatabaseSettings,
    pub glassfish_home: Option<String>,
}

impl Settings {
    /// JSON view with credentials masked, for `check`.
    pub fn redacted(&self) -> Value {
        json!({
            "profile": self.profile.to_string(),
            "oauth": self.oauth.as_ref().map(|o| json!({
                "client_id": o.client_id,
                "client_secret": REDACTED,
                "callback_url": o.callback_url(),
            })),
            "database": {
                "user": self.database.user,
                "password": REDACTED,
                "host": self.database.host,
                "port": self.database.port,
                "jdbc_url": self.database.jdbc_url(),
            },
            "glassfish_home": self.glassfish_home,
        })
    }
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

fn required(
    vars: &HashMap<String, String>,
    name: &'static str,
    problems: &mut Vec<EnvProblem>,
) -> String {
    match lookup(vars, name) {
        Some(v) => v.to_string(),
        None => {
            problems.push(EnvProblem::Missing(name));
            String::new()
        }
    }
}

fn with_default(vars: &HashMap<String, String>, name: &str, default: &str) -> String {
    lookup(vars, name).unwrap_or(default).to_string()
}

/// Parse the environment for `profile`.
///
/// Collects every problem before failing so a misconfigured container
/// reports all of them at once.
pub fn parse_env(
    profile: Profile,
    vars: &HashMap<String, String>,
) -> Result<Settings, ConfigError> {
    let mut problems = Vec::new();

    let oauth = if profile.uses_oauth() {
        let client_id = required(vars, RSS_CLIENT_ID, &mut problems);
        let client_secret = required(vars, RSS_SECRET, &mut problems);
        let base_url = required(vars, RSS_URL, &mut problems);
        if !base_url.is_empty() {
            if let Err(e) = url::Url::parse(&base_url) {
                tracing::warn!(variable = RSS_URL, value = %base_url, error = %e, "Value is not an absolute URL; using it verbatim");
            }
        }
        Some(OAuthSettings {
            client_id,
            client_secret,
            base_url,
        })
    } else {
        None
    };

    let database = database_from(vars, &mut problems);

    if !problems.is_empty() {
        return Err(ConfigError::Environment(problems));
    }

    Ok(Settings {
        profile,
        oauth,
        database,
        glassfish_home: lookup(vars, GLASSFISH_HOME).map(str::to_string),
    })
}

/// Parse only the `MYSQL_*` variables.
///
/// Used where the database endpoint is all that matters, so the OAuth
/// variables of the configured profile are not required.
pub fn parse_database_env(vars: &HashMap<String, String>) -> Result<DatabaseSettings, ConfigError> {
    let mut problems = Vec::new();
    let database = database_from(vars, &mut problems);
    if problems.is_empty() {
        Ok(database)
    } else {
        Err(ConfigError::Environment(problems))
    }
}

fn database_from(vars: &HashMap<String, String>, problems: &mut Vec<EnvProblem>) -> DatabaseSettings {
    let port = match lookup(vars, MYSQL_PORT) {
        None => DEFAULT_DB_PORT,
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(0) => {
                problems.push(EnvProblem::Invalid {
                    name: MYSQL_PORT,
                    value: raw.to_string(),
                    reason: "port must be between 1 and 65535".to_string(),
                });
                DEFAULT_DB_PORT
            }
            Ok(p) => p,
            Err(e) => {
                problems.push(EnvProblem::Invalid {
                    name: MYSQL_PORT,
                    value: raw.to_string(),
                    reason: e.to_string(),
                });
                DEFAULT_DB_PORT
            }
        },
    };

    DatabaseSettings {
        user: with_default(vars, MYSQL_DBUSR, DEFAULT_DB_USER),
        password: with_default(vars, MYSQL_DBPASSWORD, DEFAULT_DB_PASSWORD),
        host: with_default(vars, MYSQL_HOST, DEFAULT_DB_HOST),
        port,
    }
}
