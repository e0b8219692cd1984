//! Top-level error type and exit codes.

use thiserror::Error;

use crate::config::ConfigError;
use crate::deploy::DeployError;
use crate::templating::TemplateError;

/// Generic failure.
pub const EXIT_FAILURE: u8 = 1;
/// Configuration error (sysexits `EX_CONFIG`).
pub const EXIT_CONFIG: u8 = 78;
/// Interrupted by SIGINT/SIGTERM.
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("deploy command failed with {}", describe_code(.code))]
    DeployFailed { code: Option<i32> },

    #[error("interrupted while waiting for the database after {attempts} attempts")]
    Interrupted { attempts: u32 },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl RunnerError {
    /// Process exit code for this error.
    ///
    /// Missing required variables exit 0 unless `strict` is set, because
    /// existing orchestration treats that exit as a clean stop.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            RunnerError::Config(e) if e.is_missing_only() => {
                if strict {
                    EXIT_CONFIG
                } else {
                    0
                }
            }
            RunnerError::Config(_) => EXIT_CONFIG,
            RunnerError::Template(_) | RunnerError::Deploy(_) => EXIT_FAILURE,
            RunnerError::DeployFailed { code } => match code {
                Some(c) if (1..=255).contains(c) => *c as u8,
                _ => EXIT_FAILURE,
            },
            RunnerError::Interrupted { .. } => EXIT_INTERRUPTED,
        }
    }
}
