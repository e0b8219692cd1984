//! Deploy command execution.

use std::future::Future;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::deploy::command::DeployCommand;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// What the deploy command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl DeployOutcome {
    /// Outcome reported for a command that was only logged.
    pub fn skipped() -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Runs a deploy command to completion.
pub trait Deployer {
    fn deploy(
        &self,
        command: &DeployCommand,
    ) -> impl Future<Output = Result<DeployOutcome, DeployError>> + Send;
}

/// Executes the command as a child process and captures its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDeployer {
    dry_run: bool,
}

impl ProcessDeployer {
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Log the command line instead of running it.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

impl Deployer for ProcessDeployer {
    async fn deploy(&self, command: &DeployCommand) -> Result<DeployOutcome, DeployError> {
        if self.dry_run {
            tracing::info!(command = %command, "Dry run, deploy command not executed");
            return Ok(DeployOutcome::skipped());
        }

        tracing::info!(command = %command, "Running deploy command");

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| DeployError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        Ok(DeployOutcome {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> DeployCommand {
        DeployCommand {
            program: "sh".into(),
            args: vec!["-c".into(), script.into()],
        }
    }

    #[tokio::test]
    async fn captures_status_and_output() {
        let outcome = ProcessDeployer::new()
            .deploy(&sh("echo deployed; echo warn >&2; exit 3"))
            .await
            .unwrap();

        assert_eq!(outcome.code, Some(3));
        assert!(!outcome.success);
        assert_eq!(outcome.stdout, "deployed\n");
        assert_eq!(outcome.stderr, "warn\n");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cmd = DeployCommand {
            program: "/nonexistent/asadmin".into(),
            args: vec![],
        };
        let err = ProcessDeployer::new().deploy(&cmd).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/asadmin"));
    }

    #[tokio::test]
    async fn dry_run_does_not_execute() {
        let outcome = ProcessDeployer::dry_run()
            .deploy(&sh("exit 1"))
            .await
            .unwrap();
        assert!(outcome.success);
    }
}
