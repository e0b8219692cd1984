//! Startup orchestration.
//!
//! # Sequence
//! ```text
//! environment → Settings          (fail fast: nothing else happens on error)
//!     → template property files   (oauth and/or database, per profile)
//!     → wait for database         (unbounded or bounded retry)
//!     → deploy archive            (exactly once, outcome captured)
//! ```
//!
//! Each step only starts after the previous one has finished. There is no
//! rollback: a failed deploy leaves the patched files in place.

use std::collections::HashMap;

use tokio::sync::broadcast;

use crate::config::{parse_database_env, parse_env, ConfigError, DatabaseSettings, EntrypointConfig, Settings};
use crate::deploy::{diagnostics, DeployCommand, DeployOutcome, Deployer};
use crate::error::RunnerError;
use crate::readiness::{wait_for, Probe, ReadinessOutcome};
use crate::templating::{database_patch, oauth_patch, template_file, FileReport, PropertyStore};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub readiness: ReadinessOutcome,
    pub deploy: DeployOutcome,
}

/// Drives the entrypoint sequence against pluggable collaborators.
pub struct EntrypointRunner<S, P, D> {
    config: EntrypointConfig,
    store: S,
    probe: P,
    deployer: D,
}

impl<S, P, D> EntrypointRunner<S, P, D>
where
    S: PropertyStore,
    P: Probe,
    D: Deployer,
{
    pub fn new(config: EntrypointConfig, store: S, probe: P, deployer: D) -> Self {
        Self {
            config,
            store,
            probe,
            deployer,
        }
    }

    pub fn config(&self) -> &EntrypointConfig {
        &self.config
    }

    /// Parse and validate the environment for the configured profile.
    pub fn settings(&self, vars: &HashMap<String, String>) -> Result<Settings, RunnerError> {
        parse_env(self.config.profile, vars).map_err(report_problems)
    }

    /// Parse only the database settings; the OAuth variables may be absent.
    pub fn database_settings(
        &self,
        vars: &HashMap<String, String>,
    ) -> Result<DatabaseSettings, RunnerError> {
        parse_database_env(vars).map_err(report_problems)
    }

    /// Patch every property file the profile covers.
    pub fn template(&self, settings: &Settings) -> Result<Vec<FileReport>, RunnerError> {
        let on_missing = self.config.templating.on_missing_key;
        let mut reports = Vec::new();

        if let Some(oauth) = &settings.oauth {
            reports.push(template_file(
                &self.store,
                &self.config.files.oauth_properties,
                &oauth_patch(oauth),
                on_missing,
            )?);
        }
        if settings.profile.uses_database_file() {
            reports.push(template_file(
                &self.store,
                &self.config.files.database_properties,
                &database_patch(&settings.database),
                on_missing,
            )?);
        }

        Ok(reports)
    }

    /// Wait for the database endpoint according to the configured policy.
    pub async fn wait_ready(
        &self,
        database: &DatabaseSettings,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<ReadinessOutcome, RunnerError> {
        let policy = self.config.readiness.policy_for(self.config.profile);
        let outcome = wait_for(&self.probe, &database.endpoint(), &policy, shutdown).await;
        match outcome {
            ReadinessOutcome::Interrupted { attempts } => Err(RunnerError::Interrupted { attempts }),
            other => Ok(other),
        }
    }

    /// Run the deploy command once and report its outcome.
    pub async fn deploy(&self, settings: &Settings) -> Result<DeployOutcome, RunnerError> {
        let command = DeployCommand::from_descriptor(&self.config.deployment);
        let outcome = self.deployer.deploy(&command).await?;
        diagnostics::log_outcome(&outcome);

        if !outcome.success {
            if let Some(home) = &settings.glassfish_home {
                diagnostics::log_server_log_tail(home, self.config.deployment.server_log_tail_lines);
            }
            return Err(RunnerError::DeployFailed { code: outcome.code });
        }
        Ok(outcome)
    }

    /// Full sequence: settings → templating → readiness → deploy.
    pub async fn run(
        &self,
        vars: &HashMap<String, String>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<RunSummary, RunnerError> {
        let settings = self.settings(vars)?;
        let files = self.template(&settings)?;
        let readiness = self.wait_ready(&settings.database, shutdown).await?;
        tracing::info!(attempts = readiness.attempts(), "started");
        let deploy = self.deploy(&settings).await?;

        Ok(RunSummary {
            files,
            readiness,
            deploy,
        })
    }
}

fn report_problems(err: ConfigError) -> RunnerError {
    match &err {
        ConfigError::Environment(problems) => {
            for problem in problems {
                tracing::error!("{}", problem);
            }
        }
        other => tracing::error!("{}", other),
    }
    RunnerError::from(err)
}
