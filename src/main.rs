//! RSS container entrypoint.
//!
//! # Run Sequence
//!
//! ```text
//!   env vars ──▶ precondition check ──▶ oauth.properties / database.properties
//!                      │                              │
//!                   (missing)                     (patched)
//!                      ▼                              ▼
//!                    exit                  TCP probe MYSQL_HOST:MYSQL_PORT
//!                                                     │
//!                                          (ready or attempts exhausted)
//!                                                     ▼
//!                                  asadmin deploy --force false --contextroot …
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::Instrument;
use uuid::Uuid;

use rss_entrypoint::config::validation::validate_config;
use rss_entrypoint::config::{env, load_config, EntrypointConfig, LogFormat, Profile, RetryMode};
use rss_entrypoint::deploy::ProcessDeployer;
use rss_entrypoint::error::{RunnerError, EXIT_CONFIG};
use rss_entrypoint::lifecycle::{signals, EntrypointRunner, Shutdown};
use rss_entrypoint::observability::logging;
use rss_entrypoint::readiness::TcpProbe;
use rss_entrypoint::templating::FsStore;

#[derive(Parser)]
#[command(name = "rss-entrypoint", version)]
#[command(about = "Configure and deploy the RSS application server", long_about = None)]
struct Cli {
    /// TOML file overriding the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Which property files to patch
    #[arg(short, long, global = true, value_enum)]
    profile: Option<Profile>,

    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Exit with status 78 instead of 0 when required variables are missing
    #[arg(long, global = true)]
    strict_exit: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch files, wait for the database, deploy (default)
    Run(RunArgs),
    /// Validate the environment and print the resolved settings
    Check,
    /// Patch the property files only
    Template,
    /// Wait for the database only
    Wait(ReadinessArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    #[command(flatten)]
    readiness: ReadinessArgs,

    /// Log the deploy command instead of running it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Default)]
struct ReadinessArgs {
    /// Give up after this many attempts and carry on
    #[arg(long, conflicts_with = "unbounded")]
    max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Retry until the database answers
    #[arg(long)]
    unbounded: bool,
}

impl ReadinessArgs {
    fn apply(&self, config: &mut EntrypointConfig) {
        if self.unbounded {
            config.readiness.mode = Some(RetryMode::Unbounded);
        }
        if let Some(n) = self.max_attempts {
            config.readiness.mode = Some(RetryMode::Bounded);
            config.readiness.max_attempts = n;
        }
        if let Some(ms) = self.retry_delay_ms {
            config.readiness.delay_ms = Some(ms);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    let vars = env::process_env();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("rss-entrypoint: {}", e);
                return ExitCode::from(EXIT_CONFIG);
            }
        },
        None => EntrypointConfig::default(),
    };

    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if cli.strict_exit {
        config.strict_exit = true;
    }
    if let Some(format) = cli.log_format.or_else(|| {
        vars.get(env::LOG_FORMAT)
            .and_then(|raw| logging::parse_log_format(raw))
    }) {
        config.observability.log_format = format;
    }
    match &command {
        Commands::Run(args) => args.readiness.apply(&mut config),
        Commands::Wait(args) => args.apply(&mut config),
        Commands::Check | Commands::Template => {}
    }

    logging::init_logging(&config.observability);

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return ExitCode::from(EXIT_CONFIG);
    }

    let strict = config.strict_exit;
    let span = tracing::info_span!("entrypoint", run_id = %Uuid::new_v4(), profile = %config.profile);

    match execute(command, config, vars).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code(strict);
            if code == 0 {
                tracing::warn!("Required configuration missing, stopping without changes");
            } else {
                tracing::error!(error = %e, exit_code = code, "Entrypoint failed");
            }
            ExitCode::from(code)
        }
    }
}

async fn execute(
    command: Commands,
    config: EntrypointConfig,
    vars: HashMap<String, String>,
) -> Result<(), RunnerError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rss-entrypoint starting");

    let deployer = match &command {
        Commands::Run(args) if args.dry_run => ProcessDeployer::dry_run(),
        _ => ProcessDeployer::new(),
    };
    let probe = TcpProbe::new(config.readiness.connect_timeout());
    let runner = EntrypointRunner::new(config, FsStore, probe, deployer);

    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    match command {
        Commands::Check => {
            let settings = runner.settings(&vars)?;
            println!("{:#}", settings.redacted());
        }
        Commands::Template => {
            let settings = runner.settings(&vars)?;
            runner.template(&settings)?;
        }
        Commands::Wait(_) => {
            let database = runner.database_settings(&vars)?;
            runner.wait_ready(&database, &mut shutdown_rx).await?;
        }
        Commands::Run(_) => {
            let summary = runner.run(&vars, &mut shutdown_rx).await?;
            tracing::info!(
                files = summary.files.len(),
                attempts = summary.readiness.attempts(),
                "Deployment complete"
            );
        }
    }

    Ok(())
}
