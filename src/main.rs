use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::level_filters::LevelFilter;

use procdiff::commands::{print_outcome, Invocation, Orchestrator};
use procdiff::config::{load_config, DEFAULT_CONFIG_PATH};
use procdiff::db::SqliteExecutor;
use procdiff::{logging, Error};

#[derive(Parser)]
#[command(name = "procdiff")]
#[command(about = "Capture stored procedure results as baselines and test later runs against them", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// baseline, test or history
    mode: String,

    /// Name of the stored procedure
    procedure: String,

    /// Comma-separated positional parameters, e.g. 10,'open',2.5
    params: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            // No-op when the configured subscriber is already installed
            logging::init(LevelFilter::INFO);
            tracing::debug!("{err:?}");
            if err.downcast_ref::<Error>().is_some_and(Error::is_usage) {
                eprintln!("Usage: procdiff [--config <path>] <baseline|test|history> <procedure> [params]");
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    // Rejected before the configuration or the database is touched
    let invocation = Invocation::parse(&cli.mode, &cli.procedure, cli.params.as_deref())?;

    let config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    logging::init(logging::parse_level(&config.application.log_level)?);

    let orchestrator = Orchestrator::new(&config);
    let outcome = orchestrator.run(&invocation, |config| {
        SqliteExecutor::connect(
            &config.database,
            Duration::from_secs(config.application.timeout),
            config.stored_procedures.clone(),
        )
    })?;

    print_outcome(&invocation.procedure, &outcome);
    Ok(outcome.exit_code())
}
