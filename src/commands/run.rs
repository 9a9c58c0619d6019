//! Orchestration of a single invocation: run the procedure, then store or compare.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::config::AppConfig;
use crate::db::{parse_params, ProcedureExecutor};
use crate::error::{Error, Result};
use crate::models::TabularResult;
use crate::verify::baseline::{
    compare, validate_procedure_name, BaselineEntry, BaselineStore, DifferenceReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Capture the current result as a new baseline
    Baseline,
    /// Compare the current result against the latest baseline
    Test,
    /// List stored baselines without touching the database
    History,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(Mode::Baseline),
            "test" => Ok(Mode::Test),
            "history" => Ok(Mode::History),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// A validated command line request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub procedure: String,
    /// Comma-separated positional parameters, as typed
    pub params: Option<String>,
}

impl Invocation {
    pub fn parse(mode: &str, procedure: &str, params: Option<&str>) -> Result<Self> {
        let mode = mode.parse()?;
        validate_procedure_name(procedure)?;
        Ok(Self {
            mode,
            procedure: procedure.to_string(),
            params: params.map(str::to_string),
        })
    }
}

/// What an invocation ended with
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Stored { path: PathBuf, rows: usize },
    Matched { baseline: PathBuf },
    Mismatch {
        baseline: PathBuf,
        report: DifferenceReport,
    },
    NoBaseline,
    History { entries: Vec<BaselineEntry> },
}

impl Outcome {
    /// Process exit status for this outcome. A mismatch counts as a failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Stored { .. } | Outcome::Matched { .. } | Outcome::History { .. } => 0,
            Outcome::Mismatch { .. } | Outcome::NoBaseline => 1,
        }
    }
}

/// Drives the executor, the baseline store and the comparator for one run.
pub struct Orchestrator<'a> {
    config: &'a AppConfig,
    store: BaselineStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            store: BaselineStore::new(&config.application.baseline_dir),
        }
    }

    /// Carry out `invocation`.
    ///
    /// `connect` opens the database and is only called for modes that run the
    /// procedure.
    pub fn run<E, F>(&self, invocation: &Invocation, connect: F) -> Result<Outcome>
    where
        E: ProcedureExecutor,
        F: FnOnce(&AppConfig) -> Result<E>,
    {
        let procedure = invocation.procedure.as_str();

        match invocation.mode {
            Mode::History => {
                let entries = self.store.list(procedure)?;
                Ok(Outcome::History { entries })
            }
            Mode::Baseline => {
                let current = self.capture(invocation, connect)?;
                let rows = current.row_count();
                let path = self
                    .store
                    .save(procedure, invocation.params.as_deref(), current)?;
                Ok(Outcome::Stored { path, rows })
            }
            Mode::Test => {
                let current = self.capture(invocation, connect)?;
                let Some(entry) = self.store.latest_entry(procedure)? else {
                    return Ok(Outcome::NoBaseline);
                };
                info!("Comparing against baseline: {}", entry.path.display());
                let baseline = self.store.load(&entry.path)?;

                let report = compare(&current, &baseline.result);
                if report.is_match() {
                    info!("Results match baseline exactly!");
                    Ok(Outcome::Matched {
                        baseline: entry.path,
                    })
                } else {
                    info!("Differences found: {}", report.summary());
                    Ok(Outcome::Mismatch {
                        baseline: entry.path,
                        report,
                    })
                }
            }
        }
    }

    /// Connect and run the procedure named by `invocation`
    fn capture<E, F>(&self, invocation: &Invocation, connect: F) -> Result<TabularResult>
    where
        E: ProcedureExecutor,
        F: FnOnce(&AppConfig) -> Result<E>,
    {
        self.log_procedure_info(&invocation.procedure);

        let mut executor = connect(self.config)?;
        let params = parse_params(invocation.params.as_deref());
        executor.execute(&invocation.procedure, &params)
    }

    /// Log the configured description and declared parameters of `procedure`
    fn log_procedure_info(&self, procedure: &str) {
        let Some(info) = self.config.procedure(procedure) else {
            return;
        };

        info!("Procedure: {procedure}");
        if let Some(description) = &info.description {
            info!("Description: {description}");
        }
        if !info.parameters.is_empty() {
            info!("Parameters:");
            for param in &info.parameters {
                info!("  - {} ({})", param.name, param.kind);
            }
        }
    }
}

/// Validate the raw command line values, then run them.
///
/// An invalid mode or procedure name is rejected before `connect` is called.
pub fn execute<E, F>(
    config: &AppConfig,
    mode: &str,
    procedure: &str,
    params: Option<&str>,
    connect: F,
) -> Result<Outcome>
where
    E: ProcedureExecutor,
    F: FnOnce(&AppConfig) -> Result<E>,
{
    let invocation = Invocation::parse(mode, procedure, params)?;
    Orchestrator::new(config).run(&invocation, connect)
}
