//! Procedure execution against the configured database.
//!
//! The [`ProcedureExecutor`] trait is the seam between the orchestration logic
//! and a concrete engine. [`SqliteExecutor`] is the engine used by the CLI;
//! tests substitute their own implementations.

pub mod params;
pub mod sqlite;

pub use params::parse_params;
pub use sqlite::SqliteExecutor;

use crate::error::Result;
use crate::models::{TabularResult, Value};

/// Runs a named procedure and returns its result set.
pub trait ProcedureExecutor {
    /// Execute `procedure` with positional `params`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Execution`] when the procedure is unknown, the
    /// parameters do not fit, or the engine reports a failure.
    fn execute(&mut self, procedure: &str, params: &[Value]) -> Result<TabularResult>;
}
