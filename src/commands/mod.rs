//! Command implementations.
//!
//! - `procdiff baseline <proc> [params]` - Run the procedure and store its result
//! - `procdiff test <proc> [params]` - Run the procedure and compare against the latest baseline
//! - `procdiff history <proc>` - List stored baselines

pub mod display;
pub mod run;

pub use display::{format_history, format_report, print_outcome};
pub use run::{execute, Invocation, Mode, Orchestrator, Outcome};
