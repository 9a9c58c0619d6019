//! Baseline capture and regression comparison
//!
//! This module provides functionality to:
//! 1. Store a procedure's result set as a timestamped baseline
//! 2. Locate the most recent baseline for a procedure
//! 3. Compare a fresh result against it and report differing rows
//!
//! # Storage layout
//!
//! ```text
//! <baseline_dir>/
//!   usp_orders_20240301_090507.json
//!   usp_orders_20240302_110000.json
//!   usp_customers_20240301_090600.json
//! ```

pub mod capture;
pub mod compare;
pub mod types;

pub use capture::{validate_procedure_name, BaselineStore};
pub use compare::compare;
pub use types::{
    BaselineEntry, BaselineRecord, ColumnChange, DiffRow, DifferenceReport, Side,
    TimestampSource,
};
