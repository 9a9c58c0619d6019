//! Type definitions for baseline capture and result comparison

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{JsonSerializable, Row, TabularResult};

/// A stored procedure result captured as the reference for later runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    /// Procedure this baseline belongs to
    pub procedure: String,
    /// When this baseline was captured. Absent only in hand-made files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Raw parameter string the procedure was run with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    /// The captured result set
    pub result: TabularResult,
}

impl BaselineRecord {
    /// Create a record stamped with the given capture time
    pub fn new(
        procedure: impl Into<String>,
        params: Option<String>,
        result: TabularResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            procedure: procedure.into(),
            created_at: Some(created_at),
            params,
            result,
        }
    }
}

impl JsonSerializable for BaselineRecord {}

/// A baseline file located on disk, before its contents are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineEntry {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub source: TimestampSource,
}

/// Where a baseline's timestamp was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    FileName,
    Record,
    Modified,
}

/// Which input a differing row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Current,
    Baseline,
}

impl Side {
    /// Marker shown in front of a differing row
    pub fn marker(&self) -> &'static str {
        match self {
            Side::Current => "+",
            Side::Baseline => "-",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Current => write!(f, "current"),
            Side::Baseline => write!(f, "baseline"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    pub side: Side,
    pub row: Row,
}

/// Column sequences of both sides when they are not identical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    pub current: Vec<String>,
    pub baseline: Vec<String>,
}

/// Outcome of comparing a fresh result against a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceReport {
    /// True when columns and rows are identical, order included
    pub exact_match: bool,
    /// Columns of the current result, which differing rows are aligned with
    /// unless `column_change` is set
    pub columns: Vec<String>,
    pub column_change: Option<ColumnChange>,
    /// Rows present in exactly one of the two results (multiset difference)
    pub rows: Vec<DiffRow>,
}

impl DifferenceReport {
    pub fn matched(columns: Vec<String>) -> Self {
        Self {
            exact_match: true,
            columns,
            column_change: None,
            rows: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.exact_match
    }

    pub fn rows_from(&self, side: Side) -> impl Iterator<Item = &Row> {
        self.rows
            .iter()
            .filter(move |d| d.side == side)
            .map(|d| &d.row)
    }

    /// True when both sides hold the same rows and differ only in their order
    pub fn is_reordering_only(&self) -> bool {
        !self.exact_match && self.column_change.is_none() && self.rows.is_empty()
    }

    /// Get a summary of the differences
    pub fn summary(&self) -> String {
        if self.exact_match {
            return "Results match baseline exactly".to_string();
        }
        if self.is_reordering_only() {
            return "Same rows as baseline but in a different order".to_string();
        }

        let mut parts = Vec::new();

        if self.column_change.is_some() {
            parts.push("columns differ".to_string());
        }

        let only_current = self.rows_from(Side::Current).count();
        let only_baseline = self.rows_from(Side::Baseline).count();
        if only_current > 0 {
            parts.push(format!("{only_current} row(s) only in current"));
        }
        if only_baseline > 0 {
            parts.push(format!("{only_baseline} row(s) only in baseline"));
        }

        parts.join(", ")
    }
}
