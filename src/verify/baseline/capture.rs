//! Baseline persistence: one JSON file per capture under the baseline directory.
//!
//! Files are named `<procedure>_<YYYYmmdd_HHMMSS>.json`. The timestamp in the
//! name is authoritative when choosing the latest baseline; files whose name
//! carries no timestamp fall back to the record's `created_at`, then to the
//! file modification time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};

use super::types::{BaselineEntry, BaselineRecord, TimestampSource};
use crate::error::{Error, Result};
use crate::models::{JsonSerializable, TabularResult};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const EXTENSION: &str = "json";

/// Append-only store of baselines rooted at a directory.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the baseline directory if it does not exist yet
    pub fn init(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| Error::StorageWrite {
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Path of the baseline file for `procedure` captured at `timestamp`
    pub fn file_path(&self, procedure: &str, timestamp: DateTime<Utc>) -> PathBuf {
        self.dir.join(format!(
            "{procedure}_{}.{EXTENSION}",
            timestamp.format(TIMESTAMP_FORMAT)
        ))
    }

    /// Store `result` as a new baseline for `procedure`, stamped with the current time.
    ///
    /// Returns the path of the written file.
    pub fn save(
        &self,
        procedure: &str,
        params: Option<&str>,
        result: TabularResult,
    ) -> Result<PathBuf> {
        self.save_at(procedure, params, result, Utc::now())
    }

    /// Store `result` as a baseline captured at `timestamp`.
    ///
    /// The timestamp is truncated to whole seconds. A second capture of the same
    /// procedure within the same second replaces the first.
    pub fn save_at(
        &self,
        procedure: &str,
        params: Option<&str>,
        result: TabularResult,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf> {
        validate_procedure_name(procedure)?;
        self.init()?;

        let timestamp = timestamp.trunc_subsecs(0);
        let path = self.file_path(procedure, timestamp);
        let record = BaselineRecord::new(
            procedure,
            params.map(str::to_string),
            result,
            timestamp,
        );
        record.save(&path)?;

        info!("Baseline saved to: {}", path.display());
        Ok(path)
    }

    /// Load a single baseline file
    pub fn load(&self, path: &Path) -> Result<BaselineRecord> {
        BaselineRecord::load(path)
    }

    /// All baselines stored for `procedure`, oldest first.
    ///
    /// Entries with equal timestamps are ordered by file name.
    pub fn list(&self, procedure: &str) -> Result<Vec<BaselineEntry>> {
        validate_procedure_name(procedure)?;

        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let read_err = |e: std::io::Error| Error::StorageRead {
            path: self.dir.clone(),
            message: e.to_string(),
        };

        let prefix = format!("{procedure}_");
        let mut entries = Vec::new();

        for entry in fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(suffix) = stem.strip_prefix(&prefix) else {
                continue;
            };

            if let Some(entry) = locate(procedure, &path, suffix) {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });
        debug!(
            "Found {} baseline(s) for {procedure} in {}",
            entries.len(),
            self.dir.display()
        );

        Ok(entries)
    }

    /// The most recently captured baseline entry for `procedure`, if any
    pub fn latest_entry(&self, procedure: &str) -> Result<Option<BaselineEntry>> {
        Ok(self.list(procedure)?.pop())
    }

    /// The most recently captured baseline for `procedure`.
    ///
    /// `Ok(None)` means no baseline has been stored yet.
    pub fn latest(&self, procedure: &str) -> Result<Option<BaselineRecord>> {
        match self.latest_entry(procedure)? {
            Some(entry) => self.load(&entry.path).map(Some),
            None => Ok(None),
        }
    }
}

/// Work out the timestamp of a candidate file, or skip it if it is not ours
fn locate(procedure: &str, path: &Path, suffix: &str) -> Option<BaselineEntry> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT) {
        return Some(BaselineEntry {
            path: path.to_path_buf(),
            timestamp: naive.and_utc(),
            source: TimestampSource::FileName,
        });
    }

    // No timestamp in the name: the file may belong to a procedure whose name
    // merely starts with ours, so the record has the final say.
    let record = match BaselineRecord::load(path) {
        Ok(record) => record,
        Err(e) => {
            warn!("Skipping unreadable baseline file: {e}");
            return None;
        }
    };
    if record.procedure != procedure {
        return None;
    }

    if let Some(created_at) = record.created_at {
        return Some(BaselineEntry {
            path: path.to_path_buf(),
            timestamp: created_at,
            source: TimestampSource::Record,
        });
    }

    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Some(BaselineEntry {
            path: path.to_path_buf(),
            timestamp: DateTime::<Utc>::from(modified).trunc_subsecs(0),
            source: TimestampSource::Modified,
        }),
        Err(e) => {
            warn!(
                "Skipping baseline without timestamp {}: {e}",
                path.display()
            );
            None
        }
    }
}

/// Procedure names become part of a file name, so they must stay inside the directory
pub fn validate_procedure_name(procedure: &str) -> Result<()> {
    if procedure.trim().is_empty() {
        return Err(Error::Usage("procedure name cannot be empty".to_string()));
    }
    if procedure == "." || procedure == ".." || procedure.contains(['/', '\\', '\0']) {
        return Err(Error::Usage(format!("invalid procedure name '{procedure}'")));
    }
    Ok(())
}
