use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Sections that must be present before anything else is looked at
const REQUIRED_SECTIONS: [&str; 2] = ["database", "application"];

/// Parsed config.yaml structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub application: ApplicationConfig,
    /// Optional per-procedure metadata keyed by procedure name
    #[serde(default)]
    pub stored_procedures: BTreeMap<String, ProcedureInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Database file for the sqlite driver
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    pub baseline_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds to wait on a locked database
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcedureInfo {
    pub description: Option<String>,
    /// Body executed by the sqlite driver, with `?1`, `?2`, ... placeholders
    pub sql: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
}

/// A declared procedure parameter. Informational only.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

fn default_driver() -> String {
    "sqlite".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid YAML: {e}")))?;

        let Some(mapping) = raw.as_mapping() else {
            return Err(Error::Config(
                "configuration must be a mapping of sections".to_string(),
            ));
        };

        for section in REQUIRED_SECTIONS {
            if !mapping.contains_key(section) {
                return Err(Error::Config(format!(
                    "Missing required configuration section: {section}"
                )));
            }
        }

        serde_yaml::from_value(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Metadata for a procedure, if the config declares any
    pub fn procedure(&self, name: &str) -> Option<&ProcedureInfo> {
        self.stored_procedures.get(name)
    }
}

/// Load and parse the configuration file at `path`
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    AppConfig::from_yaml(&content)
}
