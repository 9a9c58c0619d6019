use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Trait for records persisted as standalone JSON files.
///
/// Provides the shared load/save plumbing so every persisted type reports
/// read failures as [`Error::StorageRead`] and write failures as
/// [`Error::StorageWrite`].
pub trait JsonSerializable: Serialize + DeserializeOwned + Sized {
    /// Parse an instance from JSON content.
    ///
    /// # Arguments
    /// * `content` - The JSON document
    /// * `origin` - Where the content came from, used in error messages
    fn from_json(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::StorageRead {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Serialize the instance as pretty-printed JSON.
    fn to_json(&self, destination: &Path) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::StorageWrite {
            path: destination.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// Load an instance from a file path.
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::StorageRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content, path)
    }

    /// Save the instance to a file path.
    ///
    /// Creates parent directories if they don't exist. An existing file at
    /// `path` is replaced.
    fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_json(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::StorageWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| Error::StorageWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
