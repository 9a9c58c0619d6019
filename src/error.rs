//! Error taxonomy shared by the store, the comparator and the executor.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration missing, unreadable or incomplete
    #[error("configuration error: {0}")]
    Config(String),

    /// The database could not be reached
    #[error("cannot connect to database: {0}")]
    Connection(String),

    /// The procedure call itself failed
    #[error("error executing procedure '{procedure}': {message}")]
    Execution { procedure: String, message: String },

    #[error("failed to write baseline {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read baseline {}: {message}", path.display())]
    StorageRead { path: PathBuf, message: String },

    #[error("invalid mode '{0}'. Use 'baseline', 'test' or 'history'")]
    InvalidMode(String),

    #[error("{0}")]
    Usage(String),

    /// A row does not line up with the column list
    #[error("row {row} has {found} values but there are {expected} columns")]
    Shape {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Error {
    pub fn execution(procedure: &str, message: impl Into<String>) -> Self {
        Error::Execution {
            procedure: procedure.to_string(),
            message: message.into(),
        }
    }

    /// True for errors caused by how the tool was invoked
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::InvalidMode(_) | Error::Usage(_))
    }
}
