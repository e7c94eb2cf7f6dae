//! Storage Layer
//!
//! Read access to the DuckDB store holding the `sensor_readings` table.
//!
//! Every operation opens its own connection through [`ConnectionManager`] and
//! releases it when the [`ScopedConnection`] goes out of scope, whatever the
//! outcome. Nothing is pooled or shared between operations.

mod connection;
mod record;
mod repository;

pub use connection::{
    resolve_db_path, ConnectionManager, ReleaseHook, ScopedConnection, DB_PATH_ENV,
    DEFAULT_DB_FILE,
};
pub use record::SensorReading;
pub use repository::{Repository, SENSOR_READINGS_QUERY};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store file could not be opened (missing, corrupted or locked)
    #[error("cannot open store at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: duckdb::Error,
    },

    /// The query failed against an open connection
    #[error("query failed: {0}")]
    Query(#[source] duckdb::Error),

    /// A row could not be mapped to a record
    #[error("row {row} has an unexpected shape: {reason}")]
    DataShape { row: usize, reason: String },
}

/// Coarse category of a [`StorageError`], used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Query,
    DataShape,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Query => "query",
            ErrorKind::DataShape => "data_shape",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StorageError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Connection { .. } => ErrorKind::Connection,
            StorageError::Query(_) => ErrorKind::Query,
            StorageError::DataShape { .. } => ErrorKind::DataShape,
        }
    }
}

/// Open a read-only connection to the store.
///
/// `path` takes precedence over `SENSOR_DB_PATH`, which takes precedence over
/// [`DEFAULT_DB_FILE`].
pub fn acquire_connection(path: Option<&Path>) -> Result<ScopedConnection, StorageError> {
    ConnectionManager::new(path).acquire()
}

/// Read every row of `sensor_readings` from the store at the resolved path.
pub fn get_sensor_readings(path: Option<&Path>) -> Result<Vec<SensorReading>, StorageError> {
    Repository::new(ConnectionManager::new(path)).get_sensor_readings()
}
