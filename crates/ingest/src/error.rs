//! Ingestion Error Types

use std::path::PathBuf;

use thiserror::Error;

use storage::StorageError;

/// Errors raised by the ingestion job
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file missing
    #[error("GeoJSON file not found at: {}", .0.display())]
    GeoJsonNotFound(PathBuf),

    /// Input file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid JSON
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is JSON but not a FeatureCollection
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Store could not be opened or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<duckdb::Error> for IngestError {
    fn from(err: duckdb::Error) -> Self {
        IngestError::Storage(StorageError::Query(err))
    }
}
