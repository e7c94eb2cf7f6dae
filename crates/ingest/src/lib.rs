//! GeoJSON Ingestion
//!
//! Builds the DuckDB store served by the API: loads point features from a
//! GeoJSON file into `geojson_data`, then derives `sensor_readings` from it.

mod error;
mod geojson;
mod job;

pub use error::IngestError;
pub use geojson::{parse_feature_collection, GeoPoint, ParsedFeatures};
pub use job::{run, IngestConfig, IngestReport, DEFAULT_GEOJSON_FILE, DEFAULT_LIMIT};
