//! CLI for the sensor-ingest binary.

use std::path::PathBuf;

use clap::Parser;

use ingest::{IngestConfig, DEFAULT_GEOJSON_FILE, DEFAULT_LIMIT};

/// Build the sensor_readings DuckDB store from a GeoJSON file.
#[derive(Debug, Parser)]
#[command(name = "sensor-ingest")]
#[command(version)]
pub struct Cli {
    /// Directory containing the GeoJSON file.
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// GeoJSON file name inside the data directory.
    #[arg(long, env = "GEOJSON_FILE", default_value = DEFAULT_GEOJSON_FILE)]
    pub geojson_file: String,

    /// Store file to write. Defaults to SENSOR_DB_PATH, then my_geospatial_data.duckdb.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Maximum number of rows copied into sensor_readings.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> IngestConfig {
        IngestConfig {
            data_dir: self.data_dir,
            geojson_file: self.geojson_file,
            db_path: self.db,
            limit: self.limit,
        }
    }
}
