//! Store Generation Job

use std::path::PathBuf;

use data_validator::Validator;
use duckdb::{params, Connection};
use storage::ConnectionManager;
use tracing::{info, warn};

use crate::geojson::{parse_feature_collection, GeoPoint};
use crate::IngestError;

/// GeoJSON file name used when none is configured
pub const DEFAULT_GEOJSON_FILE: &str = "sample_data.geojson";

/// Maximum number of rows copied into `sensor_readings`
pub const DEFAULT_LIMIT: u32 = 1000;

const CREATE_GEOJSON_TABLE: &str = "CREATE TABLE IF NOT EXISTS geojson_data (
    feature_id BIGINT,
    longitude DOUBLE,
    latitude DOUBLE,
    properties VARCHAR
)";

/// Ingestion settings
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Directory holding the input file
    pub data_dir: PathBuf,
    /// Input file name, relative to `data_dir`
    pub geojson_file: String,
    /// Explicit store path; falls back to `SENSOR_DB_PATH`, then the default file
    pub db_path: Option<PathBuf>,
    /// Row cap for `sensor_readings`
    pub limit: u32,
}

impl IngestConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            geojson_file: DEFAULT_GEOJSON_FILE.to_string(),
            db_path: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Full path of the input file
    pub fn geojson_path(&self) -> PathBuf {
        self.data_dir.join(&self.geojson_file)
    }
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub store_path: PathBuf,
    /// Features in the input collection
    pub features_read: usize,
    /// Features without a usable point geometry
    pub features_skipped: usize,
    /// Points rejected by coordinate validation
    pub points_rejected: usize,
    /// Points written to `geojson_data` (zero when the table already existed)
    pub points_written: usize,
    pub geojson_table_created: bool,
    pub sensor_table_created: bool,
    /// Rows in `sensor_readings` after the run
    pub sensor_rows: i64,
}

/// Run the ingestion job.
///
/// Both tables are created only if absent; an existing table is left as is.
pub fn run(config: &IngestConfig) -> Result<IngestReport, IngestError> {
    let geojson_path = config.geojson_path();
    if !geojson_path.exists() {
        return Err(IngestError::GeoJsonNotFound(geojson_path));
    }

    info!("Loading GeoJSON data from: {}", geojson_path.display());
    let text = std::fs::read_to_string(&geojson_path).map_err(|source| IngestError::Io {
        path: geojson_path.clone(),
        source,
    })?;
    let parsed = parse_feature_collection(&text)?;

    let validator = Validator::default();
    let mut points = Vec::with_capacity(parsed.points.len());
    let mut points_rejected = 0;
    for point in parsed.points {
        match validator.validate_point(point.latitude, point.longitude) {
            Ok(()) => points.push(point),
            Err(err) => {
                warn!(feature = point.feature_index, "Rejected point: {}", err);
                points_rejected += 1;
            }
        }
    }

    let manager = ConnectionManager::new(config.db_path.as_deref());
    let mut conn = manager.acquire_writable()?;
    info!("Writing to store at {}", conn.path().display());

    let written = write_tables(&mut conn, &points, config.limit)?;

    let report = IngestReport {
        store_path: manager.db_path().to_path_buf(),
        features_read: parsed.features,
        features_skipped: parsed.skipped,
        points_rejected,
        points_written: written.points_written,
        geojson_table_created: written.geojson_table_created,
        sensor_table_created: written.sensor_table_created,
        sensor_rows: written.sensor_rows,
    };
    info!(?report, "Ingestion finished");
    Ok(report)
}

struct Written {
    points_written: usize,
    geojson_table_created: bool,
    sensor_table_created: bool,
    sensor_rows: i64,
}

fn write_tables(conn: &mut Connection, points: &[GeoPoint], limit: u32) -> Result<Written, IngestError> {
    let tx = conn.transaction()?;

    let geojson_table_created = !table_exists(&tx, "geojson_data")?;
    tx.execute_batch(CREATE_GEOJSON_TABLE)?;

    let mut points_written = 0;
    if geojson_table_created {
        let mut appender = tx.appender("geojson_data")?;
        for point in points {
            appender.append_row(params![
                point.feature_index as i64,
                point.longitude,
                point.latitude,
                point.properties,
            ])?;
            points_written += 1;
        }
        appender.flush()?;
        info!("Successfully created geojson_data table");
    } else {
        warn!("geojson_data already exists, leaving it unchanged");
    }

    let sensor_table_created = !table_exists(&tx, "sensor_readings")?;
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS sensor_readings AS
         SELECT
             ROW_NUMBER() OVER () AS id,
             latitude,
             longitude,
             RANDOM() * 100 AS value
         FROM geojson_data
         LIMIT {limit}"
    ))?;
    if sensor_table_created {
        info!("Successfully created sensor_readings table");
    } else {
        warn!("sensor_readings already exists, leaving it unchanged");
    }

    let sensor_rows: i64 =
        tx.query_row("SELECT count(*) FROM sensor_readings", [], |row| row.get(0))?;

    tx.commit()?;

    Ok(Written {
        points_written,
        geojson_table_created,
        sensor_table_created,
        sensor_rows,
    })
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, IngestError> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM information_schema.tables WHERE table_name = ?",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
