//! Repository Implementation

use duckdb::types::Value;
use duckdb::{Connection, Statement};
use tracing::{debug, info};

use crate::connection::ConnectionManager;
use crate::record::{map_rows, SensorReading};
use crate::StorageError;

/// Fixed read query. No ORDER BY: rows come back in store order.
pub const SENSOR_READINGS_QUERY: &str = "SELECT * FROM sensor_readings";

/// Read-only access to the `sensor_readings` table
#[derive(Debug, Clone)]
pub struct Repository {
    connections: ConnectionManager,
}

impl Repository {
    /// Create a repository over the given connection manager
    pub fn new(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    /// Connection manager backing this repository
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Fetch every sensor reading.
    ///
    /// Opens a fresh connection for this call only. Rows with fewer than four
    /// fields are skipped; any other mapping failure aborts the call.
    pub fn get_sensor_readings(&self) -> Result<Vec<SensorReading>, StorageError> {
        let conn = self.connections.acquire()?;

        let rows = fetch_rows(&conn, SENSOR_READINGS_QUERY).map_err(StorageError::Query)?;
        debug!("Fetched {} rows from sensor_readings", rows.len());

        let readings = map_rows(&rows)?;
        info!(
            path = %conn.path().display(),
            rows = rows.len(),
            readings = readings.len(),
            "Loaded sensor readings"
        );

        Ok(readings)
    }
}

/// Run `sql` and collect every row as positional values
fn fetch_rows(conn: &Connection, sql: &str) -> Result<Vec<Vec<Value>>, duckdb::Error> {
    let mut statement = conn.prepare(sql)?;
    let mut rows = statement.query([])?;
    let mut output = Vec::new();

    while let Some(row) = rows.next()? {
        let statement: &Statement<'_> = row.as_ref();
        let width = statement.column_count();

        let mut values = Vec::with_capacity(width);
        for index in 0..width {
            values.push(row.get::<_, Value>(index)?);
        }
        output.push(values);
    }

    Ok(output)
}
