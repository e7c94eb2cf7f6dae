//! Sensor Reading Record
//!
//! Typed mapping from a positional `sensor_readings` row.

use duckdb::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::StorageError;

/// Column names in positional order
const FIELDS: [&str; 4] = ["id", "latitude", "longitude", "value"];

/// One row of the `sensor_readings` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    pub value: f64,
}

impl SensorReading {
    /// Map a positional row.
    ///
    /// Returns `Ok(None)` when the row carries fewer than four fields. Columns
    /// past the fourth are ignored.
    ///
    /// NULLs are treated by position. Trailing NULLs count as absent fields, so
    /// `(3, 0, 0, NULL)` is a short row and is dropped. A NULL followed by a
    /// populated column is a present field that fails to convert, so
    /// `(3, NULL, 0, 1.0)` is a [`StorageError::DataShape`].
    pub fn from_row(row: usize, values: &[Value]) -> Result<Option<Self>, StorageError> {
        if row_width(values) < FIELDS.len() {
            return Ok(None);
        }

        let shape_error = |reason: String| StorageError::DataShape { row, reason };

        let id = integer_field(&values[0]).map_err(|found| {
            shape_error(format!("{} is not an integer: {}", FIELDS[0], found))
        })?;
        let latitude = float_field(&values[1]).map_err(|found| {
            shape_error(format!("{} is not numeric: {}", FIELDS[1], found))
        })?;
        let longitude = float_field(&values[2]).map_err(|found| {
            shape_error(format!("{} is not numeric: {}", FIELDS[2], found))
        })?;
        let value = float_field(&values[3]).map_err(|found| {
            shape_error(format!("{} is not numeric: {}", FIELDS[3], found))
        })?;

        Ok(Some(Self {
            id,
            latitude,
            longitude,
            value,
        }))
    }
}

/// Map rows in order, dropping short rows.
pub(crate) fn map_rows(rows: &[Vec<Value>]) -> Result<Vec<SensorReading>, StorageError> {
    let mut readings = Vec::with_capacity(rows.len());

    for (index, values) in rows.iter().enumerate() {
        match SensorReading::from_row(index, values)? {
            Some(reading) => readings.push(reading),
            None => debug!(row = index, width = row_width(values), "dropping short row"),
        }
    }

    Ok(readings)
}

/// Number of populated positions, ignoring trailing NULLs
fn row_width(values: &[Value]) -> usize {
    values
        .iter()
        .rposition(|v| !matches!(v, Value::Null))
        .map_or(0, |last| last + 1)
}

fn integer_field(value: &Value) -> Result<i64, String> {
    let converted = match value {
        Value::TinyInt(v) => Some(i64::from(*v)),
        Value::SmallInt(v) => Some(i64::from(*v)),
        Value::Int(v) => Some(i64::from(*v)),
        Value::BigInt(v) => Some(*v),
        Value::HugeInt(v) => i64::try_from(*v).ok(),
        Value::UTinyInt(v) => Some(i64::from(*v)),
        Value::USmallInt(v) => Some(i64::from(*v)),
        Value::UInt(v) => Some(i64::from(*v)),
        Value::UBigInt(v) => i64::try_from(*v).ok(),
        _ => None,
    };
    converted.ok_or_else(|| format!("{:?}", value))
}

fn float_field(value: &Value) -> Result<f64, String> {
    let converted = match value {
        Value::Float(v) => Some(f64::from(*v)),
        Value::Double(v) => Some(*v),
        Value::Decimal(v) => v.to_string().parse::<f64>().ok(),
        Value::TinyInt(v) => Some(f64::from(*v)),
        Value::SmallInt(v) => Some(f64::from(*v)),
        Value::Int(v) => Some(f64::from(*v)),
        Value::BigInt(v) => Some(*v as f64),
        Value::UTinyInt(v) => Some(f64::from(*v)),
        Value::USmallInt(v) => Some(f64::from(*v)),
        Value::UInt(v) => Some(f64::from(*v)),
        Value::UBigInt(v) => Some(*v as f64),
        _ => None,
    };
    converted.ok_or_else(|| format!("{:?}", value))
}
