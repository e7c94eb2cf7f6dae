//! Sensor Reading Routes

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;
use storage::SensorReading;

/// Get every sensor reading in the store.
///
/// The query runs on the blocking pool with its own connection. If the
/// client goes away the task still runs to completion and releases it.
pub async fn get_sensor_readings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SensorReading>>, ApiError> {
    let repository = state.repository.clone();

    let readings = tokio::task::spawn_blocking(move || repository.get_sensor_readings()).await??;
    debug!("Returning {} sensor readings", readings.len());

    Ok(Json(readings))
}
