//! Sensor Readings API Server
//!
//! Serves the `sensor_readings` table of the DuckDB store as JSON.

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod error;
mod routes;

pub use crate::config::ApiConfig;
pub use crate::error::{ApiError, ErrorBody};
pub use routes::health::HealthResponse;

use storage::{ConnectionManager, Repository};

/// Application state shared across handlers.
///
/// Immutable: each request opens its own connection, so no lock is held
/// across requests.
pub struct AppState {
    /// Sensor readings repository
    pub repository: Repository,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// State for the store named by `config`, `SENSOR_DB_PATH` or the default file
    pub fn from_config(config: &ApiConfig) -> Self {
        let connections = ConnectionManager::new(config.database_path.as_deref());
        info!("Serving store at {}", connections.db_path().display());
        Self::new(Repository::new(connections))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_handler))
        .route(
            "/data/sensor_readings",
            get(routes::sensor_readings::get_sensor_readings),
        )
        .with_state(state)
}

/// CORS policy for the given origins. Credentials are allowed, so methods
/// and headers are mirrored from the request rather than wildcarded.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Router with state, request tracing and CORS, ready to serve
pub fn build_app(config: &ApiConfig) -> Router {
    let state = Arc::new(AppState::from_config(config));

    create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_origins)),
    )
}

/// Initialize logging. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Run the server until Ctrl-C
pub async fn run_server(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();
    let app = build_app(&config);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
