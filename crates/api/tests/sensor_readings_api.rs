//! API Integration Tests
//!
//! Runs the real router on a random port against throwaway DuckDB stores.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use api::{build_app, create_router, ApiConfig, AppState};
use serde_json::{json, Value};
use storage::{ConnectionManager, ReleaseHook, Repository};
use tempfile::TempDir;
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

const SCHEMA: &str =
    "CREATE TABLE sensor_readings (id BIGINT, latitude DOUBLE, longitude DOUBLE, value DOUBLE);";

/// Create a store in a fresh temp dir by running `sql`.
fn create_store(sql: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sensors.duckdb");
    let conn = ConnectionManager::new(Some(path.as_path()))
        .acquire_writable()
        .expect("Failed to create store");
    conn.execute_batch(sql).expect("Failed to seed store");
    (dir, path)
}

/// Start test server for the store at `db_path` and return base URL.
async fn start_test_server(db_path: &Path) -> String {
    let config = ApiConfig {
        database_path: Some(db_path.to_path_buf()),
        ..ApiConfig::default()
    };
    let router = build_app(&config);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn get_readings(base_url: &str) -> reqwest::Response {
    reqwest::get(format!("{}/data/sensor_readings", base_url))
        .await
        .expect("Failed to send request")
}

// =============================================================================
// Sensor Readings
// =============================================================================

#[tokio::test]
async fn test_returns_well_formed_rows_and_drops_short_row() {
    let (_dir, path) = create_store(&format!(
        "{SCHEMA}
         INSERT INTO sensor_readings VALUES
           (1, 37.1, -122.1, 10.5),
           (2, 37.2, -122.2, 20.0),
           (3, 0, 0, NULL);"
    ));
    let base_url = start_test_server(&path).await;

    let resp = get_readings(&base_url).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(
        body,
        json!([
            {"id": 1, "latitude": 37.1, "longitude": -122.1, "value": 10.5},
            {"id": 2, "latitude": 37.2, "longitude": -122.2, "value": 20.0}
        ])
    );
}

#[tokio::test]
async fn test_empty_table_returns_empty_array() {
    let (_dir, path) = create_store(SCHEMA);
    let base_url = start_test_server(&path).await;

    let resp = get_readings(&base_url).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_missing_store_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = start_test_server(&dir.path().join("missing.duckdb")).await;

    let resp = get_readings(&base_url).await;
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().expect("detail must be a string");
    assert!(detail.contains("cannot open store"));
    assert!(detail.contains("missing.duckdb"));
}

#[tokio::test]
async fn test_missing_table_returns_500() {
    let (_dir, path) = create_store("CREATE TABLE geojson_data (x INTEGER);");
    let base_url = start_test_server(&path).await;

    let resp = get_readings(&base_url).await;
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("query failed"));
    assert!(detail.contains("sensor_readings"));
}

#[tokio::test]
async fn test_unmappable_row_returns_500() {
    let (_dir, path) = create_store(
        "CREATE TABLE sensor_readings (id VARCHAR, latitude DOUBLE, longitude DOUBLE, value DOUBLE);
         INSERT INTO sensor_readings VALUES ('abc', 1.0, 2.0, 3.0);",
    );
    let base_url = start_test_server(&path).await;

    let resp = get_readings(&base_url).await;
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("unexpected shape"));
}

#[tokio::test]
async fn test_query_parameters_are_ignored() {
    let (_dir, path) = create_store(&format!(
        "{SCHEMA} INSERT INTO sensor_readings VALUES (7, 1.0, 2.0, 3.0);"
    ));
    let base_url = start_test_server(&path).await;

    let resp = reqwest::get(format!("{}/data/sensor_readings?limit=0&page=2", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let (_dir, path) = create_store(&format!(
        "{SCHEMA}
         INSERT INTO sensor_readings SELECT i, 0.0, 0.0, i FROM range(50) t(i);"
    ));
    let base_url = start_test_server(&path).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let base_url = base_url.clone();
            tokio::spawn(async move {
                let resp = get_readings(&base_url).await;
                let status = resp.status();
                let body: Value = resp.json().await.unwrap();
                (status, body.as_array().map(|rows| rows.len()))
            })
        })
        .collect();

    for task in tasks {
        let (status, len) = task.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(len, Some(50));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_request_still_releases_connection() {
    let (_dir, path) = create_store(&format!(
        "{SCHEMA}
         INSERT INTO sensor_readings SELECT i, 0.0, 0.0, i FROM range(2000000) t(i);"
    ));

    let released = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&released);
    let hook: ReleaseHook = Arc::new(move |_path: &Path| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let repository = Repository::new(ConnectionManager::new(Some(path.as_path())).with_release_hook(hook));
    let router = create_router(Arc::new(AppState::new(repository)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let err = client
        .get(format!("http://{}/data/sensor_readings", addr))
        .send()
        .await
        .expect_err("request should time out before the 2M-row read finishes");
    assert!(err.is_timeout());

    let deadline = Instant::now() + Duration::from_secs(60);
    while released.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(released.load(Ordering::SeqCst), 1);

    // No second release once the abandoned read has finished.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Health & CORS
// =============================================================================

#[tokio::test]
async fn test_health_does_not_touch_store() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = start_test_server(&dir.path().join("missing.duckdb")).await;

    let resp = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["database_path"]
        .as_str()
        .unwrap()
        .ends_with("missing.duckdb"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let (_dir, path) = create_store(SCHEMA);
    let base_url = start_test_server(&path).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/data/sensor_readings", base_url))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (_dir, path) = create_store(SCHEMA);
    let base_url = start_test_server(&path).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/data/sensor_readings", base_url))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
