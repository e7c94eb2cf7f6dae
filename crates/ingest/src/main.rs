//! Sensor Store Ingestion - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::Cli;

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    // .env must be loaded before parsing so DATA_DIR/GEOJSON_FILE can come from it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = cli.into_config();
    info!("DATA_DIR is set to: {}", config.data_dir.display());

    let report = ingest::run(&config)
        .with_context(|| format!("Error generating database from {}", config.geojson_path().display()))?;

    println!(
        "Wrote {} ({} features, {} points written, {} skipped, {} rejected, {} sensor readings)",
        report.store_path.display(),
        report.features_read,
        report.points_written,
        report.features_skipped,
        report.points_rejected,
        report.sensor_rows,
    );

    Ok(())
}
