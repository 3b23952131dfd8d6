use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use geoscan::config::LoggingConfig;
use geoscan::{AppState, LocationCatalog, ScanAggregator, ScanConfig, catalog, web};

#[derive(Debug, Parser)]
#[command(name = "geoscan", version, about = "Weather + geocoding scan backend")]
struct Cli {
    /// Path to a TOML config file (defaults to ./geoscan.toml if present)
    #[arg(short, long, env = "GEOSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry.with(fmt::layer().json()).init(),
        "compact" => registry.with(fmt::layer().compact()).init(),
        _ => registry.with(fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ScanConfig::load_from_path(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_tracing(&config.logging);

    if config.weather.api_key.is_none() {
        tracing::warn!("No weather API key configured, scans will carry no weather data");
    }
    if config.geocoding.api_key.is_none() {
        tracing::warn!("No geocoding API key configured, scans will carry no geo data");
    }

    // The catalog is seeded before the listener exists, so no request can
    // observe a half-written catalog.
    let location_catalog = LocationCatalog::open(&config.catalog.database_path)
        .await
        .with_context(|| format!("Unable to open catalog {}", config.catalog.database_path))?;
    let seed = match &config.catalog.seed_file {
        Some(path) => catalog::load_seed_file(path)?,
        None => catalog::curated_locations(),
    };
    let outcome = location_catalog
        .seed(&seed)
        .await
        .context("Failed to seed location catalog")?;
    let stored = location_catalog.count().await?;
    tracing::info!(?outcome, stored, "Catalog ready");

    let scanner = ScanAggregator::from_config(&config)?;
    let state = AppState::new(scanner, location_catalog);

    web::run(&config.server, state).await
}
