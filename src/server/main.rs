//! Route mileage HTTP server.
//!
//! Loads the state boundary dataset once at startup and serves per-state
//! mileage breakdowns for routes posted by the route form.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state_miles::api::{router, AppState};
use state_miles::{BoundaryStore, Config, MileageCalculator};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Per-state route mileage server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// State boundary GeoJSON file (overrides config)
    #[arg(long)]
    boundaries: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(boundaries) = args.boundaries {
        config.boundaries.path = boundaries;
    }

    info!("State Miles Server");

    // Without geometry there is nothing to serve
    let store = BoundaryStore::load(&config.boundaries).with_context(|| {
        format!(
            "Failed to load state boundaries from {}",
            config.boundaries.path.display()
        )
    })?;
    info!("Loaded {} state boundaries", store.len());

    let calculator = MileageCalculator::from_config(Arc::new(store), &config);
    let state = Arc::new(AppState::new(calculator));
    let app = router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
