//! Offline mileage calculation.
//!
//! Reads one route request or an array of them from a JSON file, computes
//! the per-state breakdowns in parallel and prints them as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use state_miles::{BoundaryStore, CalculationResult, Config, MileageCalculator, RouteRequest};

#[derive(Parser, Debug)]
#[command(name = "calculate")]
#[command(about = "Compute per-state mileage for route requests in a JSON file")]
struct Args {
    /// JSON file with a route request object or an array of them
    #[arg(short, long)]
    input: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// State boundary GeoJSON file (overrides config)
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestBatch {
    Many(Vec<RouteRequest>),
    One(RouteRequest),
}

#[derive(Serialize)]
struct Outcome {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<CalculationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<OutcomeError>,
}

#[derive(Serialize)]
struct OutcomeError {
    kind: &'static str,
    message: String,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(boundaries) = args.boundaries {
        config.boundaries.path = boundaries;
    }

    let store = BoundaryStore::load(&config.boundaries).with_context(|| {
        format!(
            "Failed to load state boundaries from {}",
            config.boundaries.path.display()
        )
    })?;
    let calculator = MileageCalculator::from_config(Arc::new(store), &config);

    let file = File::open(&args.input).context("Failed to open input file")?;
    let batch: RequestBatch =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse route requests")?;
    let requests = match batch {
        RequestBatch::Many(requests) => requests,
        RequestBatch::One(request) => vec![request],
    };

    info!("Calculating {} routes...", requests.len());

    let outcomes: Vec<Outcome> = requests
        .par_iter()
        .enumerate()
        .map(|(index, request)| match calculator.calculate(request) {
            Ok(result) => Outcome {
                index,
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!("Route {}: {}", index, e);
                Outcome {
                    index,
                    result: e.result().cloned(),
                    error: Some(OutcomeError {
                        kind: e.kind(),
                        message: e.to_string(),
                    }),
                }
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    info!("Done: {} ok, {} with errors", outcomes.len() - failed, failed);

    let output = if args.pretty {
        serde_json::to_string_pretty(&outcomes)?
    } else {
        serde_json::to_string(&outcomes)?
    };
    println!("{}", output);

    Ok(())
}
