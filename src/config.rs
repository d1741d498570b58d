//! Service configuration, loaded from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mileage::geodesy::WGS84_MEAN_RADIUS_MILES;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub boundaries: BoundaryConfig,
    pub attribution: AttributionConfig,
    pub reconciliation: ReconciliationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Where the state polygons come from and how features are named
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundaryConfig {
    /// GeoJSON FeatureCollection, optionally gzipped
    pub path: PathBuf,
    /// Feature property holding the state name
    pub name_property: String,
    /// Feature property holding the two-letter code; names are mapped
    /// through the state table when unset or missing
    pub code_property: Option<String>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/state_boundaries.geojson"),
            name_property: "NAME".to_string(),
            code_property: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AttributionConfig {
    pub earth_radius_miles: f64,
    /// Multiplier applied to every segment for road curvature
    pub road_factor: f64,
    /// Border crossings are located to within this distance
    pub crossing_tolerance_meters: f64,
    pub max_bisection_iterations: u32,
    /// How many intermediate regions one segment may pass through
    pub max_crossing_depth: u32,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            earth_radius_miles: WGS84_MEAN_RADIUS_MILES,
            road_factor: 1.0,
            crossing_tolerance_meters: 10.0,
            max_bisection_iterations: 32,
            max_crossing_depth: 4,
        }
    }
}

/// Which total the per-state breakdown is reconciled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTotal {
    /// The mapping provider's total sent with the request
    #[default]
    Provider,
    /// The great-circle sum over the polyline itself
    Polyline,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub reference: ReferenceTotal,
    /// Relative divergence above which values are rescaled
    pub rescale_threshold: f64,
    /// Scale ratios outside [1/max, max] are reported as unreliable
    pub max_scale_ratio: f64,
    pub include_unresolved: bool,
    /// States below this many miles are dropped and the rest re-normalized
    pub min_state_miles: f64,
    /// Round output values to this many decimal places
    pub decimals: Option<u32>,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceTotal::Provider,
            rescale_threshold: 0.02,
            max_scale_ratio: 2.0,
            include_unresolved: true,
            min_state_miles: 0.0,
            decimals: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let a = &self.attribution;
        if !(a.earth_radius_miles > 0.0) {
            anyhow::bail!("attribution.earth_radius_miles must be positive");
        }
        if !(a.road_factor > 0.0) {
            anyhow::bail!("attribution.road_factor must be positive");
        }
        if !(a.crossing_tolerance_meters > 0.0) {
            anyhow::bail!("attribution.crossing_tolerance_meters must be positive");
        }
        let r = &self.reconciliation;
        if !(r.rescale_threshold >= 0.0) {
            anyhow::bail!("reconciliation.rescale_threshold must not be negative");
        }
        if !(r.max_scale_ratio >= 1.0) {
            anyhow::bail!("reconciliation.max_scale_ratio must be at least 1.0");
        }
        if !(r.min_state_miles >= 0.0) {
            anyhow::bail!("reconciliation.min_state_miles must not be negative");
        }
        Ok(())
    }
}
