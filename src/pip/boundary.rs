//! State boundary polygons and boundary dataset loading.

use flate2::read::GzDecoder;
use geo::{BoundingRect, Intersects, MultiPolygon};
use geojson::{Feature, GeoJson};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};
use xxhash_rust::xxh64::xxh64;

use crate::config::BoundaryConfig;
use crate::error::BoundaryError;
use crate::models::{state_code, state_name, GeoPoint};
use crate::pip::geometry::{multipolygon_from_value, value_kind};

/// A single state's polygons with metadata
#[derive(Debug, Clone)]
pub struct StateBoundary {
    /// Canonical two-letter code, also the deterministic ordering key
    pub code: String,
    pub name: String,
    /// Outer rings with their holes; islands are separate polygons
    pub geometry: MultiPolygon<f64>,
}

impl StateBoundary {
    pub fn new(code: impl Into<String>, name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            geometry,
        }
    }

    /// Get the bounding box of this boundary
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Point-in-polygon test. Points inside a hole are outside; points
    /// exactly on a ring count as inside.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.geometry.intersects(&point.to_point())
    }
}

/// Boundary dataset as read from disk
#[derive(Debug)]
pub struct Dataset {
    /// GeoJSON bytes, gunzipped when the file name ends in `.gz`
    pub bytes: Vec<u8>,
    /// xxh64 of the file exactly as stored
    pub fingerprint: u64,
}

pub fn read_dataset(path: &Path) -> Result<Dataset, BoundaryError> {
    let io_err = |source| BoundaryError::Io {
        path: path.to_path_buf(),
        source,
    };

    let raw = fs::read(path).map_err(io_err)?;
    let fingerprint = xxh64(&raw, 0);

    let bytes = if path.extension().map_or(false, |e| e == "gz") {
        let mut bytes = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
        bytes
    } else {
        raw
    };

    debug!("Read {} bytes of boundary data from {}", bytes.len(), path.display());
    Ok(Dataset { bytes, fingerprint })
}

/// Parse a GeoJSON FeatureCollection into state boundaries.
///
/// Features whose name is not a known state and that carry no code are
/// skipped. Structural problems fail the whole dataset.
pub fn parse_boundaries(
    bytes: &[u8],
    config: &BoundaryConfig,
) -> Result<Vec<StateBoundary>, BoundaryError> {
    let geojson: GeoJson = serde_json::from_slice(bytes)?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(BoundaryError::NotFeatureCollection),
    };

    info!(
        "Parsing {} boundary features...",
        collection.features.len()
    );

    let mut boundaries = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = string_property(&feature, &config.name_property);
        let code = config
            .code_property
            .as_deref()
            .and_then(|key| string_property(&feature, key))
            .map(|code| code.trim().to_ascii_uppercase())
            .or_else(|| name.as_deref().and_then(state_code).map(String::from));

        // Coded features without a name take the canonical state name
        let name = match name.or_else(|| code.as_deref().and_then(state_name).map(String::from)) {
            Some(name) => name,
            None => {
                return Err(BoundaryError::MissingName {
                    index,
                    property: config.name_property.clone(),
                })
            }
        };

        let code = match code {
            Some(code) => code,
            None => {
                warn!("Skipping feature {} ({}): not a known state", index, name);
                continue;
            }
        };

        let geometry = match &feature.geometry {
            Some(g) => g,
            None => return Err(BoundaryError::MissingGeometry { index, name }),
        };

        let polygons = match multipolygon_from_value(&geometry.value) {
            Ok(Some(mp)) => mp,
            Ok(None) => {
                return Err(BoundaryError::UnsupportedGeometry {
                    index,
                    name,
                    kind: value_kind(&geometry.value).to_string(),
                })
            }
            Err(reason) => return Err(BoundaryError::InvalidGeometry { index, name, reason }),
        };

        debug!(
            "Feature {}: {} ({}) with {} polygons",
            index,
            name,
            code,
            polygons.0.len()
        );
        boundaries.push(StateBoundary::new(code, name, polygons));
    }

    info!("Found {} state boundaries", boundaries.len());

    Ok(boundaries)
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.properties.as_ref()?.get(key)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
