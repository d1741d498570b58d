//! Error types for boundary loading and mileage calculation.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::CalculationResult;

/// Errors that can occur while loading the state boundary dataset.
///
/// All of these are fatal at startup: the service must not answer requests
/// with missing or corrupt geometry.
#[derive(Error, Debug)]
pub enum BoundaryError {
    /// IO error when reading the dataset file.
    #[error("Failed to read boundary dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not valid GeoJSON.
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The dataset parsed, but is not a FeatureCollection.
    #[error("Boundary dataset must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacks the configured name property.
    #[error("Feature {index} has no '{property}' property")]
    MissingName { index: usize, property: String },

    /// A feature has no geometry at all.
    #[error("Feature {index} ({name}) has no geometry")]
    MissingGeometry { index: usize, name: String },

    /// A feature has a geometry that is not a Polygon or MultiPolygon.
    #[error("Feature {index} ({name}) has unsupported geometry type {kind}")]
    UnsupportedGeometry {
        index: usize,
        name: String,
        kind: String,
    },

    /// A polygon ring could not be built from the feature's coordinates.
    #[error("Feature {index} ({name}) has invalid geometry: {reason}")]
    InvalidGeometry {
        index: usize,
        name: String,
        reason: String,
    },

    /// Nothing usable was loaded.
    #[error("Boundary dataset contains no recognised states")]
    Empty,
}

/// Errors returned by a mileage calculation.
#[derive(Error, Debug, Clone)]
pub enum MileageError {
    /// The request was rejected before entering the calculation.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The calculation completed, but the breakdown diverges too far from the
    /// reference total to be trusted. The best-effort result is attached.
    #[error("Unreliable result: {reason}")]
    Unreliable {
        reason: String,
        result: Box<CalculationResult>,
    },
}

impl MileageError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        MileageError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind, used in HTTP and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            MileageError::InvalidInput { .. } => "invalid_input",
            MileageError::Unreliable { .. } => "unreliable_result",
        }
    }

    /// Best-effort breakdown, if the calculation got that far.
    pub fn result(&self) -> Option<&CalculationResult> {
        match self {
            MileageError::InvalidInput { .. } => None,
            MileageError::Unreliable { result, .. } => Some(result),
        }
    }
}

/// Result type alias using [`MileageError`].
pub type Result<T> = std::result::Result<T, MileageError>;
