//! State Miles - per-state mileage breakdown for driving routes.
//!
//! This library provides the boundary store, point classifier and mileage
//! calculation shared by the `server` and `calculate` binaries.

pub mod api;
pub mod config;
pub mod error;
pub mod mileage;
pub mod models;
pub mod pip;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::Config;
pub use error::{BoundaryError, MileageError};
pub use mileage::MileageCalculator;
pub use models::{CalculationResult, GeoPoint, Region, RouteRequest};
pub use pip::{BoundaryStore, PointClassifier, StateBoundary};
