//! Point-in-Polygon (PIP) state lookup.
//!
//! Loads state boundaries from a GeoJSON dataset and provides fast PIP
//! lookups using an R-tree spatial index.

mod boundary;
pub mod geometry;
mod index;
mod service;

pub use boundary::{parse_boundaries, read_dataset, Dataset, StateBoundary};
pub use index::BoundaryStore;
pub use service::PointClassifier;
