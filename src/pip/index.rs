//! Boundary store: immutable state geometry behind an R-tree.

use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use super::boundary::{parse_boundaries, read_dataset, StateBoundary};
use crate::config::BoundaryConfig;
use crate::error::BoundaryError;
use crate::models::GeoPoint;

/// R-tree entry pointing into the code-sorted boundary list
#[derive(Clone)]
struct IndexedBoundary {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Write-once, read-many store of state boundaries.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// calculation. Nothing in here is mutated after construction.
pub struct BoundaryStore {
    tree: RTree<IndexedBoundary>,
    /// Sorted by canonical code; R-tree slots index into this
    boundaries: Vec<Arc<StateBoundary>>,
    by_code: HashMap<String, usize>,
    fingerprint: Option<u64>,
}

impl BoundaryStore {
    /// Load and index the configured dataset.
    ///
    /// Any failure here means the process must not serve requests.
    pub fn load(config: &BoundaryConfig) -> Result<Self, BoundaryError> {
        info!("Loading state boundaries from {}", config.path.display());

        let dataset = read_dataset(&config.path)?;
        let fingerprint = dataset.fingerprint;
        let boundaries = parse_boundaries(&dataset.bytes, config)?;

        let mut store = Self::from_boundaries(boundaries);
        if store.is_empty() {
            return Err(BoundaryError::Empty);
        }
        store.fingerprint = Some(fingerprint);

        info!("Boundary dataset version {:016x}", fingerprint);
        Ok(store)
    }

    /// Build the store from in-memory boundaries.
    ///
    /// Boundaries sharing a code are merged into one MultiPolygon; boundaries
    /// without any extent are dropped.
    pub fn from_boundaries(boundaries: Vec<StateBoundary>) -> Self {
        info!(
            "Building spatial index for {} boundaries...",
            boundaries.len()
        );

        let mut merged: HashMap<String, StateBoundary> = HashMap::new();
        for boundary in boundaries {
            match merged.get_mut(&boundary.code) {
                Some(existing) => existing.geometry.0.extend(boundary.geometry.0),
                None => {
                    merged.insert(boundary.code.clone(), boundary);
                }
            }
        }

        let mut sorted: Vec<StateBoundary> = merged
            .into_values()
            .filter(|b| {
                let has_extent = b.bbox().is_some();
                if !has_extent {
                    warn!("Dropping boundary {} ({}): empty geometry", b.code, b.name);
                }
                has_extent
            })
            .collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));

        let boundaries: Vec<Arc<StateBoundary>> = sorted.into_iter().map(Arc::new).collect();

        let indexed: Vec<IndexedBoundary> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(slot, b)| {
                let (min_x, min_y, max_x, max_y) = b.bbox()?;
                Some(IndexedBoundary {
                    slot,
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                })
            })
            .collect();

        let by_code = boundaries
            .iter()
            .enumerate()
            .map(|(slot, b)| (b.code.clone(), slot))
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self {
            tree,
            boundaries,
            by_code,
            fingerprint: None,
        }
    }

    /// States whose bounding rectangle contains the point, in ascending code
    /// order. An empty result means the point is outside every state.
    pub fn candidates(&self, point: &GeoPoint) -> Vec<&StateBoundary> {
        let query_envelope = AABB::from_point([point.lng, point.lat]);

        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|ib| ib.slot)
            .collect();
        slots.sort_unstable();

        slots
            .into_iter()
            .map(|slot| self.boundaries[slot].as_ref())
            .collect()
    }

    /// Look up a boundary by canonical code
    pub fn get(&self, code: &str) -> Option<&StateBoundary> {
        self.by_code
            .get(code)
            .map(|&slot| self.boundaries[slot].as_ref())
    }

    /// All boundaries, sorted by code
    pub fn boundaries(&self) -> &[Arc<StateBoundary>] {
        &self.boundaries
    }

    /// xxh64 of the dataset file as stored (compressed for `.gz`), when loaded from a file
    pub fn fingerprint(&self) -> Option<u64> {
        self.fingerprint
    }

    /// Get total number of indexed boundaries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
