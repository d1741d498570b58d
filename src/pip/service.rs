//! Point classifier: resolves the single owning state for a point.

use std::sync::Arc;
use tracing::trace;

use super::{BoundaryStore, StateBoundary};
use crate::models::{GeoPoint, Region};

/// Point-in-Polygon lookup service
#[derive(Clone)]
pub struct PointClassifier {
    store: Arc<BoundaryStore>,
}

impl PointClassifier {
    /// Create a classifier over a shared boundary store
    pub fn new(store: Arc<BoundaryStore>) -> Self {
        Self { store }
    }

    /// The owning state, if any.
    ///
    /// Candidates are tested in ascending code order and the first polygon
    /// that contains the point wins. A point lying exactly on a shared
    /// border therefore always resolves to the alphabetically first state.
    pub fn lookup(&self, point: &GeoPoint) -> Option<&StateBoundary> {
        let found = self
            .store
            .candidates(point)
            .into_iter()
            .find(|b| b.contains(point));

        trace!(
            "PIP lookup at ({}, {}): {}",
            point.lat,
            point.lng,
            found.map_or("unresolved", |b| b.code.as_str())
        );

        found
    }

    /// Classify a point as a state or unresolved
    pub fn classify(&self, point: &GeoPoint) -> Region {
        match self.lookup(point) {
            Some(boundary) => Region::State(boundary.code.clone()),
            None => Region::Unresolved,
        }
    }

    /// Classify every point of a route, in order
    pub fn classify_all(&self, points: &[GeoPoint]) -> Vec<Region> {
        points.iter().map(|p| self.classify(p)).collect()
    }

    /// Get the boundary store (for stats/health)
    pub fn store(&self) -> &BoundaryStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn state(code: &str) -> Region {
        Region::State(code.to_string())
    }

    #[test]
    fn test_empty_store_is_unresolved() {
        let classifier = PointClassifier::new(Arc::new(BoundaryStore::from_boundaries(vec![])));
        assert_eq!(
            classifier.classify(&GeoPoint::new(39.74, -104.99)),
            Region::Unresolved
        );
    }

    #[test]
    fn test_interior_fixture_points() {
        let classifier = fixtures::plains_classifier();
        for (code, point) in fixtures::interior_points() {
            assert_eq!(classifier.classify(&point), state(code), "{:?}", point);
        }
    }

    #[test]
    fn test_outside_all_states() {
        let classifier = fixtures::plains_classifier();
        // Pacific Ocean: no candidates at all
        assert_eq!(
            classifier.classify(&GeoPoint::new(30.0, -140.0)),
            Region::Unresolved
        );
        // Gap north of the KS fixture and east of CO
        assert_eq!(
            classifier.classify(&GeoPoint::new(40.5, -97.0)),
            Region::Unresolved
        );
    }

    #[test]
    fn test_shared_border_tie_break() {
        let classifier = fixtures::plains_classifier();
        let on_border = GeoPoint::new(38.0, -102.05);
        assert!(classifier.store().get("CO").unwrap().contains(&on_border));
        assert!(classifier.store().get("KS").unwrap().contains(&on_border));
        for _ in 0..10 {
            assert_eq!(classifier.classify(&on_border), state("CO"));
        }
    }

    #[test]
    fn test_holes_are_not_inside() {
        let store = fixtures::enclave_store(false);
        let classifier = PointClassifier::new(Arc::new(store));
        assert_eq!(classifier.classify(&GeoPoint::new(-5.0, 15.0)), Region::Unresolved);
        assert_eq!(classifier.classify(&GeoPoint::new(-1.0, 11.0)), state("MD"));

        let classifier = PointClassifier::new(Arc::new(fixtures::enclave_store(true)));
        assert_eq!(classifier.classify(&GeoPoint::new(-5.0, 15.0)), state("DC"));
        assert_eq!(classifier.classify(&GeoPoint::new(-1.0, 11.0)), state("MD"));
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let classifier = fixtures::plains_classifier();
        let regions = classifier.classify_all(&[
            GeoPoint::new(37.69, -97.34),
            GeoPoint::new(39.74, -104.99),
            GeoPoint::new(30.0, -140.0),
        ]);
        assert_eq!(regions, vec![state("KS"), state("CO"), Region::Unresolved]);
    }
}
