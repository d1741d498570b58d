//! Mileage calculation entry point: validate, attribute, reconcile.

use std::sync::Arc;
use tracing::debug;

use super::attribution::SegmentAttributor;
use super::reconcile::reconcile;
use crate::config::{AttributionConfig, Config, ReconciliationConfig};
use crate::error::Result;
use crate::models::{CalculationResult, RouteRequest};
use crate::pip::{BoundaryStore, PointClassifier};

/// Stateless calculator over a shared, immutable boundary store.
///
/// Cheap to clone and safe to call from any number of threads at once.
#[derive(Clone)]
pub struct MileageCalculator {
    classifier: PointClassifier,
    attribution: AttributionConfig,
    reconciliation: ReconciliationConfig,
}

impl MileageCalculator {
    pub fn new(
        store: Arc<BoundaryStore>,
        attribution: AttributionConfig,
        reconciliation: ReconciliationConfig,
    ) -> Self {
        Self {
            classifier: PointClassifier::new(store),
            attribution,
            reconciliation,
        }
    }

    pub fn from_config(store: Arc<BoundaryStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.attribution.clone(),
            config.reconciliation.clone(),
        )
    }

    /// Per-state mileage for one route.
    pub fn calculate(&self, request: &RouteRequest) -> Result<CalculationResult> {
        request.validate()?;

        debug!(
            "Calculating {} points against reference {:.3} mi",
            request.route_details.len(),
            request.total_distance
        );

        let attribution = SegmentAttributor::new(&self.classifier, &self.attribution)
            .attribute(&request.route_details);

        let include_unresolved = request
            .include_unresolved
            .unwrap_or(self.reconciliation.include_unresolved);

        reconcile(
            attribution,
            request.total_distance,
            include_unresolved,
            &self.reconciliation,
        )
    }

    pub fn classifier(&self) -> &PointClassifier {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, CO_KS_BORDER_LNG};
    use crate::mileage::geodesy::haversine_miles;
    use crate::models::{GeoPoint, UNRESOLVED_KEY};

    fn calculator() -> MileageCalculator {
        MileageCalculator::from_config(Arc::new(fixtures::plains_store()), &Config::default())
    }

    fn route_length(points: &[GeoPoint]) -> f64 {
        points.windows(2).map(|w| haversine_miles(&w[0], &w[1])).sum()
    }

    fn assert_sum_invariant(result: &CalculationResult) {
        assert!(
            (result.sum() - result.total_distance).abs() <= result.total_distance * 0.005,
            "sum {} vs total {}",
            result.sum(),
            result.total_distance
        );
    }

    #[test]
    fn test_single_state_route() {
        let points = vec![GeoPoint::new(39.74, -104.99), GeoPoint::new(38.83, -104.82)];
        let total = route_length(&points);
        let result = calculator()
            .calculate(&RouteRequest::new(points, total))
            .unwrap();

        assert_eq!(result.state_distances.len(), 1);
        assert!((result.get("CO").unwrap() - total).abs() < 1e-9);
        assert_sum_invariant(&result);
    }

    #[test]
    fn test_multi_state_route_matches_provider_total() {
        let points = vec![
            GeoPoint::new(42.87, -106.31),
            GeoPoint::new(41.14, -104.82),
            GeoPoint::new(39.74, -104.99),
            GeoPoint::new(38.5, -103.0),
            GeoPoint::new(38.5, -101.0),
            GeoPoint::new(37.69, -97.34),
        ];
        // Road distance runs ~15% over the polyline
        let provider_total = route_length(&points) * 1.15;
        let result = calculator()
            .calculate(&RouteRequest::new(points, provider_total))
            .unwrap();

        for code in ["WY", "CO", "KS"] {
            assert!(result.get(code).unwrap() > 0.0, "{} missing", code);
        }
        assert!((result.total_distance - provider_total).abs() < 1e-6);
        assert_sum_invariant(&result);
    }

    #[test]
    fn test_route_outside_all_states() {
        let points = vec![GeoPoint::new(30.0, -140.0), GeoPoint::new(31.0, -141.0)];
        let total = route_length(&points);
        let result = calculator()
            .calculate(&RouteRequest::new(points, total))
            .unwrap();

        assert_eq!(result.state_distances.len(), 1);
        assert!((result.unresolved() - total).abs() < 1e-9);
        assert_sum_invariant(&result);
    }

    #[test]
    fn test_unresolved_opt_out_renormalizes() {
        // North out of the KS fixture into the gap above it, 80% inside KS
        let points = vec![GeoPoint::new(38.0, -97.34), GeoPoint::new(40.5, -97.34)];
        let total = route_length(&points);
        let mut request = RouteRequest::new(points, total);
        request.include_unresolved = Some(false);

        let result = calculator().calculate(&request).unwrap();
        assert_eq!(result.get(UNRESOLVED_KEY), None);
        assert!((result.get("KS").unwrap() - total).abs() < 1e-6);
        assert_sum_invariant(&result);
    }

    #[test]
    fn test_antipodal_segment_stays_finite() {
        let points = vec![
            GeoPoint::new(-87.843, -178.7673),
            GeoPoint::new(87.843, 1.2327),
        ];
        let result = calculator()
            .calculate(&RouteRequest::new(points, 12000.0))
            .unwrap();

        assert!(result.unresolved().is_finite());
        assert!((result.total_distance - 12000.0).abs() < 1e-6);
        assert_sum_invariant(&result);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let err = calculator()
            .calculate(&RouteRequest::new(vec![GeoPoint::new(39.74, -104.99)], 10.0))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_identical_requests_identical_results() {
        let points = vec![
            GeoPoint::new(38.0, -104.0),
            GeoPoint::new(38.0, CO_KS_BORDER_LNG),
            GeoPoint::new(38.2, -99.0),
        ];
        let request = RouteRequest::new(points.clone(), route_length(&points));
        let calc = calculator();
        assert_eq!(calc.calculate(&request).unwrap(), calc.calculate(&request).unwrap());
    }

    #[test]
    fn test_concurrent_calculations() {
        let calc = calculator();
        let points = vec![GeoPoint::new(38.5, -103.0), GeoPoint::new(38.5, -101.0)];
        let request = RouteRequest::new(points.clone(), route_length(&points));
        let expected = calc.calculate(&request).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| calc.calculate(&request).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
