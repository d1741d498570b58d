//! Segment distance attribution: turns an ordered route into miles per region.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::geodesy::{haversine, interpolate, METERS_PER_MILE};
use crate::config::AttributionConfig;
use crate::models::{GeoPoint, Region};
use crate::pip::PointClassifier;

/// Raw per-region mileage before reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribution {
    pub distances: BTreeMap<Region, f64>,
    /// Crossings that did not converge and were split evenly
    pub degraded_segments: usize,
    /// Segments that changed region between their endpoints
    pub crossings: usize,
}

impl Attribution {
    /// Sum over all regions, in key order
    pub fn total(&self) -> f64 {
        self.distances.values().sum()
    }

    pub fn get(&self, region: &Region) -> f64 {
        self.distances.get(region).copied().unwrap_or(0.0)
    }

    fn add(&mut self, region: &Region, miles: f64) {
        if miles.is_nan() || miles <= 0.0 {
            return;
        }
        match self.distances.get_mut(region) {
            Some(total) => *total += miles,
            None => {
                self.distances.insert(region.clone(), miles);
            }
        }
    }
}

/// Where along a segment the classification flips
struct Crossing {
    /// Fraction of the segment on the starting side
    fraction: f64,
    /// First point past the flip
    next_point: GeoPoint,
    next_region: Region,
}

/// Walks consecutive route points and attributes each segment's length
pub struct SegmentAttributor<'a> {
    classifier: &'a PointClassifier,
    config: &'a AttributionConfig,
}

impl<'a> SegmentAttributor<'a> {
    pub fn new(classifier: &'a PointClassifier, config: &'a AttributionConfig) -> Self {
        Self { classifier, config }
    }

    /// Attribute every segment of the route to the region(s) it runs through
    pub fn attribute(&self, points: &[GeoPoint]) -> Attribution {
        let mut attribution = Attribution::default();
        if points.len() < 2 {
            return attribution;
        }

        let regions = self.classifier.classify_all(points);

        for (pair, ends) in points.windows(2).zip(regions.windows(2)) {
            let (a, b) = (&pair[0], &pair[1]);
            let miles = self.segment_miles(a, b);
            if miles == 0.0 {
                continue;
            }

            if ends[0] == ends[1] {
                attribution.add(&ends[0], miles);
            } else {
                attribution.crossings += 1;
                self.split_segment(a, &ends[0], b, &ends[1], miles, 0, &mut attribution);
            }
        }

        debug!(
            "Attributed {} segments ({} crossings, {} degraded) across {} regions",
            points.len() - 1,
            attribution.crossings,
            attribution.degraded_segments,
            attribution.distances.len()
        );

        attribution
    }

    /// Segment length in miles, including the road factor
    fn segment_miles(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        haversine(a, b, self.config.earth_radius_miles) * self.config.road_factor
    }

    /// Split a segment whose endpoints lie in different regions.
    ///
    /// If the first flip leads into a third region the remainder is split
    /// again, up to `max_crossing_depth` times; past that, the remainder goes
    /// to the far endpoint's region.
    #[allow(clippy::too_many_arguments)]
    fn split_segment(
        &self,
        a: &GeoPoint,
        a_region: &Region,
        b: &GeoPoint,
        b_region: &Region,
        miles: f64,
        depth: u32,
        attribution: &mut Attribution,
    ) {
        let crossing = match self.find_crossing(a, a_region, b, b_region) {
            Some(crossing) => crossing,
            None => {
                warn!(
                    "Border crossing {} -> {} between ({}, {}) and ({}, {}) did not converge, splitting {:.3} mi evenly",
                    a_region, b_region, a.lat, a.lng, b.lat, b.lng, miles
                );
                attribution.degraded_segments += 1;
                attribution.add(a_region, miles / 2.0);
                attribution.add(b_region, miles / 2.0);
                return;
            }
        };

        let before = miles * crossing.fraction;
        let after = miles - before;
        attribution.add(a_region, before);

        if crossing.next_region == *b_region || depth >= self.config.max_crossing_depth {
            attribution.add(b_region, after);
        } else {
            self.split_segment(
                &crossing.next_point,
                &crossing.next_region,
                b,
                b_region,
                after,
                depth + 1,
                attribution,
            );
        }
    }

    /// Bisect for the point where classification first leaves `a_region`.
    ///
    /// Returns `None` when the iteration cap is hit before the bracket is
    /// narrower than the crossing tolerance.
    fn find_crossing(
        &self,
        a: &GeoPoint,
        a_region: &Region,
        b: &GeoPoint,
        b_region: &Region,
    ) -> Option<Crossing> {
        let segment_meters = haversine(a, b, self.config.earth_radius_miles) * METERS_PER_MILE;
        let tolerance = self.config.crossing_tolerance_meters;

        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        let mut hi_region = b_region.clone();
        let mut iterations = 0;

        while (hi - lo) * segment_meters > tolerance {
            if iterations >= self.config.max_bisection_iterations {
                return None;
            }
            iterations += 1;

            let mid = (lo + hi) / 2.0;
            let region = self.classifier.classify(&interpolate(a, b, mid));
            if region == *a_region {
                lo = mid;
            } else {
                hi = mid;
                hi_region = region;
            }
        }

        Some(Crossing {
            fraction: (lo + hi) / 2.0,
            next_point: interpolate(a, b, hi),
            next_region: hi_region,
        })
    }
}
