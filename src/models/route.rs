//! Route request structure (the inbound contract).

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::{MileageError, Result};

/// Geographic point (lat/lng, WGS84 decimal degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within the WGS84 coordinate range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// As a `geo` point (x = longitude, y = latitude)
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// A mileage calculation request.
///
/// Field names follow what the route form posts: `route_details` holds the
/// decoded polyline and `total_google_distance` is accepted as an alias for
/// the provider's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Ordered route points decoded from the provider's polyline
    pub route_details: Vec<GeoPoint>,

    /// Reference total distance in miles, as reported by the mapping provider
    #[serde(alias = "total_google_distance")]
    pub total_distance: f64,

    /// Per-request override for keeping "unresolved" mileage in the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_unresolved: Option<bool>,
}

impl RouteRequest {
    pub fn new(route_details: Vec<GeoPoint>, total_distance: f64) -> Self {
        Self {
            route_details,
            total_distance,
            include_unresolved: None,
        }
    }

    /// Reject requests that must not reach the calculation.
    pub fn validate(&self) -> Result<()> {
        if self.route_details.len() < 2 {
            return Err(MileageError::invalid(format!(
                "route needs at least 2 points, got {}",
                self.route_details.len()
            )));
        }

        if let Some((i, p)) = self
            .route_details
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_valid())
        {
            return Err(MileageError::invalid(format!(
                "point {} has invalid coordinates (lat={}, lng={})",
                i, p.lat, p.lng
            )));
        }

        if !self.total_distance.is_finite() || self.total_distance < 0.0 {
            return Err(MileageError::invalid(format!(
                "total distance must be a non-negative number, got {}",
                self.total_distance
            )));
        }

        Ok(())
    }
}
