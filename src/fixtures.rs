//! Shared boundary fixtures for unit tests.
//!
//! Rectangular approximations of Colorado, Kansas and Wyoming. CO and KS
//! share a straight border at longitude -102.05; CO and WY share latitude 41.

use geo::{coord, MultiPolygon, Polygon, Rect};
use std::sync::Arc;

use crate::models::GeoPoint;
use crate::pip::{BoundaryStore, PointClassifier, StateBoundary};

pub const CO_KS_BORDER_LNG: f64 = -102.05;

pub fn rect(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> MultiPolygon<f64> {
    let rect = Rect::new(
        coord! { x: min_lng, y: min_lat },
        coord! { x: max_lng, y: max_lat },
    );
    MultiPolygon::new(vec![rect.to_polygon()])
}

pub fn plains_boundaries() -> Vec<StateBoundary> {
    vec![
        StateBoundary::new("WY", "Wyoming", rect(-111.05, 41.0, -104.05, 45.0)),
        StateBoundary::new("KS", "Kansas", rect(CO_KS_BORDER_LNG, 37.0, -94.6, 40.0)),
        StateBoundary::new("CO", "Colorado", rect(-109.05, 37.0, CO_KS_BORDER_LNG, 41.0)),
    ]
}

pub fn plains_store() -> BoundaryStore {
    BoundaryStore::from_boundaries(plains_boundaries())
}

pub fn plains_classifier() -> PointClassifier {
    PointClassifier::new(Arc::new(plains_store()))
}

/// Same shapes as [`plains_boundaries`], as a GeoJSON dataset
pub const PLAINS_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"NAME": "Colorado"},
         "geometry": {"type": "Polygon", "coordinates": [[[-109.05, 37.0], [-102.05, 37.0], [-102.05, 41.0], [-109.05, 41.0], [-109.05, 37.0]]]}},
        {"type": "Feature", "properties": {"NAME": "Kansas"},
         "geometry": {"type": "Polygon", "coordinates": [[[-102.05, 37.0], [-94.6, 37.0], [-94.6, 40.0], [-102.05, 40.0], [-102.05, 37.0]]]}},
        {"type": "Feature", "properties": {"NAME": "Wyoming"},
         "geometry": {"type": "Polygon", "coordinates": [[[-111.05, 41.0], [-104.05, 41.0], [-104.05, 45.0], [-111.05, 45.0], [-111.05, 41.0]]]}}
    ]
}"#;

/// Points well inside each fixture state
pub fn interior_points() -> Vec<(&'static str, GeoPoint)> {
    vec![
        ("CO", GeoPoint::new(39.74, -104.99)), // Denver
        ("CO", GeoPoint::new(38.83, -104.82)), // Colorado Springs
        ("KS", GeoPoint::new(37.69, -97.34)),  // Wichita
        ("KS", GeoPoint::new(39.05, -95.68)),  // Topeka
        ("WY", GeoPoint::new(41.14, -104.82)), // Cheyenne
        ("WY", GeoPoint::new(42.87, -106.31)), // Casper
    ]
}

/// Points on or within a few meters of a fixture border
pub fn border_points() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(38.0, CO_KS_BORDER_LNG),
        GeoPoint::new(38.0, CO_KS_BORDER_LNG - 0.0001),
        GeoPoint::new(38.0, CO_KS_BORDER_LNG + 0.0001),
        GeoPoint::new(37.0, -103.0),
        GeoPoint::new(40.0, -99.0),
        GeoPoint::new(41.0, -105.0),
        GeoPoint::new(41.0001, -105.0),
        GeoPoint::new(40.9999, -105.0),
        GeoPoint::new(41.0, -104.05),
        GeoPoint::new(37.0, CO_KS_BORDER_LNG),
        GeoPoint::new(40.0, CO_KS_BORDER_LNG),
        GeoPoint::new(45.0, -111.05),
    ]
}

/// A state with a hole, optionally with the enclave itself modeled
pub fn enclave_store(with_enclave: bool) -> BoundaryStore {
    let outer = Rect::new(coord! { x: 10.0, y: -10.0 }, coord! { x: 20.0, y: 0.0 }).to_polygon();
    let hole = Rect::new(coord! { x: 14.0, y: -6.0 }, coord! { x: 16.0, y: -4.0 }).to_polygon();
    let with_hole = Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);

    let mut boundaries = vec![StateBoundary::new(
        "MD",
        "Maryland",
        MultiPolygon::new(vec![with_hole]),
    )];
    if with_enclave {
        boundaries.push(StateBoundary::new(
            "DC",
            "District of Columbia",
            MultiPolygon::new(vec![hole]),
        ));
    }
    BoundaryStore::from_boundaries(boundaries)
}
