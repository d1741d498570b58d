//! Conversion of GeoJSON polygon coordinates into `geo` geometry.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Position, Value};

/// Build a MultiPolygon from a Polygon or MultiPolygon GeoJSON value.
///
/// Returns `Ok(None)` for any other geometry type so the caller can report
/// it with feature context.
pub fn multipolygon_from_value(value: &Value) -> Result<Option<MultiPolygon<f64>>, String> {
    match value {
        Value::Polygon(rings) => Ok(Some(MultiPolygon::new(vec![polygon_from_rings(rings)?]))),
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(MultiPolygon::new(polygons)))
        }
        _ => Ok(None),
    }
}

/// Name of a GeoJSON geometry type, for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// First ring is the exterior, the rest are holes
pub fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>, String> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| "polygon has no rings".to_string())?;

    let exterior = closed_ring(exterior)?;
    let holes = holes
        .iter()
        .map(|ring| closed_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, holes))
}

/// Convert positions to a closed ring, closing it if needed
pub fn closed_ring(positions: &[Position]) -> Result<LineString<f64>, String> {
    let mut ring: Vec<Coord<f64>> = positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(format!("invalid position {:?}", pos)),
        })
        .collect::<Result<_, _>>()?;

    if ring.len() < 3 {
        return Err(format!("ring has {} positions, need at least 3", ring.len()));
    }

    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    if ring.len() < 4 {
        return Err("ring does not enclose an area".to_string());
    }

    Ok(LineString::new(ring))
}
