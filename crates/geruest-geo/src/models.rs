use geo::algorithm::area::Area;
use geo::algorithm::centroid::Centroid;
use geo::algorithm::orient::{Direction, Orient};
use geo::{Coord, LineString, Polygon};
use geojson::{Feature, JsonObject, JsonValue};
use geruest_core::error::{GeruestError, Result};

/// Closed building footprint in planar coordinates (LV95 east/north, metres).
///
/// The exterior ring is always counter-clockwise. Holes are not modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    polygon: Polygon<f64>,
}

impl Footprint {
    /// Build a footprint from raw vertices.
    ///
    /// A repeated closing vertex is accepted and dropped. Consecutive duplicates are removed.
    pub fn from_vertices(vertices: &[[f64; 2]]) -> Result<Self> {
        if let Some(bad) = vertices.iter().position(|v| !v[0].is_finite() || !v[1].is_finite()) {
            return Err(GeruestError::InvalidGeometry {
                reason: format!("vertex {} has non-finite coordinates", bad),
            });
        }

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
        for v in vertices {
            let c = Coord { x: v[0], y: v[1] };
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }

        if coords.len() < 3 {
            return Err(GeruestError::InvalidGeometry {
                reason: format!("a footprint needs at least 3 distinct vertices, found {}", coords.len()),
            });
        }

        let polygon = Polygon::new(LineString::new(coords), vec![]);
        if polygon.unsigned_area() == 0.0 {
            return Err(GeruestError::InvalidGeometry {
                reason: "footprint has zero area".to_string(),
            });
        }

        Ok(Self { polygon: polygon.orient(Direction::Default) })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Ring vertices in counter-clockwise order, without the closing vertex
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        let ring = &self.polygon.exterior().0;
        let open = ring.len().saturating_sub(1);
        ring[..open].iter().map(|c| [c.x, c.y]).collect()
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn centroid(&self) -> Option<[f64; 2]> {
        self.polygon.centroid().map(|p| [p.x(), p.y()])
    }

    /// GeoJSON feature with the given properties, coordinates left in LV95
    pub fn to_geojson_feature(&self, properties: JsonObject) -> Feature {
        let mut ring: Vec<Vec<f64>> = self.vertices().into_iter().map(|v| v.to_vec()).collect();
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }

        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Convenience for building GeoJSON property maps
pub fn property(properties: &mut JsonObject, key: &str, value: impl Into<JsonValue>) {
    properties.insert(key.to_string(), value.into());
}
