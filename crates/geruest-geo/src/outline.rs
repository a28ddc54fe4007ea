//! Footprint metrics and the scaffold preview outline

use crate::facades::derive_facades;
use crate::models::Footprint;
use geruest_core::takeoff::FRONTAL_SURCHARGE_M;
use serde::Serialize;

/// Summary figures for a footprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintMetrics {
    pub area_m2: f64,
    pub perimeter_m: f64,
    pub facade_count: usize,
    pub selectable_facades: usize,
    pub centroid: Option<[f64; 2]>,
}

impl FootprintMetrics {
    pub fn of(footprint: &Footprint) -> Self {
        let sides = derive_facades(footprint);
        Self {
            area_m2: footprint.area(),
            perimeter_m: sides.iter().map(|s| s.length_m).sum(),
            facade_count: sides.len(),
            selectable_facades: sides.iter().filter(|s| s.is_selectable()).count(),
            centroid: footprint.centroid(),
        }
    }
}

/// Scaffold outline for previews: every vertex pushed away from the centroid by `offset_m`.
///
/// This is a radial offset, not a true parallel buffer; it is only used for drawing.
/// Pass [`FRONTAL_SURCHARGE_M`] for the standard outline.
pub fn scaffold_outline(footprint: &Footprint, offset_m: f64) -> Vec<[f64; 2]> {
    let vertices = footprint.vertices();
    let Some([cx, cy]) = footprint.centroid() else {
        return vertices;
    };

    vertices
        .into_iter()
        .map(|[x, y]| {
            let dx = x - cx;
            let dy = y - cy;
            let distance = dx.hypot(dy);
            if distance == 0.0 {
                [x, y]
            } else {
                let scale = (distance + offset_m) / distance;
                [cx + dx * scale, cy + dy * scale]
            }
        })
        .collect()
}

/// Standard preview outline at the frontal surcharge distance
pub fn default_outline(footprint: &Footprint) -> Vec<[f64; 2]> {
    scaffold_outline(footprint, FRONTAL_SURCHARGE_M)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Footprint {
        Footprint::from_vertices(&[[0.0, 0.0], [6.0, 0.0], [6.0, 6.0], [0.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_metrics() {
        let metrics = FootprintMetrics::of(&square());
        assert!((metrics.area_m2 - 36.0).abs() < 1e-9);
        assert!((metrics.perimeter_m - 24.0).abs() < 1e-9);
        assert_eq!(metrics.facade_count, 4);
        assert_eq!(metrics.selectable_facades, 4);
        let [cx, cy] = metrics.centroid.unwrap();
        assert!((cx - 3.0).abs() < 1e-9 && (cy - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_outline_moves_vertices_outward() {
        let outline = default_outline(&square());
        assert_eq!(outline.len(), 4);

        // Corner (0, 0) moves 1 m further out along the diagonal
        let expected = -1.0 / 2.0f64.sqrt();
        assert!((outline[0][0] - expected).abs() < 1e-9);
        assert!((outline[0][1] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let fp = square();
        for (moved, original) in scaffold_outline(&fp, 0.0).iter().zip(fp.vertices()) {
            assert!((moved[0] - original[0]).abs() < 1e-9);
            assert!((moved[1] - original[1]).abs() < 1e-9);
        }
    }
}
