//! Facade derivation from a footprint ring

use crate::models::Footprint;
use geruest_core::models::{CompassDirection, FacadeSide};

/// One facade per ring edge, in counter-clockwise order starting at the first vertex.
///
/// The facing direction is the outward normal: for a counter-clockwise ring the
/// exterior lies to the right of each edge.
pub fn derive_facades(footprint: &Footprint) -> Vec<FacadeSide> {
    let vertices = footprint.vertices();
    let n = vertices.len();

    let sides: Vec<FacadeSide> = (0..n)
        .map(|index| {
            let start = vertices[index];
            let end = vertices[(index + 1) % n];
            let dx = end[0] - start[0];
            let dy = end[1] - start[1];

            // Outward normal (dy, -dx); bearing is clockwise from north
            let bearing = dy.atan2(-dx).to_degrees();

            FacadeSide {
                index,
                start,
                end,
                length_m: dx.hypot(dy),
                direction: CompassDirection::from_bearing(bearing),
                angle_deg: dy.atan2(dx).to_degrees(),
            }
        })
        .collect();

    tracing::debug!(facades = sides.len(), "Derived facades from footprint");
    sides
}
