//! NPK 114 (D/2012) take-off calculation
//!
//! The single implementation of the Ausmass formula. The backend computes the
//! same quantity; when it is unreachable the client falls back to this module.
//!
//! Per facade:
//!
//! ```text
//! takeoff_length = max(2.5, LS + length + LS)
//! takeoff_height = max(4.0, scaffold_height + 1.0)
//! area           = takeoff_length * takeoff_height
//! ```
//!
//! Totals add a corner surcharge of `LS * (scaffold_height + 1.0)` per selected facade.
//! All constants are those of the Layher Blitz 70 system in width class W09.

use crate::models::{FacadeSide, FacadeTakeoff, MaterialEstimate, TakeoffResult, TakeoffSource};

/// Gap between facade and scaffold
pub const FACADE_CLEARANCE_M: f64 = 0.30;

/// Scaffold width (Blitz 70)
pub const SCAFFOLD_WIDTH_M: f64 = 0.70;

/// Frontal surcharge LS, added at both ends of every facade
pub const FRONTAL_SURCHARGE_M: f64 = FACADE_CLEARANCE_M + SCAFFOLD_WIDTH_M;

/// Added to the scaffold height
pub const HEIGHT_SURCHARGE_M: f64 = 1.0;

/// Minimum billable length per facade
pub const MIN_TAKEOFF_LENGTH_M: f64 = 2.5;

/// Minimum billable height per facade
pub const MIN_TAKEOFF_HEIGHT_M: f64 = 4.0;

/// SUVA fall-protection margin above the ridge for roof work
pub const ROOF_WORK_MARGIN_M: f64 = 1.0;

/// Facades at or below this length are not selectable
pub const MIN_FACADE_LENGTH_M: f64 = 0.5;

/// Placeholder ratio for the coarse material estimate
pub const PIECES_PER_M2: f64 = 2.5;

/// Placeholder ratio for the coarse material estimate
pub const KG_PER_M2: f64 = 45.0;

/// Clamp missing, negative, or NaN measurements to zero.
///
/// Bad inputs degrade to the minimum floors instead of failing.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Take-off for one facade
pub fn facade_takeoff(facade_index: usize, length_m: f64, scaffold_height: f64) -> FacadeTakeoff {
    let nominal_length = sanitize(length_m);
    let nominal_height = sanitize(scaffold_height);

    let takeoff_length =
        (FRONTAL_SURCHARGE_M + nominal_length + FRONTAL_SURCHARGE_M).max(MIN_TAKEOFF_LENGTH_M);
    let takeoff_height = (nominal_height + HEIGHT_SURCHARGE_M).max(MIN_TAKEOFF_HEIGHT_M);

    FacadeTakeoff {
        facade_index,
        nominal_length,
        nominal_height,
        takeoff_length,
        takeoff_height,
        area: takeoff_length * takeoff_height,
    }
}

/// Take-off for a set of (index, length) pairs
fn compute(facades: impl IntoIterator<Item = (usize, f64)>, scaffold_height: f64) -> TakeoffResult {
    let height = sanitize(scaffold_height);

    let per_facade: Vec<FacadeTakeoff> = facades
        .into_iter()
        .map(|(index, length)| facade_takeoff(index, length, height))
        .collect();

    if per_facade.is_empty() {
        return TakeoffResult::empty(height, TakeoffSource::Local);
    }

    // Each selected facade carries one corner surcharge, regardless of the true corner count.
    let corner_count = per_facade.len() as u32;
    let corner_surcharge =
        f64::from(corner_count) * FRONTAL_SURCHARGE_M * (height + HEIGHT_SURCHARGE_M);
    let facade_area: f64 = per_facade.iter().map(|f| f.area).sum();

    TakeoffResult {
        per_facade,
        corner_count,
        corner_surcharge,
        facade_area,
        total_area: facade_area + corner_surcharge,
        scaffold_height: height,
        source: TakeoffSource::Local,
    }
}

/// Take-off for selected facade sides, in the order given
pub fn compute_takeoff<'a>(
    sides: impl IntoIterator<Item = &'a FacadeSide>,
    scaffold_height: f64,
) -> TakeoffResult {
    compute(sides.into_iter().map(|s| (s.index, s.length_m)), scaffold_height)
}

/// Take-off for bare facade lengths, indexed by position
pub fn compute_for_lengths(lengths: &[f64], scaffold_height: f64) -> TakeoffResult {
    compute(lengths.iter().copied().enumerate(), scaffold_height)
}

/// Like [`compute_for_lengths`], but skips lengths of [`MIN_FACADE_LENGTH_M`] or less,
/// the same rule that makes a building facade unselectable. Indices keep their position.
pub fn compute_for_selectable_lengths(lengths: &[f64], scaffold_height: f64) -> TakeoffResult {
    compute(
        lengths.iter().copied().enumerate().filter(|(_, length)| *length > MIN_FACADE_LENGTH_M),
        scaffold_height,
    )
}

/// Coarse piece count and weight from the billable area.
///
/// Ratios are rough placeholders; the per-article catalog estimate comes from the backend.
pub fn estimate_material(total_area: f64) -> MaterialEstimate {
    let area = sanitize(total_area);
    let pieces = (area * PIECES_PER_M2).round() as u64;
    let weight_kg = (area * KG_PER_M2).round() as u64;

    MaterialEstimate { pieces, weight_kg, weight_tonnes: weight_kg as f64 / 1000.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompassDirection;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn side(index: usize, length_m: f64) -> FacadeSide {
        FacadeSide {
            index,
            start: [0.0, 0.0],
            end: [length_m, 0.0],
            length_m,
            direction: CompassDirection::N,
            angle_deg: 0.0,
        }
    }

    #[test]
    fn test_frontal_surcharge_is_one_metre() {
        assert!(approx(FRONTAL_SURCHARGE_M, 1.0));
    }

    #[test]
    fn test_single_facade_scenario() {
        let result = compute_for_lengths(&[10.0], 8.0);
        let facade = &result.per_facade[0];

        assert!(approx(facade.takeoff_length, 12.0));
        assert!(approx(facade.takeoff_height, 9.0));
        assert!(approx(facade.area, 108.0));
        assert_eq!(result.corner_count, 1);
        assert!(approx(result.corner_surcharge, 9.0));
        assert!(approx(result.facade_area, 108.0));
        assert!(approx(result.total_area, 117.0));
    }

    #[test]
    fn test_height_floor_applies_independently() {
        let facade = facade_takeoff(0, 1.0, 2.0);
        assert!(approx(facade.takeoff_length, 3.0));
        assert!(approx(facade.takeoff_height, 4.0));
        assert!(approx(facade.area, 12.0));
    }

    #[test]
    fn test_length_floor() {
        let facade = facade_takeoff(0, 0.2, 10.0);
        assert!(approx(facade.takeoff_length, 2.5));
        assert!(approx(facade.takeoff_height, 11.0));
    }

    #[test]
    fn test_empty_selection_is_zero() {
        let result = compute_for_lengths(&[], 8.0);
        assert!(result.is_empty());
        assert_eq!(result.total_area, 0.0);
        assert_eq!(result.corner_surcharge, 0.0);
        assert_eq!(result.corner_count, 0);
    }

    #[test]
    fn test_selectable_lengths_skip_short_facades() {
        let result = compute_for_selectable_lengths(&[10.0, 0.5, 0.3, 6.0], 8.0);

        let indices: Vec<usize> = result.per_facade.iter().map(|f| f.facade_index).collect();
        assert_eq!(indices, vec![0, 3]);
        assert_eq!(result.corner_count, 2);
        assert!(approx(result.total_area, 198.0));

        assert!(compute_for_selectable_lengths(&[0.4, f64::NAN], 8.0).is_empty());
    }

    #[test]
    fn test_invalid_inputs_degrade_to_floors() {
        let facade = facade_takeoff(3, f64::NAN, -5.0);
        assert_eq!(facade.nominal_length, 0.0);
        assert_eq!(facade.nominal_height, 0.0);
        assert!(approx(facade.takeoff_length, 2.5));
        assert!(approx(facade.takeoff_height, 4.0));
    }

    #[test]
    fn test_compute_takeoff_keeps_facade_indices() {
        let sides = vec![side(4, 10.0), side(7, 6.0)];
        let result = compute_takeoff(&sides, 5.0);

        let indices: Vec<usize> = result.per_facade.iter().map(|f| f.facade_index).collect();
        assert_eq!(indices, vec![4, 7]);
        // (12 + 8) * 6 + 2 * 1 * 6
        assert!(approx(result.total_area, 132.0));
        assert_eq!(result.source, TakeoffSource::Local);
    }

    #[test]
    fn test_material_estimate_scenario() {
        let estimate = estimate_material(100.0);
        assert_eq!(estimate.pieces, 250);
        assert_eq!(estimate.weight_kg, 4500);
        assert!(approx(estimate.weight_tonnes, 4.5));
    }

    #[test]
    fn test_material_estimate_rounds() {
        let estimate = estimate_material(117.0);
        assert_eq!(estimate.pieces, 293); // 292.5 rounds away from zero
        assert_eq!(estimate.weight_kg, 5265);
    }
}
