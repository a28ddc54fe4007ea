//! Offline take-off calculation

use crate::cli::CalcArgs;
use crate::output::{area, metres, OutputWriter};
use crate::output_types::{TakeoffOutput, TakeoffRow};
use anyhow::{bail, Result};
use geruest_core::takeoff::{compute_for_selectable_lengths, estimate_material, MIN_FACADE_LENGTH_M};
use geruest_core::GeruestError;

pub fn execute(args: &CalcArgs, output: &OutputWriter) -> Result<()> {
    if args.lengths.is_empty() {
        bail!("At least one --length is required");
    }

    // Short facades are skipped exactly as in a building's facade selection
    for (index, length) in args.lengths.iter().enumerate() {
        if length.is_nan() || *length <= MIN_FACADE_LENGTH_M {
            output.warning(format!(
                "Fassade #{} ({} m) übersprungen: nicht länger als {} m",
                index, length, MIN_FACADE_LENGTH_M
            ));
        }
    }

    let takeoff = compute_for_selectable_lengths(&args.lengths, args.height);
    if takeoff.is_empty() {
        return Err(GeruestError::NoFacadesSelected.into());
    }
    let material = estimate_material(takeoff.total_area);

    if !output.is_json() {
        output.section("Ausmass nach NPK 114 (lokal)");
        output.table(TakeoffRow::rows(&takeoff));
        print_totals(output, &takeoff);
        output.kv("Material (Richtwert)", format!("{} Teile, {:.2} t", material.pieces, material.weight_tonnes));
    }

    output.result(TakeoffOutput {
        address: None,
        scaffold_height: takeoff.scaffold_height,
        takeoff,
        material,
    })
}

/// Shared summary lines for take-off results
pub(crate) fn print_totals(output: &OutputWriter, takeoff: &geruest_core::models::TakeoffResult) {
    output.kv("Gerüsthöhe", metres(takeoff.scaffold_height));
    output.kv("Fassadenfläche", area(takeoff.facade_area));
    output.kv(
        "Eckzuschlag",
        format!("{} ({} Ecken)", area(takeoff.corner_surcharge), takeoff.corner_count),
    );
    output.kv("Total Ausmass", area(takeoff.total_area));
}
