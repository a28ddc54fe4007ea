//! Takeoff command implementation

use super::calc::print_totals;
use super::prepare_session;
use crate::cli::TakeoffArgs;
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::{TakeoffOutput, TakeoffRow};
use crate::progress::with_spinner;
use anyhow::Result;
use geruest_core::models::TakeoffSource;
use geruest_core::takeoff::estimate_material;

pub async fn execute(args: TakeoffArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let mut session = prepare_session(ctx, output, &args.address, &args.scaffold).await?;

    let takeoff = with_spinner(
        !output.is_json(),
        "Ausmass berechnen...",
        "Ausmass berechnet",
        ctx.takeoffs().compute_into(&mut session),
    )
    .await?;

    if takeoff.source == TakeoffSource::LocalFallback {
        output.warning("Server-Berechnung fehlgeschlagen, lokal nach NPK 114 berechnet");
    }

    let material = estimate_material(takeoff.total_area);

    if !output.is_json() {
        let config = session.config();
        output.section(format!("Ausmass nach NPK 114: {}", session.address().unwrap_or_default()));
        output.kv("System", format!("{} {}", config.system.display_name(), config.width_class));
        output.kv("Gerüstart", config.scaffold_type.label_de());
        output.table(TakeoffRow::rows(&takeoff));
        print_totals(output, &takeoff);
        output.kv("Material (Richtwert)", format!("{} Teile, {:.2} t", material.pieces, material.weight_tonnes));
    }

    output.result(TakeoffOutput {
        address: session.address().map(str::to_string),
        scaffold_height: session.scaffold_height(),
        takeoff,
        material,
    })
}
