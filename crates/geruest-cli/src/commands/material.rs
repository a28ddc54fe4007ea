//! Material command implementation

use super::prepare_session;
use crate::cli::MaterialArgs;
use crate::config_loader::AppContext;
use crate::output::{area, OutputWriter};
use crate::output_types::{CatalogRow, MaterialOutput};
use crate::progress::with_spinner;
use anyhow::{bail, Result};
use geruest_core::models::CatalogEstimate;
use geruest_core::takeoff::{estimate_material, sanitize};

pub async fn execute(args: MaterialArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let spinner = !output.is_json();

    let (area_m2, system_id, catalog) = match (args.area, args.address.as_deref()) {
        (Some(area_m2), _) => {
            let area_m2 = sanitize(area_m2);
            let system = args.scaffold.system.unwrap_or(ctx.config.scaffold_system.value);
            let catalog = with_spinner(
                spinner,
                "Stückliste laden...",
                "Stückliste geladen",
                ctx.backend.material_catalog(system.id(), area_m2),
            )
            .await;
            (area_m2, system.id(), catalog)
        }
        (None, Some(address)) => {
            let mut session = prepare_session(ctx, output, address, &args.scaffold).await?;
            let takeoffs = ctx.takeoffs();
            let takeoff = takeoffs.compute_into(&mut session).await?;
            let catalog = with_spinner(
                spinner,
                "Stückliste laden...",
                "Stückliste geladen",
                takeoffs.material_catalog(&session),
            )
            .await;
            (takeoff.total_area, session.config().system.id(), catalog)
        }
        (None, None) => bail!("Provide an address or --area"),
    };

    let estimate = estimate_material(area_m2);

    // The parts list is optional; the coarse estimate always stands
    let catalog: Option<CatalogEstimate> = match catalog {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::warn!(system = system_id, error = %e, "Material catalog unavailable");
            output.warning(format!("Stückliste nicht verfügbar: {}", e.user_message()));
            None
        }
    };

    if !output.is_json() {
        output.section("Material");
        output.kv("Ausmass", area(area_m2));
        output.kv("Teile (Richtwert)", estimate.pieces);
        output.kv("Gewicht (Richtwert)", format!("{} kg ({:.2} t)", estimate.weight_kg, estimate.weight_tonnes));

        if let Some(catalog) = &catalog {
            output.section(format!("Stückliste {}", catalog.system_id));
            output.table(CatalogRow::rows(catalog));
            output.kv("Total Teile", catalog.total_pieces());
            output.kv("Total Gewicht", format!("{:.1} kg", catalog.total_weight_kg));
        }
    }

    output.result(MaterialOutput { area_m2, estimate, catalog })
}
