//! Facades command implementation

use crate::cli::FacadesArgs;
use crate::config_loader::AppContext;
use crate::output::{area, metres, OutputWriter};
use crate::output_types::{FacadeRow, FacadesOutput};
use crate::progress::with_spinner;
use anyhow::Result;
use geruest_core::selection::FacadeSelection;
use geruest_geo::{derive_facades, Footprint, FootprintMetrics};

pub async fn execute(args: FacadesArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let manual = args.heights.manual();
    let geometry = with_spinner(
        !output.is_json(),
        "Gebäudedaten laden...",
        "Gebäudedaten geladen",
        ctx.addresses().geometry(&args.address, manual.as_ref(), args.refresh),
    )
    .await?;

    let footprint = if geometry.polygon.is_empty() {
        None
    } else {
        Some(Footprint::from_vertices(&geometry.polygon)?)
    };

    let sides = match (&footprint, args.derive) {
        (Some(footprint), true) => derive_facades(footprint),
        (None, true) => {
            output.warning("Kein Grundriss vorhanden, verwende Fassaden des Servers");
            geometry.sides.clone()
        }
        (_, false) => geometry.sides.clone(),
    };

    let mut selection = FacadeSelection::new();
    selection.load(sides);
    let metrics = footprint.as_ref().map(FootprintMetrics::of);

    if !output.is_json() {
        output.section(format!("Fassaden: {}", geometry.address));
        output.table(
            selection
                .sides()
                .iter()
                .map(|side| FacadeRow::new(side, selection.is_selected(side.index)))
                .collect(),
        );

        let total: f64 = selection.selected_sides().map(|s| s.length_m).sum();
        output.kv("Gewählt", format!("{} von {}", selection.len(), selection.sides().len()));
        output.kv("Abwicklung", metres(total));
        if let Some(metrics) = &metrics {
            output.kv("Grundfläche", area(metrics.area_m2));
            output.kv("Umfang", metres(metrics.perimeter_m));
        }
    }

    output.result(FacadesOutput {
        address: geometry.address.clone(),
        derived_locally: args.derive && footprint.is_some(),
        selection_state: selection.state(),
        selected: selection.indices(),
        facades: selection.sides().to_vec(),
        footprint: metrics,
    })
}
