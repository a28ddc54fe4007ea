//! Lookup command implementation

use crate::cli::LookupArgs;
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::LookupOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use tabled::Tabled;

pub async fn execute(args: LookupArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let lookup = with_spinner(
        !output.is_json(),
        "Adresse suchen...",
        "Adresse gefunden",
        ctx.addresses().lookup(&args.address),
    )
    .await?;

    if !output.is_json() {
        output.section(&lookup.label);
        output.kv("WGS 84", format!("{:.6}, {:.6}", lookup.coordinates.lat, lookup.coordinates.lon));
        output.kv("LV95", format!("{:.1} / {:.1}", lookup.coordinates.lv95_e, lookup.coordinates.lv95_n));

        #[derive(Tabled)]
        struct BuildingRow {
            #[tabled(rename = "EGID")]
            egid: u64,
            #[tabled(rename = "Kategorie")]
            category: String,
            #[tabled(rename = "Baujahr")]
            year: String,
            #[tabled(rename = "Geschosse")]
            floors: String,
        }

        let dash = || "–".to_string();
        output.section("Gebäude");
        output.table(
            lookup
                .buildings
                .iter()
                .map(|b| BuildingRow {
                    egid: b.egid,
                    category: b.category.clone().unwrap_or_else(dash),
                    year: b.construction_year.map(|y| y.to_string()).unwrap_or_else(dash),
                    floors: b.floors.map(|f| f.to_string()).unwrap_or_else(dash),
                })
                .collect(),
        );
    }

    output.result(LookupOutput { lookup })
}
