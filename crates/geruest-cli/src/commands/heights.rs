//! Heights command implementation

use crate::cli::HeightsArgs;
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::HeightsOutput;
use crate::progress::with_spinner;
use anyhow::Result;
use geruest_core::models::HeightFetchRequest;

pub async fn execute(args: HeightsArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let spinner = !output.is_json();
    let addresses = ctx.addresses();

    let lookup =
        with_spinner(spinner, "Adresse suchen...", "Adresse gefunden", addresses.lookup(&args.address))
            .await?;
    let egid = args.egid.or_else(|| lookup.primary_building().map(|b| b.egid));

    let request = HeightFetchRequest {
        lv95_e: lookup.coordinates.lv95_e,
        lv95_n: lookup.coordinates.lv95_n,
        egid,
    };

    let response = with_spinner(
        spinner,
        "Höhen importieren...",
        "Höhen importiert",
        addresses.fetch_heights(&request),
    )
    .await?;

    if !output.is_json() {
        output.success(format!("{} ({})", response.message, response.status.as_str()));
        if let Some(egid) = egid {
            output.kv("EGID", egid);
        }
        if let Some(debug) = &response.debug {
            output.kv("Kacheln geprüft", debug.tiles_checked);
            output.kv("Gebäude in Kachel", debug.buildings_in_tile);
            output.kv("Messpunkte", debug.points_sampled);
        }
    }

    output.result(HeightsOutput { address: lookup.label, egid, response })
}
