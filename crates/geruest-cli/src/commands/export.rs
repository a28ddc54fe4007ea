//! Export command: drawings, take-off report and footprint in one directory

use super::drawing::{request_template, write_svg};
use super::prepare_session;
use crate::cli::{DrawingOptions, ExportArgs};
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::{DrawingFailure, ExportOutput, ExportReport};
use crate::progress::with_spinner;
use anyhow::{Context, Result};
use chrono::Utc;
use geojson::{FeatureCollection, JsonObject};
use geruest_core::models::{DrawingKind, DrawingRequest, DrawingSubject};
use geruest_core::selection::SelectionState;
use geruest_core::session::PlanningSession;
use geruest_geo::models::property;
use geruest_geo::{default_outline, Footprint};
use std::fs;
use std::path::Path;

pub async fn execute(args: ExportArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let mut session = prepare_session(ctx, output, &args.address, &args.scaffold).await?;
    let report = write_export(ctx, output, &mut session, &args.out_dir, &args.options).await?;

    if !output.is_json() {
        output.section(format!("Export nach {}", report.out_dir));
        for file in &report.files {
            output.success(file);
        }
    }

    output.result(report)
}

/// Write drawings, `report.json` and `footprint.geojson` for a planning session
pub(crate) async fn write_export(
    ctx: &AppContext,
    output: &OutputWriter,
    session: &mut PlanningSession,
    out_dir: &Path,
    options: &DrawingOptions,
) -> Result<ExportOutput> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory {}", out_dir.display()))?;

    let address = session.address().unwrap_or_default().to_string();
    let spinner = !output.is_json();
    let takeoffs = ctx.takeoffs();

    let takeoff = match session.takeoff().cloned() {
        Some(takeoff) => takeoff,
        None => {
            with_spinner(spinner, "Ausmass berechnen...", "Ausmass berechnet", takeoffs.compute_into(session))
                .await?
        }
    };

    let catalog = match takeoffs.material_catalog(session).await {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            output.warning(format!("Stückliste nicht verfügbar: {}", e.user_message()));
            None
        }
    };

    let mut files = Vec::new();
    let mut failed = Vec::new();

    // Drawings
    let template = request_template(drawing_request(session, &address), options, session.config().manual_heights);
    let drawings = with_spinner(
        spinner,
        "Zeichnungen erzeugen...",
        "Zeichnungen erzeugt",
        async { Ok::<_, anyhow::Error>(ctx.drawings().all_kinds(&template, false).await) },
    )
    .await?;
    for (kind, result) in drawings {
        match result {
            Ok(svg) => files.push(write_svg(out_dir, kind, &svg)?.display().to_string()),
            Err(e) => {
                output.warning(format!("{}: {}", kind, e.user_message()));
                failed.push(DrawingFailure { kind: kind.to_string(), message: e.user_message() });
            }
        }
    }

    // Report
    let report = ExportReport {
        generated_at: Utc::now(),
        session_id: session.id(),
        address: address.clone(),
        config: session.config().clone(),
        scaffold_height: session.scaffold_height(),
        selected_facades: session.selection().indices(),
        material: geruest_core::takeoff::estimate_material(takeoff.total_area),
        takeoff,
        catalog,
    };
    let report_path = out_dir.join("report.json");
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    files.push(report_path.display().to_string());

    // Footprint
    if let Some(collection) = footprint_features(session, &address)? {
        let path = out_dir.join("footprint.geojson");
        fs::write(&path, serde_json::to_string_pretty(&collection)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        files.push(path.display().to_string());
    }

    tracing::info!(session = %session.id(), files = files.len(), "Export written");
    Ok(ExportOutput { out_dir: out_dir.display().to_string(), files, failed })
}

/// An edited selection is sent as explicit geometry; otherwise the backend resolves the address
fn drawing_request(session: &PlanningSession, address: &str) -> DrawingRequest {
    let mut request = DrawingRequest::for_address(DrawingKind::CrossSection, address);

    if let (SelectionState::Modified, Some(geometry)) = (session.selection_state(), session.geometry()) {
        request.subject = DrawingSubject::Geometry {
            label: address.to_string(),
            sides: session.selected_sides().into_iter().cloned().collect(),
            polygon: geometry.polygon.clone(),
        };
    }
    request
}

/// Building footprint and scaffold outline as GeoJSON, in LV95 coordinates
fn footprint_features(session: &PlanningSession, address: &str) -> Result<Option<FeatureCollection>> {
    let Some(geometry) = session.geometry().filter(|g| !g.polygon.is_empty()) else {
        return Ok(None);
    };

    let footprint = Footprint::from_vertices(&geometry.polygon)?;
    let outline = Footprint::from_vertices(&default_outline(&footprint))?;

    let mut building = JsonObject::new();
    property(&mut building, "kind", "building");
    property(&mut building, "address", address);
    property(&mut building, "area_m2", footprint.area());
    if let Some(egid) = geometry.egid {
        property(&mut building, "egid", egid);
    }

    let mut scaffold = JsonObject::new();
    property(&mut scaffold, "kind", "scaffold_outline");
    property(&mut scaffold, "offset_m", geruest_core::takeoff::FRONTAL_SURCHARGE_M);

    Ok(Some(FeatureCollection {
        bbox: None,
        features: vec![footprint.to_geojson_feature(building), outline.to_geojson_feature(scaffold)],
        foreign_members: None,
    }))
}
