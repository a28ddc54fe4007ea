//! Drawing command implementation

use crate::cli::{DrawingArgs, DrawingOptions};
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::output_types::{DrawingFailure, DrawingFile, DrawingOutput};
use crate::progress::create_spinner;
use anyhow::{Context, Result};
use geruest_core::models::{DrawingKind, DrawingRequest, ManualHeights};
use std::path::{Path, PathBuf};

pub async fn execute(args: DrawingArgs, ctx: &AppContext, output: &OutputWriter) -> Result<()> {
    let address = args.address.trim().to_string();
    let template = request_template(
        DrawingRequest::for_address(args.kind.unwrap_or(DrawingKind::CrossSection), &address),
        &args.options,
        args.heights.manual(),
    );
    let drawings = ctx.drawings();

    let pb = (!output.is_json()).then(|| create_spinner("Zeichnungen erzeugen..."));
    let results = match args.kind {
        Some(kind) => vec![(kind, drawings.drawing(&template, args.refresh).await)],
        None => drawings.all_kinds(&template, args.refresh).await,
    };
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    // A single drawing without a target directory goes to stdout
    let to_stdout = args.kind.is_some() && args.output.is_none() && !output.is_json();
    let out_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut files = Vec::new();
    let mut failed = Vec::new();
    let mut first_error = None;

    for (kind, result) in results {
        match result {
            Ok(svg) if to_stdout => {
                println!("{}", svg);
                files.push(DrawingFile { kind: kind.to_string(), path: None, bytes: svg.len() });
            }
            Ok(svg) => {
                let path = write_svg(&out_dir, kind, &svg)?;
                output.success(format!("{} → {}", kind, path.display()));
                files.push(DrawingFile {
                    kind: kind.to_string(),
                    path: Some(path.display().to_string()),
                    bytes: svg.len(),
                });
            }
            Err(e) => {
                output.warning(format!("{}: {}", kind, e.user_message()));
                failed.push(DrawingFailure { kind: kind.to_string(), message: e.user_message() });
                first_error.get_or_insert(e);
            }
        }
    }

    if files.is_empty() {
        if let Some(e) = first_error {
            return Err(e.into());
        }
    }

    output.result(DrawingOutput { address, drawings: files, failed, cache: ctx.cache.stats() })
}

/// Apply size and layout flags to a drawing request
pub(crate) fn request_template(
    request: DrawingRequest,
    options: &DrawingOptions,
    manual: Option<ManualHeights>,
) -> DrawingRequest {
    request
        .with_size(options.width, options.height)
        .with_manual_heights(manual.unwrap_or_default())
        .with_professional(options.professional)
        .with_high_fidelity(options.high_fidelity)
}

/// Write `<dir>/<kind>.svg`
pub(crate) fn write_svg(dir: &Path, kind: DrawingKind, svg: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}.svg", kind.path_segment()));
    std::fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
