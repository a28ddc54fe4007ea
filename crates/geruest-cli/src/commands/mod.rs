//! Command implementations

mod calc;
mod config;
mod drawing;
mod export;
mod facades;
mod heights;
mod lookup;
mod material;
mod plan;
mod takeoff;

use crate::cli::{Cli, Commands, ScaffoldArgs};
use crate::config_loader::AppContext;
use crate::output::OutputWriter;
use crate::progress::with_spinner;
use anyhow::Result;
use geruest_core::config::LayeredConfig;
use geruest_core::session::PlanningSession;

pub(crate) use export::write_export;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    // Offline calculation needs neither config nor backend
    if let Commands::Calc(args) = &cli.command {
        return calc::execute(args, &output);
    }

    let ctx = AppContext::from_cli(&cli)?;
    match cli.command {
        Commands::Lookup(args) => lookup::execute(args, &ctx, &output).await,
        Commands::Facades(args) => facades::execute(args, &ctx, &output).await,
        Commands::Takeoff(args) => takeoff::execute(args, &ctx, &output).await,
        Commands::Calc(args) => calc::execute(&args, &output),
        Commands::Material(args) => material::execute(args, &ctx, &output).await,
        Commands::Drawing(args) => drawing::execute(args, &ctx, &output).await,
        Commands::Heights(args) => heights::execute(args, &ctx, &output).await,
        Commands::Plan(args) => plan::execute(args, &ctx, &output).await,
        Commands::Export(args) => export::execute(args, &ctx, &output).await,
        Commands::Config(args) => config::execute(&args, &ctx, &output),
    }
}

/// Empty session seeded with the configured system and width class
pub(crate) fn new_session(config: &LayeredConfig) -> PlanningSession {
    PlanningSession::new(config.scaffold_system.value, config.width_class.value)
}

/// Look up an address, load its geometry, and apply scaffold options to a new session
pub(crate) async fn prepare_session(
    ctx: &AppContext,
    output: &OutputWriter,
    address: &str,
    scaffold: &ScaffoldArgs,
) -> Result<PlanningSession> {
    let spinner = !output.is_json();
    let addresses = ctx.addresses();
    let manual = scaffold.heights.manual();

    let lookup = with_spinner(spinner, "Adresse suchen...", "Adresse gefunden", addresses.lookup(address))
        .await?;
    let label = lookup.label.clone();

    let mut session = new_session(&ctx.config);
    session.start(lookup);

    let geometry = with_spinner(
        spinner,
        "Gebäudedaten laden...",
        "Gebäudedaten geladen",
        addresses.geometry(&label, manual.as_ref(), false),
    )
    .await?;
    session.load_geometry(geometry);

    if let Some(work_type) = scaffold.work_type {
        session.set_work_type(work_type);
    }
    if let Some(scaffold_type) = scaffold.scaffold_type {
        session.set_scaffold_type(scaffold_type);
    }
    if let Some(width_class) = scaffold.width_class {
        session.set_width_class(width_class);
    }
    if let Some(system) = scaffold.system {
        session.set_system(system);
    }
    if let Some(manual) = manual {
        session.set_manual_heights(manual);
    }
    if !scaffold.facades.is_empty() {
        session.select_facades(scaffold.facades.iter().copied())?;
    }

    Ok(session)
}
