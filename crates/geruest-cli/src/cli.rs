use clap::{Args, Parser, Subcommand};
use geruest_core::models::{
    DrawingKind, ManualHeights, ScaffoldSystem, ScaffoldType, WidthClass, WorkType,
};
use std::path::PathBuf;

/// Gerüstplaner - Scaffolding planning for Swiss buildings
#[derive(Parser, Debug)]
#[command(name = "geruest")]
#[command(about = "Plan facade scaffolding: address lookup, NPK 114 take-off, materials, drawings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geruest.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and GERUEST_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up an address and list the buildings there
    Lookup(LookupArgs),

    /// Show the facades of a building
    Facades(FacadesArgs),

    /// NPK 114 take-off from the backend, with local fallback
    Takeoff(TakeoffArgs),

    /// Offline take-off from facade lengths
    Calc(CalcArgs),

    /// Material estimate and parts list
    Material(MaterialArgs),

    /// Generate drawings (cross-section, elevation, floor plan)
    Drawing(DrawingArgs),

    /// Import building heights from the height model
    Heights(HeightsArgs),

    /// Interactive planning wizard
    Plan(PlanArgs),

    /// Write drawings and a take-off report to a directory
    Export(ExportArgs),

    /// Show effective configuration and where each value comes from
    Config(ConfigArgs),
}

/// Manual eave/ridge overrides
#[derive(Args, Debug, Clone, Default)]
pub struct HeightArgs {
    /// Eave height in metres (Traufhöhe), replaces the measured value
    #[arg(long, value_name = "M")]
    pub eave: Option<f64>,

    /// Ridge height in metres (Firsthöhe), replaces the measured value
    #[arg(long, value_name = "M")]
    pub ridge: Option<f64>,
}

impl HeightArgs {
    pub fn manual(&self) -> Option<ManualHeights> {
        let manual = ManualHeights::new(self.eave, self.ridge);
        (!manual.is_empty()).then_some(manual)
    }
}

/// Scaffold configuration shared by the planning commands
#[derive(Args, Debug, Clone, Default)]
pub struct ScaffoldArgs {
    /// Work type: facade or roof
    #[arg(long, value_name = "TYPE")]
    pub work_type: Option<WorkType>,

    /// Scaffold type: working, protective, or catch
    #[arg(long, value_name = "TYPE")]
    pub scaffold_type: Option<ScaffoldType>,

    /// Width class: W06, W09, or W12
    #[arg(long, value_name = "CLASS")]
    pub width_class: Option<WidthClass>,

    /// Scaffold system: blitz70 or allround
    #[arg(long, value_name = "SYSTEM")]
    pub system: Option<ScaffoldSystem>,

    /// Facade indices to include (comma-separated); defaults to all selectable facades
    #[arg(long, value_delimiter = ',', value_name = "INDICES")]
    pub facades: Vec<usize>,

    #[command(flatten)]
    pub heights: HeightArgs,
}

#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Address, e.g. "Bundesplatz 3, Bern"
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct FacadesArgs {
    /// Address of the building
    pub address: String,

    /// Derive facades locally from the footprint instead of using the backend's list
    #[arg(long)]
    pub derive: bool,

    /// Bypass the backend's geometry cache
    #[arg(long)]
    pub refresh: bool,

    #[command(flatten)]
    pub heights: HeightArgs,
}

#[derive(Parser, Debug)]
pub struct TakeoffArgs {
    /// Address of the building
    pub address: String,

    #[command(flatten)]
    pub scaffold: ScaffoldArgs,
}

#[derive(Parser, Debug)]
pub struct CalcArgs {
    /// Facade length in metres (repeat or comma-separate for several facades).
    /// Lengths of 0.5 m or less are skipped, like unselectable building facades
    #[arg(long = "length", short = 'l', value_delimiter = ',', required = true, value_name = "M")]
    pub lengths: Vec<f64>,

    /// Scaffold height in metres
    #[arg(long, value_name = "M")]
    pub height: f64,
}

#[derive(Parser, Debug)]
pub struct MaterialArgs {
    /// Address of the building (omit when --area is given)
    pub address: Option<String>,

    /// Billable area in m²; skips the take-off
    #[arg(long, value_name = "M2")]
    pub area: Option<f64>,

    #[command(flatten)]
    pub scaffold: ScaffoldArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DrawingOptions {
    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Professional plan layout (title block, dimensions)
    #[arg(long)]
    pub professional: bool,

    /// Slower, higher-fidelity rendering
    #[arg(long)]
    pub high_fidelity: bool,
}

#[derive(Parser, Debug)]
pub struct DrawingArgs {
    /// Address of the building
    pub address: String,

    /// Drawing kind: schnitt, ansicht, or grundriss (all three when omitted)
    #[arg(long, value_name = "KIND")]
    pub kind: Option<DrawingKind>,

    /// Output directory for SVG files; a single kind without --output prints to stdout
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Regenerate even if a cached drawing exists
    #[arg(long)]
    pub refresh: bool,

    #[command(flatten)]
    pub options: DrawingOptions,

    #[command(flatten)]
    pub heights: HeightArgs,
}

#[derive(Parser, Debug)]
pub struct HeightsArgs {
    /// Address of the building
    pub address: String,

    /// Building identifier; defaults to the first building at the address
    #[arg(long)]
    pub egid: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Start with this address instead of prompting for one
    pub address: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Address of the building
    pub address: String,

    /// Target directory (created if missing)
    #[arg(long, short = 'o', default_value = "geruest-export")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub scaffold: ScaffoldArgs,

    #[command(flatten)]
    pub options: DrawingOptions,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {}
