use chrono::{DateTime, Utc};
use geruest_client::CacheStats;
use geruest_core::models::{
    AddressLookup, CatalogEstimate, FacadeSide, HeightFetchResponse, MaterialEstimate,
    ScaffoldingConfig, TakeoffResult,
};
use geruest_core::selection::SelectionState;
use geruest_geo::FootprintMetrics;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{area, metres};

/// Output for lookup command
#[derive(Debug, Serialize)]
pub struct LookupOutput {
    #[serde(flatten)]
    pub lookup: AddressLookup,
}

/// Output for facades command
#[derive(Debug, Serialize)]
pub struct FacadesOutput {
    pub address: String,
    pub derived_locally: bool,
    pub selection_state: SelectionState,
    pub selected: Vec<usize>,
    pub facades: Vec<FacadeSide>,
    pub footprint: Option<FootprintMetrics>,
}

/// Output for takeoff and calc commands
#[derive(Debug, Serialize)]
pub struct TakeoffOutput {
    pub address: Option<String>,
    pub scaffold_height: f64,
    pub takeoff: TakeoffResult,
    pub material: MaterialEstimate,
}

/// Output for material command
#[derive(Debug, Serialize)]
pub struct MaterialOutput {
    pub area_m2: f64,
    pub estimate: MaterialEstimate,
    pub catalog: Option<CatalogEstimate>,
}

/// One written or printed drawing
#[derive(Debug, Serialize)]
pub struct DrawingFile {
    pub kind: String,
    pub path: Option<String>,
    pub bytes: usize,
}

/// Output for drawing command
#[derive(Debug, Serialize)]
pub struct DrawingOutput {
    pub address: String,
    pub drawings: Vec<DrawingFile>,
    pub failed: Vec<DrawingFailure>,
    pub cache: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct DrawingFailure {
    pub kind: String,
    pub message: String,
}

/// Output for heights command
#[derive(Debug, Serialize)]
pub struct HeightsOutput {
    pub address: String,
    pub egid: Option<u64>,
    #[serde(flatten)]
    pub response: HeightFetchResponse,
}

/// Report written by the export command and the wizard
#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub generated_at: DateTime<Utc>,
    pub session_id: Uuid,
    pub address: String,
    pub config: ScaffoldingConfig,
    pub scaffold_height: f64,
    pub selected_facades: Vec<usize>,
    pub takeoff: TakeoffResult,
    pub material: MaterialEstimate,
    pub catalog: Option<CatalogEstimate>,
}

/// Output for export command
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub out_dir: String,
    pub files: Vec<String>,
    pub failed: Vec<DrawingFailure>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// Table row for a facade
#[derive(Tabled)]
pub struct FacadeRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Richtung")]
    pub direction: String,
    #[tabled(rename = "Länge")]
    pub length: String,
    #[tabled(rename = "Gewählt")]
    pub selected: String,
}

impl FacadeRow {
    pub fn new(side: &FacadeSide, selected: bool) -> Self {
        let marker = if !side.is_selectable() {
            "–"
        } else if selected {
            "✓"
        } else {
            ""
        };
        Self {
            index: side.index,
            direction: format!("{} ({})", side.direction.label_de(), side.direction),
            length: metres(side.length_m),
            selected: marker.to_string(),
        }
    }
}

/// Table row for one facade of a take-off
#[derive(Tabled)]
pub struct TakeoffRow {
    #[tabled(rename = "Fassade")]
    pub facade: usize,
    #[tabled(rename = "Länge")]
    pub length: String,
    #[tabled(rename = "Ausmass-Länge")]
    pub takeoff_length: String,
    #[tabled(rename = "Ausmass-Höhe")]
    pub takeoff_height: String,
    #[tabled(rename = "Fläche")]
    pub area: String,
}

impl TakeoffRow {
    pub fn rows(result: &TakeoffResult) -> Vec<Self> {
        result
            .per_facade
            .iter()
            .map(|f| Self {
                facade: f.facade_index,
                length: metres(f.nominal_length),
                takeoff_length: metres(f.takeoff_length),
                takeoff_height: metres(f.takeoff_height),
                area: area(f.area),
            })
            .collect()
    }
}

/// Table row for a catalog article
#[derive(Tabled)]
pub struct CatalogRow {
    #[tabled(rename = "Kategorie")]
    pub category: String,
    #[tabled(rename = "Artikel")]
    pub article_number: String,
    #[tabled(rename = "Bezeichnung")]
    pub name: String,
    #[tabled(rename = "Stück")]
    pub quantity: u32,
    #[tabled(rename = "Gewicht")]
    pub weight: String,
}

impl CatalogRow {
    pub fn rows(catalog: &CatalogEstimate) -> Vec<Self> {
        catalog
            .categories
            .iter()
            .flat_map(|category| {
                category.items.iter().map(move |item| Self {
                    category: category.name.clone(),
                    article_number: item.article_number.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    weight: format!("{:.1} kg", item.total_weight_kg()),
                })
            })
            .collect()
    }
}

#[derive(Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
