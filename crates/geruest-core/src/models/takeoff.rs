use serde::{Deserialize, Serialize};

/// Where a take-off result was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeoffSource {
    /// Returned by the backend take-off endpoint
    Backend,
    /// Computed locally because the backend call failed
    LocalFallback,
    /// Computed locally on request (offline calculation)
    Local,
}

/// NPK 114 take-off for a single facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeTakeoff {
    pub facade_index: usize,

    /// Facade length as measured
    pub nominal_length: f64,

    /// Scaffold height before surcharges
    pub nominal_height: f64,

    /// Billable length including frontal surcharges, floored
    pub takeoff_length: f64,

    /// Billable height including height surcharge, floored
    pub takeoff_height: f64,

    /// takeoff_length x takeoff_height
    pub area: f64,
}

/// NPK 114 Ausmass for a facade selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoffResult {
    pub per_facade: Vec<FacadeTakeoff>,

    pub corner_count: u32,

    pub corner_surcharge: f64,

    /// Sum of per-facade areas, without corner surcharge
    pub facade_area: f64,

    pub total_area: f64,

    pub scaffold_height: f64,

    pub source: TakeoffSource,
}

impl TakeoffResult {
    /// Result for an empty selection
    pub fn empty(scaffold_height: f64, source: TakeoffSource) -> Self {
        Self {
            per_facade: Vec::new(),
            corner_count: 0,
            corner_surcharge: 0.0,
            facade_area: 0.0,
            total_area: 0.0,
            scaffold_height,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.per_facade.is_empty()
    }
}

/// Parameters of the backend take-off endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoffRequest {
    pub address: String,
    pub system: super::ScaffoldSystem,
    pub roof_shape: super::RoofShape,
    pub width_class: super::WidthClass,
    pub work_type: super::WorkType,

    /// Scaffold height in metres
    pub height: f64,

    /// Facade indices to bill; empty means every facade the backend knows
    #[serde(default)]
    pub facades: Vec<usize>,
}
