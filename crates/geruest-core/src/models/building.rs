use serde::{Deserialize, Serialize};

use super::facade::FacadeSide;

/// Geocoded position of an address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// WGS 84 latitude
    pub lat: f64,

    /// WGS 84 longitude
    pub lon: f64,

    /// LV95 easting (EPSG:2056)
    pub lv95_e: f64,

    /// LV95 northing (EPSG:2056)
    pub lv95_n: f64,
}

/// Building record from the federal building registry (GWR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Federal building identifier
    pub egid: u64,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub construction_year: Option<u16>,

    #[serde(default)]
    pub floors: Option<u8>,

    #[serde(default)]
    pub footprint_area_m2: Option<f64>,
}

/// Result of an address lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressLookup {
    /// The address string as entered
    pub query: String,

    /// Normalized address label returned by the geocoder
    pub label: String,

    pub coordinates: Coordinates,

    #[serde(default)]
    pub buildings: Vec<BuildingRecord>,
}

impl AddressLookup {
    /// First registry record, which the geocoder ranks as the best match
    pub fn primary_building(&self) -> Option<&BuildingRecord> {
        self.buildings.first()
    }
}

/// Where a height value originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightSource {
    /// swissBUILDINGS3D height model
    Measured,
    /// Estimated from the registry floor count
    Estimated,
    /// Entered by the user
    Manual,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Roof shape as understood by the take-off endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoofShape {
    #[serde(rename = "flachdach")]
    Flat,
    #[default]
    #[serde(rename = "satteldach")]
    Gable,
    #[serde(rename = "walmdach")]
    Hip,
    #[serde(rename = "pultdach")]
    Mono,
}

impl RoofShape {
    /// Query parameter value
    pub fn as_param(&self) -> &'static str {
        match self {
            RoofShape::Flat => "flachdach",
            RoofShape::Gable => "satteldach",
            RoofShape::Hip => "walmdach",
            RoofShape::Mono => "pultdach",
        }
    }
}

/// Heights known for a building, any of which may be missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BuildingHeights {
    /// Traufhöhe
    #[serde(default)]
    pub eave_height_m: Option<f64>,

    /// Firsthöhe
    #[serde(default)]
    pub ridge_height_m: Option<f64>,

    /// Floor-count based estimate used when nothing was measured
    #[serde(default)]
    pub estimated_height_m: Option<f64>,

    #[serde(default)]
    pub source: HeightSource,
}

impl BuildingHeights {
    /// Apply user overrides; overridden values are reported as manual
    pub fn with_overrides(mut self, overrides: Option<&ManualHeights>) -> Self {
        let Some(manual) = overrides else {
            return self;
        };

        if manual.eave_height_m.is_some() {
            self.eave_height_m = manual.eave_height_m;
        }
        if manual.ridge_height_m.is_some() {
            self.ridge_height_m = manual.ridge_height_m;
        }
        if !manual.is_empty() {
            self.source = HeightSource::Manual;
        }
        self
    }
}

/// User-supplied eave/ridge heights that replace measured values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ManualHeights {
    pub eave_height_m: Option<f64>,
    pub ridge_height_m: Option<f64>,
}

impl ManualHeights {
    pub fn new(eave_height_m: Option<f64>, ridge_height_m: Option<f64>) -> Self {
        Self { eave_height_m, ridge_height_m }
    }

    pub fn is_empty(&self) -> bool {
        self.eave_height_m.is_none() && self.ridge_height_m.is_none()
    }

    /// Millimetre integers, usable as a hashable cache key component
    pub fn as_millimetres(&self) -> (Option<i64>, Option<i64>) {
        let mm = |v: f64| (v * 1000.0).round() as i64;
        (self.eave_height_m.map(mm), self.ridge_height_m.map(mm))
    }
}

/// Scaffolding geometry for one building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldingGeometry {
    pub address: String,

    #[serde(default)]
    pub egid: Option<u64>,

    /// Footprint ring in LV95 metres (closing vertex optional)
    #[serde(default)]
    pub polygon: Vec<[f64; 2]>,

    #[serde(default)]
    pub sides: Vec<FacadeSide>,

    #[serde(default)]
    pub heights: BuildingHeights,

    #[serde(default)]
    pub roof_shape: RoofShape,

    #[serde(default)]
    pub floors: Option<u8>,
}
