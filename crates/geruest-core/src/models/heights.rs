use serde::{Deserialize, Serialize};

/// Outcome of an on-demand height import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightImportStatus {
    AlreadyExists,
    Success,
    NoTileFound,
    NoHeightsFound,
}

impl HeightImportStatus {
    /// Statuses that leave the building without height data
    pub fn is_failure(&self) -> bool {
        matches!(self, HeightImportStatus::NoTileFound | HeightImportStatus::NoHeightsFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeightImportStatus::AlreadyExists => "already_exists",
            HeightImportStatus::Success => "success",
            HeightImportStatus::NoTileFound => "no_tile_found",
            HeightImportStatus::NoHeightsFound => "no_heights_found",
        }
    }
}

/// Request body for the height import endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightFetchRequest {
    pub lv95_e: f64,
    pub lv95_n: f64,
    pub egid: Option<u64>,
}

/// Auxiliary counters the backend reports for diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HeightDebug {
    #[serde(default)]
    pub tiles_checked: u32,
    #[serde(default)]
    pub buildings_in_tile: u32,
    #[serde(default)]
    pub points_sampled: u32,
}

/// Response of the height import endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightFetchResponse {
    pub status: HeightImportStatus,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub debug: Option<HeightDebug>,
}
