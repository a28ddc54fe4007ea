use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::building::ManualHeights;
use super::facade::FacadeSide;
use crate::error::GeruestError;

/// Drawing types produced by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingKind {
    /// Schnitt
    CrossSection,
    /// Ansicht
    Elevation,
    /// Grundriss
    FloorPlan,
}

impl DrawingKind {
    pub const ALL: [DrawingKind; 3] =
        [DrawingKind::CrossSection, DrawingKind::Elevation, DrawingKind::FloorPlan];

    /// Path segment of the drawing endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            DrawingKind::CrossSection => "schnitt",
            DrawingKind::Elevation => "ansicht",
            DrawingKind::FloorPlan => "grundriss",
        }
    }
}

impl fmt::Display for DrawingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for DrawingKind {
    type Err = GeruestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "schnitt" | "cross-section" | "section" => Ok(DrawingKind::CrossSection),
            "ansicht" | "elevation" => Ok(DrawingKind::Elevation),
            "grundriss" | "floor-plan" | "plan" => Ok(DrawingKind::FloorPlan),
            _ => Err(GeruestError::ConfigInvalid {
                key: "drawing".to_string(),
                reason: format!("Unknown drawing type: {}. Use schnitt, ansicht, or grundriss", s),
            }),
        }
    }
}

/// What the drawing is generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingSubject {
    /// Backend resolves the geometry itself
    Address(String),
    /// Explicit geometry, e.g. after the user edited the facade list
    Geometry {
        label: String,
        sides: Vec<FacadeSide>,
        polygon: Vec<[f64; 2]>,
    },
}

impl DrawingSubject {
    /// Address or label identifying the building
    pub fn label(&self) -> &str {
        match self {
            DrawingSubject::Address(address) => address,
            DrawingSubject::Geometry { label, .. } => label,
        }
    }
}

/// Request for one generated drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRequest {
    pub kind: DrawingKind,
    pub subject: DrawingSubject,
    pub width_px: u32,
    pub height_px: u32,
    pub manual_heights: Option<ManualHeights>,

    /// Professional plan layout (title block, dimensioning)
    pub professional: bool,

    /// Use the slower, higher-fidelity generation backend
    pub high_fidelity: bool,
}

impl DrawingRequest {
    pub fn for_address(kind: DrawingKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            subject: DrawingSubject::Address(address.into()),
            width_px: 800,
            height_px: 600,
            manual_heights: None,
            professional: false,
            high_fidelity: false,
        }
    }

    pub fn with_size(mut self, width_px: u32, height_px: u32) -> Self {
        self.width_px = width_px;
        self.height_px = height_px;
        self
    }

    pub fn with_manual_heights(mut self, manual: ManualHeights) -> Self {
        self.manual_heights = if manual.is_empty() { None } else { Some(manual) };
        self
    }

    pub fn with_professional(mut self, professional: bool) -> Self {
        self.professional = professional;
        self
    }

    pub fn with_high_fidelity(mut self, high_fidelity: bool) -> Self {
        self.high_fidelity = high_fidelity;
        self
    }
}
