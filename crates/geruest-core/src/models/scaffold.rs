use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::building::{BuildingHeights, ManualHeights, RoofShape};
use super::facade::FacadeSide;
use crate::error::GeruestError;
use crate::takeoff::{self, ROOF_WORK_MARGIN_M};

/// What the scaffold is erected for; decides which building height applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Roof work: scaffold reaches past the ridge for fall protection
    RoofWork,
    /// Facade work: scaffold reaches the eave
    #[default]
    FacadeWork,
}

impl WorkType {
    pub fn as_param(&self) -> &'static str {
        match self {
            WorkType::RoofWork => "dacharbeiten",
            WorkType::FacadeWork => "fassadenarbeiten",
        }
    }
}

impl FromStr for WorkType {
    type Err = GeruestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "roof" | "roof-work" | "roof_work" | "dach" | "dacharbeiten" => Ok(WorkType::RoofWork),
            "facade" | "facade-work" | "facade_work" | "fassade" | "fassadenarbeiten" => {
                Ok(WorkType::FacadeWork)
            }
            _ => Err(GeruestError::ConfigInvalid {
                key: "work_type".to_string(),
                reason: format!("Invalid work type: {}. Use roof or facade", s),
            }),
        }
    }
}

/// Scaffold purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldType {
    /// Arbeitsgerüst
    #[default]
    Working,
    /// Schutzgerüst
    Protective,
    /// Fanggerüst
    Catch,
}

impl ScaffoldType {
    pub fn label_de(&self) -> &'static str {
        match self {
            ScaffoldType::Working => "Arbeitsgerüst",
            ScaffoldType::Protective => "Schutzgerüst",
            ScaffoldType::Catch => "Fanggerüst",
        }
    }
}

impl FromStr for ScaffoldType {
    type Err = GeruestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "working" | "arbeit" | "arbeitsgeruest" => Ok(ScaffoldType::Working),
            "protective" | "schutz" | "schutzgeruest" => Ok(ScaffoldType::Protective),
            "catch" | "fang" | "fanggeruest" => Ok(ScaffoldType::Catch),
            _ => Err(GeruestError::ConfigInvalid {
                key: "scaffold_type".to_string(),
                reason: format!("Invalid scaffold type: {}. Use working, protective, or catch", s),
            }),
        }
    }
}

/// Breitenklasse: planking width category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WidthClass {
    W06,
    #[default]
    W09,
    W12,
}

impl WidthClass {
    /// Usable planking width in metres
    pub fn planking_width_m(&self) -> f64 {
        match self {
            WidthClass::W06 => 0.6,
            WidthClass::W09 => 0.9,
            WidthClass::W12 => 1.2,
        }
    }
}

impl fmt::Display for WidthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WidthClass::W06 => "W06",
            WidthClass::W09 => "W09",
            WidthClass::W12 => "W12",
        };
        f.write_str(s)
    }
}

impl FromStr for WidthClass {
    type Err = GeruestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "W06" | "W6" => Ok(WidthClass::W06),
            "W09" | "W9" => Ok(WidthClass::W09),
            "W12" => Ok(WidthClass::W12),
            _ => Err(GeruestError::ConfigInvalid {
                key: "width_class".to_string(),
                reason: format!("Invalid width class: {}. Use W06, W09, or W12", s),
            }),
        }
    }
}

/// Scaffold system whose catalog the backend prices against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldSystem {
    /// Layher Blitz 70
    #[default]
    Blitz70,
    /// Layher Allround
    Allround,
}

impl ScaffoldSystem {
    pub fn id(&self) -> &'static str {
        match self {
            ScaffoldSystem::Blitz70 => "blitz70",
            ScaffoldSystem::Allround => "allround",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScaffoldSystem::Blitz70 => "Layher Blitz 70",
            ScaffoldSystem::Allround => "Layher Allround",
        }
    }
}

impl FromStr for ScaffoldSystem {
    type Err = GeruestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "blitz70" | "blitz" | "layherblitz70" => Ok(ScaffoldSystem::Blitz70),
            "allround" | "layherallround" => Ok(ScaffoldSystem::Allround),
            _ => Err(GeruestError::ConfigInvalid {
                key: "scaffold_system".to_string(),
                reason: format!("Unknown scaffold system: {}. Use blitz70 or allround", s),
            }),
        }
    }
}

/// Scaffold configuration for one address session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScaffoldingConfig {
    pub work_type: WorkType,
    pub scaffold_type: ScaffoldType,
    pub width_class: WidthClass,
    pub system: ScaffoldSystem,
    pub roof_shape: RoofShape,

    /// Heights received from the backend
    pub heights: BuildingHeights,

    /// User overrides applied on top of `heights`
    pub manual_heights: Option<ManualHeights>,
}

impl ScaffoldingConfig {
    /// Heights after applying manual overrides
    pub fn effective_heights(&self) -> BuildingHeights {
        self.heights.with_overrides(self.manual_heights.as_ref())
    }

    /// Scaffold height derived from the work type.
    ///
    /// Roof work adds the SUVA fall-protection margin above the ridge;
    /// facade work stops at the eave. Missing heights fall back to the
    /// estimate, then to zero.
    pub fn scaffold_height(&self) -> f64 {
        let heights = self.effective_heights();
        match self.work_type {
            WorkType::RoofWork => {
                heights.ridge_height_m.or(heights.estimated_height_m).unwrap_or(0.0)
                    + ROOF_WORK_MARGIN_M
            }
            WorkType::FacadeWork => {
                heights.eave_height_m.or(heights.estimated_height_m).unwrap_or(0.0)
            }
        }
    }

    /// Sum of nominal facade lengths
    pub fn total_length<'a>(&self, sides: impl IntoIterator<Item = &'a FacadeSide>) -> f64 {
        sides.into_iter().map(|s| takeoff::sanitize(s.length_m)).sum()
    }

    /// Nominal facade area (length x scaffold height), before NPK surcharges
    pub fn total_area<'a>(&self, sides: impl IntoIterator<Item = &'a FacadeSide>) -> f64 {
        self.total_length(sides) * self.scaffold_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::building::HeightSource;
    use crate::models::facade::CompassDirection;

    fn heights(eave: Option<f64>, ridge: Option<f64>, estimated: Option<f64>) -> BuildingHeights {
        BuildingHeights {
            eave_height_m: eave,
            ridge_height_m: ridge,
            estimated_height_m: estimated,
            source: HeightSource::Measured,
        }
    }

    fn side(index: usize, length_m: f64) -> FacadeSide {
        FacadeSide {
            index,
            start: [0.0, 0.0],
            end: [length_m, 0.0],
            length_m,
            direction: CompassDirection::S,
            angle_deg: 0.0,
        }
    }

    #[test]
    fn test_roof_work_uses_ridge_plus_margin() {
        let config = ScaffoldingConfig {
            work_type: WorkType::RoofWork,
            heights: heights(Some(7.0), Some(11.5), Some(9.0)),
            ..Default::default()
        };
        assert!((config.scaffold_height() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_facade_work_uses_eave() {
        let config = ScaffoldingConfig {
            work_type: WorkType::FacadeWork,
            heights: heights(Some(7.0), Some(11.5), Some(9.0)),
            ..Default::default()
        };
        assert!((config.scaffold_height() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_height_falls_back_to_estimate_then_zero() {
        let mut config = ScaffoldingConfig {
            work_type: WorkType::FacadeWork,
            heights: heights(None, None, Some(9.0)),
            ..Default::default()
        };
        assert!((config.scaffold_height() - 9.0).abs() < 1e-9);

        config.work_type = WorkType::RoofWork;
        assert!((config.scaffold_height() - 10.0).abs() < 1e-9);

        config.heights = heights(None, None, None);
        assert!((config.scaffold_height() - 1.0).abs() < 1e-9);

        config.work_type = WorkType::FacadeWork;
        assert_eq!(config.scaffold_height(), 0.0);
    }

    #[test]
    fn test_manual_override_wins() {
        let config = ScaffoldingConfig {
            work_type: WorkType::FacadeWork,
            heights: heights(Some(7.0), None, None),
            manual_heights: Some(ManualHeights::new(Some(8.5), None)),
            ..Default::default()
        };
        assert!((config.scaffold_height() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_totals() {
        let config = ScaffoldingConfig {
            heights: heights(Some(6.0), None, None),
            ..Default::default()
        };
        let sides = vec![side(0, 10.0), side(1, 4.0)];
        assert!((config.total_length(&sides) - 14.0).abs() < 1e-9);
        assert!((config.total_area(&sides) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("roof".parse::<WorkType>().unwrap(), WorkType::RoofWork);
        assert_eq!("Fassade".parse::<WorkType>().unwrap(), WorkType::FacadeWork);
        assert_eq!("w12".parse::<WidthClass>().unwrap(), WidthClass::W12);
        assert_eq!("Layher Blitz 70".parse::<ScaffoldSystem>().unwrap(), ScaffoldSystem::Blitz70);
        assert_eq!("catch".parse::<ScaffoldType>().unwrap(), ScaffoldType::Catch);
        assert!("W15".parse::<WidthClass>().is_err());
        assert!("ladder".parse::<WorkType>().is_err());
    }
}
