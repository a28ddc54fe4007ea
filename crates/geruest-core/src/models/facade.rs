use serde::{Deserialize, Serialize};
use std::fmt;

/// Eight-way compass label for the direction a facade faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    /// Map a bearing (degrees clockwise from north) to the nearest of eight sectors
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let normalized = bearing_deg.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        match sector {
            0 => CompassDirection::N,
            1 => CompassDirection::NE,
            2 => CompassDirection::E,
            3 => CompassDirection::SE,
            4 => CompassDirection::S,
            5 => CompassDirection::SW,
            6 => CompassDirection::W,
            _ => CompassDirection::NW,
        }
    }

    /// German label as shown in plans ("Nord", "Südost", ...)
    pub fn label_de(&self) -> &'static str {
        match self {
            CompassDirection::N => "Nord",
            CompassDirection::NE => "Nordost",
            CompassDirection::E => "Ost",
            CompassDirection::SE => "Südost",
            CompassDirection::S => "Süd",
            CompassDirection::SW => "Südwest",
            CompassDirection::W => "West",
            CompassDirection::NW => "Nordwest",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompassDirection::N => "N",
            CompassDirection::NE => "NE",
            CompassDirection::E => "E",
            CompassDirection::SE => "SE",
            CompassDirection::S => "S",
            CompassDirection::SW => "SW",
            CompassDirection::W => "W",
            CompassDirection::NW => "NW",
        };
        f.write_str(s)
    }
}

/// One straight wall segment of a building footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeSide {
    /// Sequence position within the footprint, unique per building
    pub index: usize,

    /// Start point in plan coordinates (LV95 metres)
    pub start: [f64; 2],

    /// End point in plan coordinates (LV95 metres)
    pub end: [f64; 2],

    /// Horizontal length in metres
    pub length_m: f64,

    /// Direction the facade faces
    pub direction: CompassDirection,

    /// Edge angle in degrees, counter-clockwise from the x axis
    pub angle_deg: f64,
}

impl FacadeSide {
    /// Facades at or below 0.5 m are digitising noise, not walls
    pub fn is_selectable(&self) -> bool {
        self.length_m > crate::takeoff::MIN_FACADE_LENGTH_M
    }
}
