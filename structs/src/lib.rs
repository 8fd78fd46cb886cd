use serde::{Deserialize, Serialize};

pub mod geo;
pub mod problem;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Position {
        Position { lon, lat }
    }

    pub fn manhattan(&self, other: &Position) -> f64 {
        (self.lon - other.lon).abs() + (self.lat - other.lat).abs()
    }

    pub fn eq_lonlat(&self, other: &Position) -> bool {
        (self.lon - other.lon).abs() < 1e-9 && (self.lat - other.lat).abs() < 1e-9
    }
}

// Planar heading in radians, atan2 convention: 0 points along +lon.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct UavPose {
    pub radians: f64,
}

impl UavPose {
    pub fn new(radians: f64) -> UavPose {
        UavPose { radians }
    }
}
