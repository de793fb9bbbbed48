use serde::{Deserialize, Serialize};

use crate::config::EngineError;

/// Geographic location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, EngineError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(EngineError::InvalidCoordinates(format!(
                "latitude must be between -90 and 90, got {}",
                latitude
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(EngineError::InvalidCoordinates(format!(
                "longitude must be between -180 and 180, got {}",
                longitude
            )));
        }

        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Ground-plane point in meters relative to an observation origin.
/// `x` grows eastward, `y` grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
