use serde::{Deserialize, Serialize};

use crate::config::EngineError;
use crate::coords::{Coordinates, Point};

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Geographic bounding box for exposure grid computations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl GridBounds {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Result<Self, EngineError> {
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(EngineError::InvalidBounds(
                "latitude values must be between -90 and 90".to_string(),
            ));
        }

        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(EngineError::InvalidBounds(
                "longitude values must be between -180 and 180".to_string(),
            ));
        }

        if south > north || west > east {
            return Err(EngineError::InvalidBounds(
                "min values must be <= max values".to_string(),
            ));
        }

        Ok(GridBounds {
            south,
            north,
            west,
            east,
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        Self::new(self.south, self.north, self.west, self.east).map(|_| ())
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: (self.south + self.north) / 2.0,
            longitude: (self.west + self.east) / 2.0,
        }
    }

    /// North-south extent in meters.
    pub fn height_meters(&self) -> f64 {
        (self.north - self.south) * METERS_PER_DEGREE_LAT
    }

    /// East-west extent in meters, measured at the central latitude.
    pub fn width_meters(&self) -> f64 {
        let lat = self.center().latitude.to_radians();
        (self.east - self.west) * METERS_PER_DEGREE_LAT * lat.cos()
    }

    /// Convert a lat/lng position into local meters relative to the
    /// south-west corner (equirectangular, scaled at the central latitude).
    pub fn to_local(&self, latitude: f64, longitude: f64) -> Point {
        let lat = self.center().latitude.to_radians();
        Point {
            x: (longitude - self.west) * METERS_PER_DEGREE_LAT * lat.cos(),
            y: (latitude - self.south) * METERS_PER_DEGREE_LAT,
        }
    }

    /// Centroid of cell (row, col) in a `width` x `height` grid, in the same
    /// local frame as `to_local`. Row 0 is the southern edge.
    pub fn cell_center(&self, row: usize, col: usize, width: usize, height: usize) -> Point {
        let cell_w = self.width_meters() / width as f64;
        let cell_h = self.height_meters() / height as f64;
        Point {
            x: (col as f64 + 0.5) * cell_w,
            y: (row as f64 + 0.5) * cell_h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_coords_are_within_ranges() {
        let valid = GridBounds::new(45.51, 45.52, -122.68, -122.67);
        assert!(valid.is_ok());

        let invalid_lat = GridBounds::new(-100.0, 0.0, 0.0, 10.0);
        assert!(invalid_lat.is_err());

        let invalid_lon = GridBounds::new(0.0, 10.0, -200.0, 0.0);
        assert!(invalid_lon.is_err());

        let invalid_order = GridBounds::new(10.0, 0.0, 0.0, 10.0);
        assert!(invalid_order.is_err());
    }

    #[test]
    fn test_bounds_local_conversion() {
        let bounds = GridBounds::new(45.0, 45.01, -122.0, -121.99).unwrap();

        let sw = bounds.to_local(45.0, -122.0);
        assert!(sw.x.abs() < 1e-9);
        assert!(sw.y.abs() < 1e-9);

        let ne = bounds.to_local(45.01, -121.99);
        assert!((ne.y - bounds.height_meters()).abs() < 1e-6);
        assert!((ne.x - bounds.width_meters()).abs() < 1e-6);

        // 0.01 degrees of latitude is roughly 1.1 km
        assert!(bounds.height_meters() > 1000.0 && bounds.height_meters() < 1200.0);
    }

    #[test]
    fn test_cell_center_inside_bounds() {
        let bounds = GridBounds::new(45.0, 45.01, -122.0, -121.99).unwrap();
        let c = bounds.cell_center(0, 0, 10, 10);
        assert!(c.x > 0.0 && c.x < bounds.width_meters());
        assert!(c.y > 0.0 && c.y < bounds.height_meters());

        let last = bounds.cell_center(9, 9, 10, 10);
        assert!(last.x < bounds.width_meters());
        assert!(last.y < bounds.height_meters());
    }
}
