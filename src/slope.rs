//! Tilted ground-plane correction.
//!
//! A slope facing the sun sees it higher relative to the surface than the
//! true altitude; a slope facing away sees it lower. The correction folds
//! the angular distance between sun azimuth and slope aspect, scaled by the
//! slope angle, into an effective altitude that feeds both the shadow
//! projector and the sun-hour integrators.

use serde::{Deserialize, Serialize};

use crate::solar::SolarPosition;

/// Ground tilt: `angle` degrees from horizontal (0..30), `aspect` the
/// compass bearing the slope faces (its downhill direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSlope {
    pub angle: f64,
    pub aspect: f64,
}

impl PlotSlope {
    pub fn flat() -> Self {
        PlotSlope {
            angle: 0.0,
            aspect: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeAdjusted {
    /// Sun altitude relative to the tilted surface, degrees.
    pub effective_altitude: f64,
    /// Irradiance scaling relative to flat ground; 1.0 on flat ground,
    /// 0.0 when the sun is below the tilted plane.
    pub irradiance_factor: f64,
}

/// Slope angles below this many degrees are treated as flat ground to keep
/// floating noise out of near-level plots.
pub const FLAT_SLOPE_THRESHOLD_DEG: f64 = 0.5;

pub fn adjust_for_slope(slope: &PlotSlope, position: &SolarPosition) -> SlopeAdjusted {
    adjust_for_slope_with_threshold(slope, position, FLAT_SLOPE_THRESHOLD_DEG)
}

pub fn adjust_for_slope_with_threshold(
    slope: &PlotSlope,
    position: &SolarPosition,
    flat_threshold_deg: f64,
) -> SlopeAdjusted {
    if slope.angle < flat_threshold_deg {
        return SlopeAdjusted {
            effective_altitude: position.altitude,
            irradiance_factor: 1.0,
        };
    }

    // Angular distance between where the sun stands and where the slope
    // faces; cos of it decides boost (toward) versus reduction (away).
    let azimuth_delta = (position.azimuth - slope.aspect).to_radians();
    let tilt_component = (slope.angle.to_radians().sin() * azimuth_delta.cos()).asin();

    let effective_altitude = (position.altitude + tilt_component.to_degrees()).clamp(-90.0, 90.0);

    let irradiance_factor = if position.altitude <= 0.0 {
        0.0
    } else {
        let flat = position.altitude.to_radians().sin().max(1e-6);
        let tilted = effective_altitude.to_radians().sin().max(0.0);
        tilted / flat
    };

    SlopeAdjusted {
        effective_altitude,
        irradiance_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(altitude: f64, azimuth: f64) -> SolarPosition {
        SolarPosition { altitude, azimuth }
    }

    #[test]
    fn test_near_flat_slope_is_identity() {
        let slope = PlotSlope {
            angle: 0.3,
            aspect: 270.0,
        };
        let pos = sun(35.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert_eq!(adjusted.effective_altitude, 35.0);
        assert_eq!(adjusted.irradiance_factor, 1.0);
    }

    #[test]
    fn test_south_slope_boosts_southern_sun() {
        // Slope faces the sun head-on: effective altitude rises by the
        // full slope angle.
        let slope = PlotSlope {
            angle: 15.0,
            aspect: 180.0,
        };
        let pos = sun(25.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert!((adjusted.effective_altitude - 40.0).abs() < 0.01);
        assert!(adjusted.irradiance_factor > 1.0);
    }

    #[test]
    fn test_north_slope_reduces_southern_sun() {
        let slope = PlotSlope {
            angle: 15.0,
            aspect: 0.0,
        };
        let pos = sun(25.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert!((adjusted.effective_altitude - 10.0).abs() < 0.01);
        assert!(adjusted.irradiance_factor < 1.0);
    }

    #[test]
    fn test_perpendicular_aspect_leaves_altitude_unchanged() {
        let slope = PlotSlope {
            angle: 20.0,
            aspect: 90.0,
        };
        let pos = sun(30.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert!((adjusted.effective_altitude - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_steep_away_slope_can_hide_low_sun() {
        let slope = PlotSlope {
            angle: 20.0,
            aspect: 0.0,
        };
        let pos = sun(5.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert!(adjusted.effective_altitude < 0.0);
        assert_eq!(adjusted.irradiance_factor, 0.0);
    }

    #[test]
    fn test_below_horizon_sun_gets_no_irradiance() {
        let slope = PlotSlope {
            angle: 25.0,
            aspect: 180.0,
        };
        let pos = sun(-3.0, 180.0);
        let adjusted = adjust_for_slope(&slope, &pos);

        assert_eq!(adjusted.irradiance_factor, 0.0);
    }
}
