//! Single-day sun-hour integration at a fixed observation point.
//!
//! The day is sampled at a fixed interval; each lit sample contributes its
//! interval, attenuated by the slope irradiance factor and by whatever
//! shadows cover the point at that instant. Overlapping shadows compose
//! multiplicatively: a sample's light fraction is the product of
//! `1 - shade_intensity` over every covering polygon, so two half-opaque
//! canopies never add up to more than full blockage.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::coords::{Coordinates, Point};
use crate::shadow::{Obstacle, all_shadows};
use crate::slope::{PlotSlope, adjust_for_slope_with_threshold};
use crate::solar::{self, PolarCondition, SolarPosition};

/// Per-day record of theoretical (unobstructed, flat-ground) sun hours and
/// horizon-crossing times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySunData {
    pub date: NaiveDate,
    pub sun_hours: f64,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub solar_noon: NaiveDateTime,
    pub polar_condition: PolarCondition,
}

/// Hours one obstacle's shadow withheld from the observation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleShade {
    pub obstacle_id: String,
    pub hours_blocked: f64,
}

/// Shade- and slope-adjusted variant of [`DailySunData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySunDataWithShade {
    pub base: DailySunData,
    /// Sun hours actually reaching the observation point.
    pub shaded_sun_hours: f64,
    /// Total hours lost to obstacle shadows.
    pub hours_blocked: f64,
    /// Per-obstacle breakdown, only obstacles that blocked anything.
    pub blocking: Vec<ObstacleShade>,
}

fn sample_instants(date: NaiveDate, config: &EngineConfig) -> impl Iterator<Item = NaiveDateTime> {
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN);
    let interval = config.sampling_interval_minutes() as i64;
    (0..config.samples_per_day() as i64).map(move |i| midnight + Duration::minutes(i * interval))
}

/// Theoretical sun hours for a day: fixed-interval sampling of the solar
/// altitude, no obstacles, flat ground.
pub fn daily_sun_hours(
    coords: &Coordinates,
    date: NaiveDate,
    config: &EngineConfig,
) -> DailySunData {
    let day = solar::solar_day(coords, date);
    let interval_hours = config.sampling_interval_hours();

    let sun_hours = sample_instants(date, config)
        .filter(|t| solar::sun_position(coords, *t).altitude > 0.0)
        .count() as f64
        * interval_hours;

    DailySunData {
        date,
        sun_hours,
        sunrise: day.sunrise,
        sunset: day.sunset,
        solar_noon: day.solar_noon,
        polar_condition: day.polar_condition,
    }
}

/// Light fraction a sample keeps after slope and shadows, plus the
/// per-obstacle attenuation that sample saw.
fn sample_light_fraction(
    sun: &SolarPosition,
    observation_point: &Point,
    obstacles: &[Obstacle],
    slope: Option<&PlotSlope>,
    config: &EngineConfig,
) -> (f64, Vec<(String, f64)>) {
    let slope_factor = match slope {
        Some(slope) => adjust_for_slope_with_threshold(slope, sun, config.slope_threshold_deg())
            .irradiance_factor
            .clamp(0.0, 1.0),
        None => 1.0,
    };

    if slope_factor <= 0.0 {
        return (0.0, Vec::new());
    }

    let mut light = slope_factor;
    let mut blocked = Vec::new();

    for shadow in all_shadows(obstacles, sun, slope, config) {
        if shadow.contains(observation_point) {
            light *= 1.0 - shadow.shade_intensity;
            blocked.push((shadow.obstacle_id, shadow.shade_intensity));
        }
    }

    (light, blocked)
}

/// Shade-adjusted sun hours at an observation point, with a per-obstacle
/// ledger of blocked hours. A sample with the sun at or below the horizon
/// contributes nothing regardless of obstacles.
pub fn daily_sun_hours_with_shade(
    coords: &Coordinates,
    date: NaiveDate,
    obstacles: &[Obstacle],
    slope: Option<&PlotSlope>,
    observation_point: &Point,
    config: &EngineConfig,
) -> DailySunDataWithShade {
    let base = daily_sun_hours(coords, date, config);
    let interval_hours = config.sampling_interval_hours();

    let mut shaded_sun_hours = 0.0;
    let mut unshaded_hours = 0.0;
    let mut ledger: Vec<ObstacleShade> = Vec::new();

    for instant in sample_instants(date, config) {
        let sun = solar::sun_position(coords, instant);
        if sun.altitude <= 0.0 {
            continue;
        }

        let (light, blocked) =
            sample_light_fraction(&sun, observation_point, obstacles, slope, config);

        shaded_sun_hours += light * interval_hours;

        // Baseline for "blocked" excludes the slope effect so the ledger
        // attributes losses to obstacles only.
        let slope_only = match slope {
            Some(s) => adjust_for_slope_with_threshold(s, &sun, config.slope_threshold_deg())
                .irradiance_factor
                .clamp(0.0, 1.0),
            None => 1.0,
        };
        unshaded_hours += slope_only * interval_hours;

        for (obstacle_id, intensity) in blocked {
            let hours = intensity * slope_only * interval_hours;
            match ledger.iter_mut().find(|e| e.obstacle_id == obstacle_id) {
                Some(entry) => entry.hours_blocked += hours,
                None => ledger.push(ObstacleShade {
                    obstacle_id,
                    hours_blocked: hours,
                }),
            }
        }
    }

    DailySunDataWithShade {
        base,
        shaded_sun_hours,
        hours_blocked: (unshaded_hours - shaded_sun_hours).max(0.0),
        blocking: ledger,
    }
}
