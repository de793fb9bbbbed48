//! Solar position astronomy.
//!
//! NOAA-style approximation: julian day, equation of time and solar
//! declination feed the hour angle, the spherical-triangle altitude and the
//! acos azimuth. Accurate to a fraction of a degree, which is far below the
//! sampling noise of the sun-hour integrators built on top.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::coords::Coordinates;

/// Sun direction seen from the observer, degrees.
///
/// `altitude` is the angle above the horizon (`<= 0` means below horizon,
/// no shadows and no direct light); `azimuth` is the compass bearing in
/// `[0, 360)` measured clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    pub altitude: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarCondition {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "midnight-sun")]
    MidnightSun,
    #[serde(rename = "polar-night")]
    PolarNight,
}

/// Horizon-crossing times for one calendar day, all UTC.
///
/// `sunrise`/`sunset` are `None` under polar conditions; `polar_condition`
/// says which one applies so callers never mistake the absence for a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarDay {
    pub date: NaiveDate,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub solar_noon: NaiveDateTime,
    pub polar_condition: PolarCondition,
}

impl SolarDay {
    /// Hours between sunrise and sunset; 24 under midnight sun, 0 under
    /// polar night.
    pub fn day_length_hours(&self) -> f64 {
        match self.polar_condition {
            PolarCondition::MidnightSun => 24.0,
            PolarCondition::PolarNight => 0.0,
            PolarCondition::None => match (self.sunrise, self.sunset) {
                (Some(rise), Some(set)) => (set - rise).num_seconds() as f64 / 3600.0,
                _ => 0.0,
            },
        }
    }
}

fn julian_day(date: NaiveDate) -> f64 {
    let a = (14 - date.month() as i32) / 12;
    let y = date.year() + 4800 - a;
    let m = date.month() as i32 + 12 * a - 3;

    date.day() as f64 + (153 * m + 2) as f64 / 5.0 + 365.0 * y as f64 + (y / 4) as f64
        - (y / 100) as f64
        + (y / 400) as f64
        - 32045.0
}

/// Ecliptic longitude of the sun, radians, shared by the declination and
/// equation-of-time terms.
fn solar_lambda(julian_day: f64) -> (f64, f64) {
    let n = julian_day - 2451545.0;
    let l = (280.460 + 0.9856474 * n).rem_euclid(360.0);
    let g = ((357.528 + 0.9856003 * n).rem_euclid(360.0)).to_radians();
    let lambda = (l + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    (l, lambda)
}

/// Obliquity of the ecliptic, radians.
fn obliquity(julian_day: f64) -> f64 {
    let n = julian_day - 2451545.0;
    (23.439 - 0.0000004 * n).to_radians()
}

/// Equation of time in minutes, apparent minus mean solar time.
///
/// Built on the sun's right ascension, folded into the same revolution as
/// the mean longitude, so both the eccentricity and obliquity components
/// contribute.
fn equation_of_time(julian_day: f64) -> f64 {
    let (l, lambda) = solar_lambda(julian_day);
    let eps = obliquity(julian_day);

    let alpha = (eps.cos() * lambda.sin()).atan2(lambda.cos()).to_degrees();
    let delta = (l - alpha + 180.0).rem_euclid(360.0) - 180.0;

    4.0 * (delta - 0.0057183)
}

/// Solar declination in degrees.
fn solar_declination(julian_day: f64) -> f64 {
    let (_, lambda) = solar_lambda(julian_day);
    (obliquity(julian_day).sin() * lambda.sin()).asin().to_degrees()
}

fn solar_time(datetime: NaiveDateTime, equation_of_time: f64, longitude: f64) -> f64 {
    let clock = datetime.hour() as f64
        + datetime.minute() as f64 / 60.0
        + datetime.second() as f64 / 3600.0;
    clock + equation_of_time / 60.0 + longitude / 15.0
}

/// Sun altitude/azimuth for a location at a UTC instant.
pub fn sun_position(coords: &Coordinates, datetime: NaiveDateTime) -> SolarPosition {
    let jd = julian_day(datetime.date());
    let eot = equation_of_time(jd);
    let declination = solar_declination(jd);

    let hour_angle = 15.0 * (solar_time(datetime, eot, coords.longitude) - 12.0);

    let lat_rad = coords.latitude.to_radians();
    let dec_rad = declination.to_radians();
    let hour_rad = hour_angle.to_radians();

    let altitude_rad =
        (lat_rad.sin() * dec_rad.sin() + lat_rad.cos() * dec_rad.cos() * hour_rad.cos()).asin();

    // acos argument drifts slightly outside [-1, 1] near the zenith
    let cos_alt = altitude_rad.cos();
    let azimuth_deg = if cos_alt.abs() < 1e-9 {
        180.0
    } else {
        let arg = ((dec_rad.sin() * lat_rad.cos() - dec_rad.cos() * lat_rad.sin() * hour_rad.cos())
            / cos_alt)
            .clamp(-1.0, 1.0);
        let azimuth = arg.acos().to_degrees();

        // Hour angle resolves the east/west ambiguity of acos
        if hour_angle.rem_euclid(360.0) > 0.0 && hour_angle.rem_euclid(360.0) < 180.0 {
            360.0 - azimuth
        } else {
            azimuth
        }
    };

    SolarPosition {
        altitude: altitude_rad.to_degrees(),
        azimuth: azimuth_deg.rem_euclid(360.0),
    }
}

fn altitude_at(coords: &Coordinates, datetime: NaiveDateTime) -> f64 {
    sun_position(coords, datetime).altitude
}

/// UTC instant of solar transit (hour angle zero) for the date.
pub fn solar_noon(coords: &Coordinates, date: NaiveDate) -> NaiveDateTime {
    let jd = julian_day(date);
    let eot = equation_of_time(jd);

    let noon_hours = (12.0 - eot / 60.0 - coords.longitude / 15.0).rem_euclid(24.0);
    let seconds = (noon_hours * 3600.0).round() as i64;

    NaiveDateTime::new(date, NaiveTime::MIN) + Duration::seconds(seconds)
}

/// Bisect the horizon crossing between two instants whose altitudes have
/// opposite signs. Resolution is better than one minute.
fn find_horizon_crossing(
    coords: &Coordinates,
    mut below: NaiveDateTime,
    mut above: NaiveDateTime,
) -> NaiveDateTime {
    let tolerance = Duration::seconds(30);

    while (above - below).abs() > tolerance {
        let mid = below + (above - below) / 2;
        if altitude_at(coords, mid) > 0.0 {
            above = mid;
        } else {
            below = mid;
        }
    }

    below + (above - below) / 2
}

/// Sunrise, sunset and solar noon for a calendar day, with polar day/night
/// detection at latitudes where the sun never crosses the horizon.
pub fn solar_day(coords: &Coordinates, date: NaiveDate) -> SolarDay {
    let noon = solar_noon(coords, date);
    let morning = noon - Duration::hours(12);
    let evening = noon + Duration::hours(12);

    if altitude_at(coords, noon) <= 0.0 {
        return SolarDay {
            date,
            sunrise: None,
            sunset: None,
            solar_noon: noon,
            polar_condition: PolarCondition::PolarNight,
        };
    }

    // Both boundaries must be dark for a sunrise/sunset pair to bracket.
    // On the transition days into and out of the midnight-sun period one
    // boundary is still lit; those days have no crossing pair and count
    // as midnight sun.
    if altitude_at(coords, morning) > 0.0 || altitude_at(coords, evening) > 0.0 {
        return SolarDay {
            date,
            sunrise: None,
            sunset: None,
            solar_noon: noon,
            polar_condition: PolarCondition::MidnightSun,
        };
    }

    let sunrise = find_horizon_crossing(coords, morning, noon);
    let sunset = find_horizon_crossing(coords, evening, noon);

    SolarDay {
        date,
        sunrise: Some(sunrise),
        sunset: Some(sunset),
        solar_noon: noon,
        polar_condition: PolarCondition::None,
    }
}
