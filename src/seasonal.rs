//! Date-range reduction of daily sun hours into summary statistics.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{DateRange, EngineConfig, EngineError};
use crate::coords::Coordinates;
use crate::daily::{DailySunData, daily_sun_hours};
use crate::solar::PolarCondition;

/// Summary of theoretical sun hours across an inclusive date range.
///
/// `daily_data` always holds one record per calendar day in the range, so
/// its length equals the inclusive day count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub average_sun_hours: f64,
    pub min_sun_hours: f64,
    pub max_sun_hours: f64,
    pub days_of_midnight_sun: usize,
    pub days_of_polar_night: usize,
    pub daily_data: Vec<DailySunData>,
}

/// Evaluate every day in `[start, end]` inclusive and reduce to min, max,
/// average and polar-condition day counts.
pub fn seasonal_summary(
    coords: &Coordinates,
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
) -> Result<SeasonalSummary, EngineError> {
    let range = DateRange::new(start, end)?;

    let daily_data: Vec<DailySunData> = range
        .map(|date| daily_sun_hours(coords, date, config))
        .collect();

    let mut min_sun_hours = f64::INFINITY;
    let mut max_sun_hours = f64::NEG_INFINITY;
    let mut total = 0.0;
    let mut days_of_midnight_sun = 0;
    let mut days_of_polar_night = 0;

    for day in &daily_data {
        min_sun_hours = min_sun_hours.min(day.sun_hours);
        max_sun_hours = max_sun_hours.max(day.sun_hours);
        total += day.sun_hours;

        match day.polar_condition {
            PolarCondition::MidnightSun => days_of_midnight_sun += 1,
            PolarCondition::PolarNight => days_of_polar_night += 1,
            PolarCondition::None => {}
        }
    }

    let average_sun_hours = total / daily_data.len() as f64;

    Ok(SeasonalSummary {
        start_date: start,
        end_date: end,
        average_sun_hours,
        min_sun_hours,
        max_sun_hours,
        days_of_midnight_sun,
        days_of_polar_night,
        daily_data,
    })
}

fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), EngineError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        EngineError::InvalidDate(format!("no such month: {}-{:02}", year, month))
    })?;

    let last = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| EngineError::InvalidDate(format!("month overflow: {}-{:02}", year, month)))?
        - Duration::days(1);

    Ok((first, last))
}

/// Summary for one calendar month, leap years included.
pub fn monthly_summary(
    coords: &Coordinates,
    year: i32,
    month: u32,
    config: &EngineConfig,
) -> Result<SeasonalSummary, EngineError> {
    let (first, last) = month_bounds(year, month)?;
    seasonal_summary(coords, first, last, config)
}

/// Twelve monthly summaries for a calendar year.
pub fn yearly_summary(
    coords: &Coordinates,
    year: i32,
    config: &EngineConfig,
) -> Result<Vec<SeasonalSummary>, EngineError> {
    (1..=12)
        .map(|month| monthly_summary(coords, year, month, config))
        .collect()
}

/// Single summary spanning the whole calendar year.
pub fn annual_summary(
    coords: &Coordinates,
    year: i32,
    config: &EngineConfig,
) -> Result<SeasonalSummary, EngineError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| EngineError::InvalidDate(format!("no such year: {}", year)))?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| EngineError::InvalidDate(format!("no such year: {}", year)))?;
    seasonal_summary(coords, first, last, config)
}
