use chrono::{Duration, Months, NaiveDate};

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod error;
pub use error::EngineError;

pub mod sample_step;
pub use sample_step::SampleStep;

const VALID_SAMPLING_INTERVALS: [u16; 7] = [5, 10, 12, 15, 20, 30, 60];

/// Per-type shadow opacity factors, 1.0 meaning fully opaque.
///
/// Deciduous canopies transmit part of the light, so their factor sits
/// well below the evergreen one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShadeIntensities {
    pub deciduous_tree: f64,
    pub evergreen_tree: f64,
    pub building: f64,
    pub fence: f64,
    pub hedge: f64,
}

impl Default for ShadeIntensities {
    fn default() -> Self {
        Self {
            deciduous_tree: 0.6,
            evergreen_tree: 0.9,
            building: 1.0,
            fence: 0.95,
            hedge: 0.85,
        }
    }
}

impl ShadeIntensities {
    fn validate(&self) -> Result<(), EngineError> {
        let values = [
            self.deciduous_tree,
            self.evergreen_tree,
            self.building,
            self.fence,
            self.hedge,
        ];
        if values.iter().any(|v| !(*v > 0.0 && *v <= 1.0)) {
            return Err(EngineError::ShadeIntensity);
        }
        Ok(())
    }
}

/// Engine-wide tuning knobs, passed explicitly into every calculator so
/// concurrent computations never share mutable state.
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfig {
    sampling_interval_minutes: u16,
    max_shadow_length_m: f64,
    slope_threshold_deg: f64,
    shade_intensities: ShadeIntensities,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling_interval_minutes: 15,
            max_shadow_length_m: 300.0,
            slope_threshold_deg: 0.5,
            shade_intensities: ShadeIntensities::default(),
        }
    }
}

// Validates fields while deserializing so an EngineConfig in hand is always
// usable: the sampling interval must divide the day evenly and shade
// intensities must be sane opacities.
impl<'de> Deserialize<'de> for EngineConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            sampling_interval_minutes: Option<u16>,
            max_shadow_length_m: Option<f64>,
            slope_threshold_deg: Option<f64>,
            shade_intensities: Option<ShadeIntensities>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = EngineConfig::default();

        let sampling_interval_minutes = helper
            .sampling_interval_minutes
            .unwrap_or(defaults.sampling_interval_minutes);
        if !VALID_SAMPLING_INTERVALS.contains(&sampling_interval_minutes) {
            return Err(D::Error::custom(EngineError::SamplingInterval));
        }

        let max_shadow_length_m = helper
            .max_shadow_length_m
            .unwrap_or(defaults.max_shadow_length_m);
        if max_shadow_length_m <= 0.0 {
            return Err(D::Error::custom("max_shadow_length_m must be positive"));
        }

        let shade_intensities = helper
            .shade_intensities
            .unwrap_or(defaults.shade_intensities);
        shade_intensities
            .validate()
            .map_err(D::Error::custom)?;

        Ok(EngineConfig {
            sampling_interval_minutes,
            max_shadow_length_m,
            slope_threshold_deg: helper
                .slope_threshold_deg
                .unwrap_or(defaults.slope_threshold_deg),
            shade_intensities,
        })
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, EngineError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: EngineConfig = serde_json::from_reader(reader).map_err(EngineError::from)?;

        Ok(config)
    }

    pub fn sampling_interval_minutes(&self) -> u16 {
        self.sampling_interval_minutes
    }

    pub fn sampling_interval_hours(&self) -> f64 {
        self.sampling_interval_minutes as f64 / 60.0
    }

    pub fn samples_per_day(&self) -> usize {
        (24 * 60 / self.sampling_interval_minutes) as usize
    }

    pub fn max_shadow_length_m(&self) -> f64 {
        self.max_shadow_length_m
    }

    pub fn slope_threshold_deg(&self) -> f64 {
        self.slope_threshold_deg
    }

    pub fn shade_intensities(&self) -> &ShadeIntensities {
        &self.shade_intensities
    }
}

/// Inclusive calendar date range, iterable at a configurable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    #[serde(default)]
    step: SampleStep,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        Self::with_step(start, end, SampleStep::Daily)
    }

    pub fn with_step(
        start: NaiveDate,
        end: NaiveDate,
        step: SampleStep,
    ) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::DateOrder);
        }

        Ok(DateRange { start, end, step })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn step(&self) -> SampleStep {
        self.step
    }

    /// Inclusive number of calendar days covered, independent of the step.
    pub fn inclusive_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    fn increment_date(&self, current_date: NaiveDate) -> Option<NaiveDate> {
        match self.step {
            SampleStep::Daily => Some(current_date + Duration::days(1)),
            SampleStep::Weekly => Some(current_date + Duration::weeks(1)),
            SampleStep::Monthly => current_date.checked_add_months(Months::new(1)),
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start <= self.end {
            let current_date = self.start;
            self.start = self.increment_date(self.start)?;
            Some(current_date)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("Invalid date")
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("engine.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "sampling_interval_minutes": 10,
        "max_shadow_length_m": 250.0
    }
    "#;

        file.write_all(config_data.as_bytes()).unwrap();

        let config = EngineConfig::from_file(file_path).unwrap();

        assert_eq!(config.sampling_interval_minutes(), 10);
        assert_eq!(config.samples_per_day(), 144);
        assert_eq!(config.max_shadow_length_m(), 250.0);
        // Unspecified fields fall back to defaults
        assert_eq!(config.shade_intensities().building, 1.0);
    }

    #[test]
    fn test_invalid_sampling_interval_rejected() {
        let result: Result<EngineConfig, _> =
            serde_json::from_str(r#"{"sampling_interval_minutes": 7}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_shade_intensity_rejected() {
        let result: Result<EngineConfig, _> = serde_json::from_str(
            r#"{"shade_intensities": {
                "deciduous_tree": 0.6,
                "evergreen_tree": 1.5,
                "building": 1.0,
                "fence": 0.95,
                "hedge": 0.85
            }}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_date_range_rejects_reversed_dates() {
        assert!(DateRange::new(ymd(2024, 3, 2), ymd(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_date_range_daily_iteration() {
        let range = DateRange::new(ymd(2023, 1, 1), ymd(2023, 1, 3)).unwrap();
        let dates: Vec<NaiveDate> = range.collect();

        assert_eq!(
            dates,
            vec![ymd(2023, 1, 1), ymd(2023, 1, 2), ymd(2023, 1, 3)]
        );
    }

    #[test]
    fn test_date_range_weekly_iteration() {
        let range =
            DateRange::with_step(ymd(2023, 1, 1), ymd(2023, 1, 20), SampleStep::Weekly).unwrap();
        let dates: Vec<NaiveDate> = range.collect();

        assert_eq!(
            dates,
            vec![ymd(2023, 1, 1), ymd(2023, 1, 8), ymd(2023, 1, 15)]
        );
    }

    #[test]
    fn test_date_range_monthly_clamps_to_month_end() {
        let range =
            DateRange::with_step(ymd(2023, 1, 31), ymd(2023, 3, 31), SampleStep::Monthly).unwrap();
        let dates: Vec<NaiveDate> = range.collect();

        // January 31st + 1 month lands on February 28th
        assert_eq!(dates[1], ymd(2023, 2, 28));
    }

    #[test]
    fn test_inclusive_days_leap_year() {
        let feb = DateRange::new(ymd(2024, 2, 1), ymd(2024, 2, 29)).unwrap();
        assert_eq!(feb.inclusive_days(), 29);

        let year = DateRange::new(ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();
        assert_eq!(year.inclusive_days(), 366);
    }
}
