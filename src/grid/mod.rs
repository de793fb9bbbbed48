//! Spatial exposure grid: average sun hours per cell over a date range.
//!
//! The heavy loop is O(cells x sample days x samples per day x obstacles),
//! so the calculator subsamples the date range through [`SampleStep`],
//! shares per-instant sun positions and shadow polygons across all cells,
//! and skips the shadow tests entirely for cells no obstacle can reach.
//! Progress is reported once per row so a host can show percent-complete.

use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::bounds::GridBounds;
use crate::config::{DateRange, EngineConfig, EngineError, SampleStep};
use crate::coords::{Coordinates, Point};
use crate::shadow::{GeoObstacle, Obstacle, ShadowPolygon, all_shadows};
use crate::slope::{PlotSlope, adjust_for_slope_with_threshold};
use crate::solar;

pub mod worker;

/// Hard cap on grid cells per axis; larger requests are almost certainly a
/// unit mix-up on the caller side.
const MAX_GRID_AXIS: usize = 1024;

/// One exposure grid computation, everything the calculator needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRequest {
    pub bounds: GridBounds,
    /// Number of columns.
    pub width: usize,
    /// Number of rows; row 0 is the southern edge.
    pub height: usize,
    pub obstacles: Vec<GeoObstacle>,
    pub date_range: DateRange,
    #[serde(default)]
    pub slope: Option<PlotSlope>,
    #[serde(default)]
    pub config: EngineConfig,
}

/// Dense row-major grid of average sun hours per cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureGrid {
    pub bounds: GridBounds,
    pub width: usize,
    pub height: usize,
    /// Approximate cell edge length in meters.
    pub resolution: f64,
    /// Row-major, `width * height` entries, row 0 southern edge.
    pub values: Vec<f64>,
    pub date_range: DateRange,
    /// Days actually evaluated after subsampling.
    pub sample_days_used: usize,
    pub compute_time_ms: u64,
}

impl ExposureGrid {
    pub fn value_at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }
}

/// Everything about one sampled instant that is identical for every cell:
/// the sun position only depends on time and the (garden-scale) location,
/// and obstacle shadows only depend on the sun.
struct DaySamples {
    /// Shadows per lit sample, paired with the slope irradiance factor.
    lit_samples: Vec<(f64, Vec<ShadowPolygon>)>,
    /// Sun hours a cell out of every obstacle's reach receives this day.
    unshaded_hours: f64,
}

fn prepare_day(
    coords: &Coordinates,
    date: NaiveDate,
    obstacles: &[Obstacle],
    slope: Option<&PlotSlope>,
    config: &EngineConfig,
) -> DaySamples {
    let interval_hours = config.sampling_interval_hours();
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN);

    let mut lit_samples = Vec::new();
    let mut unshaded_hours = 0.0;

    for i in 0..config.samples_per_day() as i64 {
        let instant =
            midnight + chrono::Duration::minutes(i * config.sampling_interval_minutes() as i64);
        let sun = solar::sun_position(coords, instant);
        if sun.altitude <= 0.0 {
            continue;
        }

        let slope_factor = match slope {
            Some(s) => adjust_for_slope_with_threshold(s, &sun, config.slope_threshold_deg())
                .irradiance_factor
                .clamp(0.0, 1.0),
            None => 1.0,
        };
        if slope_factor <= 0.0 {
            continue;
        }

        unshaded_hours += slope_factor * interval_hours;
        lit_samples.push((slope_factor, all_shadows(obstacles, &sun, slope, config)));
    }

    DaySamples {
        lit_samples,
        unshaded_hours,
    }
}

fn cell_day_hours(point: &Point, day: &DaySamples, config: &EngineConfig) -> f64 {
    let interval_hours = config.sampling_interval_hours();
    let mut hours = 0.0;

    for (slope_factor, shadows) in &day.lit_samples {
        let mut light = *slope_factor;
        for shadow in shadows {
            if shadow.contains(point) {
                light *= 1.0 - shadow.shade_intensity;
            }
        }
        hours += light * interval_hours;
    }

    hours
}

fn validate_request(request: &GridRequest) -> Result<(), EngineError> {
    request.bounds.validate()?;

    if request.width == 0 || request.height == 0 {
        return Err(EngineError::GridDimensions(
            "grid width and height must be positive".to_string(),
        ));
    }

    if request.width > MAX_GRID_AXIS || request.height > MAX_GRID_AXIS {
        return Err(EngineError::GridDimensions(format!(
            "grid axis exceeds the {} cell limit",
            MAX_GRID_AXIS
        )));
    }

    Ok(())
}

/// Compute the exposure grid for a request, invoking `progress` with a
/// completion fraction in `(0, 1]` after each finished row.
///
/// Pure function of the request: no state survives between runs, so a host
/// may discard a stale computation and start a fresh one at any time.
pub fn compute_exposure_grid<F>(
    request: &GridRequest,
    mut progress: F,
) -> Result<ExposureGrid, EngineError>
where
    F: FnMut(f64),
{
    validate_request(request)?;
    let started = Instant::now();

    let bounds = &request.bounds;
    let config = &request.config;
    // Garden-scale bounds: one sun position per instant serves every cell
    let coords = bounds.center();

    let obstacles: Vec<Obstacle> = request
        .obstacles
        .iter()
        .map(|geo| geo.to_local(bounds))
        .collect::<Result<_, _>>()?;

    let days: Vec<DaySamples> = request
        .date_range
        .map(|date| prepare_day(&coords, date, &obstacles, request.slope.as_ref(), config))
        .collect();
    let sample_days_used = days.len();

    let unshaded_average =
        days.iter().map(|d| d.unshaded_hours).sum::<f64>() / sample_days_used as f64;

    let reaches: Vec<(Point, f64)> = obstacles
        .iter()
        .map(|o| (o.position(), o.max_shadow_reach(config)))
        .collect();

    let mut values = Vec::with_capacity(request.width * request.height);

    for row in 0..request.height {
        for col in 0..request.width {
            let point = bounds.cell_center(row, col, request.width, request.height);

            // Cells no shadow can reach all share the unobstructed value
            let reachable = reaches
                .iter()
                .any(|(pos, reach)| point.distance_to(pos) <= *reach);

            let value = if reachable {
                days.iter().map(|day| cell_day_hours(&point, day, config)).sum::<f64>()
                    / sample_days_used as f64
            } else {
                unshaded_average
            };

            values.push(value);
        }

        progress((row + 1) as f64 / request.height as f64);
    }

    let resolution = (bounds.width_meters() / request.width as f64
        + bounds.height_meters() / request.height as f64)
        / 2.0;

    Ok(ExposureGrid {
        bounds: *bounds,
        width: request.width,
        height: request.height,
        resolution,
        values,
        date_range: request.date_range,
        sample_days_used,
        compute_time_ms: started.elapsed().as_millis() as u64,
    })
}

/// Upper bound on any grid value: the longest theoretical day in the
/// sampled range. Used by hosts to scale heatmap color ramps.
pub fn max_possible_daylight_hours(coords: &Coordinates, range: &DateRange) -> f64 {
    range
        .map(|date| solar::solar_day(coords, date).day_length_hours())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::ObstacleType;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn garden_bounds() -> GridBounds {
        // Roughly 55 x 78 meters in Portland
        GridBounds::new(45.515, 45.5155, -122.679, -122.678).unwrap()
    }

    fn oak_in_center() -> GeoObstacle {
        GeoObstacle {
            id: "oak".to_string(),
            obstacle_type: ObstacleType::EvergreenTree,
            latitude: 45.51525,
            longitude: -122.6785,
            height: 12.0,
            width: 8.0,
            direction: None,
        }
    }

    fn request(obstacles: Vec<GeoObstacle>, step: SampleStep) -> GridRequest {
        GridRequest {
            bounds: garden_bounds(),
            width: 6,
            height: 5,
            obstacles,
            date_range: DateRange::with_step(ymd(2024, 6, 1), ymd(2024, 6, 28), step).unwrap(),
            slope: None,
            config: EngineConfig::default(),
        }
    }

    #[test]
    fn test_grid_shape_and_bounds() {
        let req = request(vec![oak_in_center()], SampleStep::Weekly);
        let grid = compute_exposure_grid(&req, |_| {}).unwrap();

        assert_eq!(grid.values.len(), grid.width * grid.height);
        assert_eq!(grid.sample_days_used, 4);

        let coords = req.bounds.center();
        let ceiling = max_possible_daylight_hours(&coords, &req.date_range);
        for value in &grid.values {
            assert!(*value >= 0.0, "negative exposure {}", value);
            assert!(
                *value <= ceiling + 0.5,
                "exposure {} exceeds longest day {}",
                value,
                ceiling
            );
        }
    }

    #[test]
    fn test_progress_reported_per_row_in_order() {
        let req = request(vec![], SampleStep::Weekly);
        let mut reports = Vec::new();
        compute_exposure_grid(&req, |p| reports.push(p)).unwrap();

        assert_eq!(reports.len(), req.height);
        for pair in reports.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!((reports.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tree_darkens_nearby_cells() {
        let shaded_req = request(vec![oak_in_center()], SampleStep::Weekly);
        let open_req = request(vec![], SampleStep::Weekly);

        let shaded = compute_exposure_grid(&shaded_req, |_| {}).unwrap();
        let open = compute_exposure_grid(&open_req, |_| {}).unwrap();

        // With no obstacles every cell sees the same sky
        let first = open.values[0];
        assert!(open.values.iter().all(|v| (v - first).abs() < 1e-9));

        // The tree must cost at least one cell some hours, and can never
        // add any
        let mut any_darker = false;
        for (s, o) in shaded.values.iter().zip(open.values.iter()) {
            assert!(s <= &(o + 1e-9));
            if o - s > 0.1 {
                any_darker = true;
            }
        }
        assert!(any_darker, "tree shadow should darken at least one cell");
    }

    #[test]
    fn test_grid_is_deterministic_across_runs() {
        let req = request(vec![oak_in_center()], SampleStep::Weekly);

        let a = compute_exposure_grid(&req, |_| {}).unwrap();
        let b = compute_exposure_grid(&req, |_| {}).unwrap();
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let mut req = request(vec![], SampleStep::Weekly);
        req.width = 0;
        assert!(compute_exposure_grid(&req, |_| {}).is_err());

        let mut req = request(vec![], SampleStep::Weekly);
        req.height = MAX_GRID_AXIS + 1;
        assert!(compute_exposure_grid(&req, |_| {}).is_err());
    }

    #[test]
    fn test_day_subsampling_recorded() {
        let daily = request(vec![], SampleStep::Daily);
        let weekly = request(vec![], SampleStep::Weekly);

        let daily_grid = compute_exposure_grid(&daily, |_| {}).unwrap();
        let weekly_grid = compute_exposure_grid(&weekly, |_| {}).unwrap();

        assert_eq!(daily_grid.sample_days_used, 28);
        assert_eq!(weekly_grid.sample_days_used, 4);

        // June days barely differ, so the subsampled average stays close
        assert!((daily_grid.values[0] - weekly_grid.values[0]).abs() < 0.5);
    }
}
