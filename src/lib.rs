//! sunplot: solar geometry and shadow/exposure engine.
//!
//! Pure computation library answering "how much direct sun does this spot
//! get": sun-position astronomy, per-obstacle shadow projection onto a
//! (possibly tilted) ground plane, daily and seasonal sun-hour integration,
//! and spatial exposure grids for heatmap rendering. No rendering, no I/O,
//! no internal state; callers own all caching decisions.

pub mod bounds;
pub mod config;
pub mod coords;
pub mod daily;
pub mod grid;
pub mod seasonal;
pub mod shadow;
pub mod slope;
pub mod solar;

pub use bounds::GridBounds;
pub use config::{DateRange, EngineConfig, EngineError, SampleStep, ShadeIntensities};
pub use coords::{Coordinates, Point};
pub use daily::{
    DailySunData, DailySunDataWithShade, ObstacleShade, daily_sun_hours,
    daily_sun_hours_with_shade,
};
pub use grid::{
    ExposureGrid, GridRequest, compute_exposure_grid, max_possible_daylight_hours,
    worker::{GridWorker, WorkerRequest, WorkerResponse, spawn_grid_worker},
};
pub use seasonal::{
    SeasonalSummary, annual_summary, monthly_summary, seasonal_summary, yearly_summary,
};
pub use shadow::{
    GeoObstacle, Obstacle, ObstacleKind, ObstacleType, ShadowPolygon, all_shadows, shadow_polygon,
};
pub use slope::{PlotSlope, SlopeAdjusted, adjust_for_slope};
pub use solar::{PolarCondition, SolarDay, SolarPosition, solar_day, solar_noon, sun_position};
