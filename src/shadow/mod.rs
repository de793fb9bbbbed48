//! Shadow silhouette projection onto the ground plane.
//!
//! Each obstacle shape has its own silhouette policy: trees cast a tapered
//! canopy ribbon, buildings the hull of footprint plus translated roof
//! outline, fences and hedges a thin wall ribbon. Shadow length is
//! `height / tan(effective altitude)` clamped to a configured maximum so a
//! near-horizon sun does not blow polygons up to infinity.

use serde::{Deserialize, Serialize};

use crate::bounds::GridBounds;
use crate::config::{EngineConfig, EngineError};
use crate::coords::Point;
use crate::slope::{PlotSlope, adjust_for_slope_with_threshold};
use crate::solar::SolarPosition;

pub mod geometry;
pub use geometry::{convex_hull, point_in_polygon};

/// Fraction of the canopy radius kept at the far end of a tree shadow,
/// approximating the rounded crown.
const CANOPY_TAPER: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleType {
    #[serde(rename = "deciduous-tree")]
    DeciduousTree,
    #[serde(rename = "evergreen-tree")]
    EvergreenTree,
    #[serde(rename = "building")]
    Building,
    #[serde(rename = "fence")]
    Fence,
    #[serde(rename = "hedge")]
    Hedge,
}

/// Obstacle geometry, positioned in meters relative to the observation
/// origin. Linear obstacles carry the compass bearing their wall runs
/// perpendicular to (the direction the wall faces).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ObstacleKind {
    DeciduousTree {
        position: Point,
        height: f64,
        canopy_diameter: f64,
    },
    EvergreenTree {
        position: Point,
        height: f64,
        canopy_diameter: f64,
    },
    Building {
        position: Point,
        height: f64,
        width: f64,
    },
    Fence {
        position: Point,
        height: f64,
        width: f64,
        direction: f64,
    },
    Hedge {
        position: Point,
        height: f64,
        width: f64,
        direction: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: String,
    #[serde(flatten)]
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn obstacle_type(&self) -> ObstacleType {
        match self.kind {
            ObstacleKind::DeciduousTree { .. } => ObstacleType::DeciduousTree,
            ObstacleKind::EvergreenTree { .. } => ObstacleType::EvergreenTree,
            ObstacleKind::Building { .. } => ObstacleType::Building,
            ObstacleKind::Fence { .. } => ObstacleType::Fence,
            ObstacleKind::Hedge { .. } => ObstacleType::Hedge,
        }
    }

    pub fn position(&self) -> Point {
        match self.kind {
            ObstacleKind::DeciduousTree { position, .. }
            | ObstacleKind::EvergreenTree { position, .. }
            | ObstacleKind::Building { position, .. }
            | ObstacleKind::Fence { position, .. }
            | ObstacleKind::Hedge { position, .. } => position,
        }
    }

    pub fn height(&self) -> f64 {
        match self.kind {
            ObstacleKind::DeciduousTree { height, .. }
            | ObstacleKind::EvergreenTree { height, .. }
            | ObstacleKind::Building { height, .. }
            | ObstacleKind::Fence { height, .. }
            | ObstacleKind::Hedge { height, .. } => height,
        }
    }

    pub fn width(&self) -> f64 {
        match self.kind {
            ObstacleKind::DeciduousTree {
                canopy_diameter, ..
            }
            | ObstacleKind::EvergreenTree {
                canopy_diameter, ..
            } => canopy_diameter,
            ObstacleKind::Building { width, .. }
            | ObstacleKind::Fence { width, .. }
            | ObstacleKind::Hedge { width, .. } => width,
        }
    }

    /// Zero-size obstacles legitimately cast no shadow.
    pub fn is_degenerate(&self) -> bool {
        self.height() <= 0.0 || self.width() <= 0.0
    }

    /// Farthest distance from the obstacle position any of its shadow
    /// points can reach, used by the grid cell-skip.
    pub fn max_shadow_reach(&self, config: &EngineConfig) -> f64 {
        config.max_shadow_length_m() + self.width()
    }
}

/// Map-integrated obstacle variant: lat/lng position plus flat shape
/// fields, as produced by a map picker. Converted into a local-meter
/// [`Obstacle`] relative to a bounds origin before projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObstacle {
    pub id: String,
    #[serde(rename = "type")]
    pub obstacle_type: ObstacleType,
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
    pub width: f64,
    #[serde(default)]
    pub direction: Option<f64>,
}

impl GeoObstacle {
    pub fn to_local(&self, bounds: &GridBounds) -> Result<Obstacle, EngineError> {
        let position = bounds.to_local(self.latitude, self.longitude);
        let direction = self.direction.unwrap_or(0.0);

        let kind = match self.obstacle_type {
            ObstacleType::DeciduousTree => ObstacleKind::DeciduousTree {
                position,
                height: self.height,
                canopy_diameter: self.width,
            },
            ObstacleType::EvergreenTree => ObstacleKind::EvergreenTree {
                position,
                height: self.height,
                canopy_diameter: self.width,
            },
            ObstacleType::Building => ObstacleKind::Building {
                position,
                height: self.height,
                width: self.width,
            },
            ObstacleType::Fence => ObstacleKind::Fence {
                position,
                height: self.height,
                width: self.width,
                direction,
            },
            ObstacleType::Hedge => ObstacleKind::Hedge {
                position,
                height: self.height,
                width: self.width,
                direction,
            },
        };

        Ok(Obstacle {
            id: self.id.clone(),
            kind,
        })
    }
}

/// Ground-plane shadow as a closed ring of points, tagged with the casting
/// obstacle and its opacity. Produced fresh on every query; the engine
/// never caches these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolygon {
    pub points: Vec<Point>,
    pub obstacle_id: String,
    pub obstacle_type: ObstacleType,
    pub shade_intensity: f64,
}

impl ShadowPolygon {
    pub fn contains(&self, point: &Point) -> bool {
        point_in_polygon(point, &self.points)
    }
}

/// Unit vector for a compass bearing, in the east/north ground frame.
fn bearing_vector(bearing_deg: f64) -> (f64, f64) {
    let rad = bearing_deg.to_radians();
    (rad.sin(), rad.cos())
}

fn translate(p: Point, ux: f64, uy: f64, distance: f64) -> Point {
    Point::new(p.x + ux * distance, p.y + uy * distance)
}

/// Project one obstacle's shadow for a sun position onto the (possibly
/// tilted) ground plane. `None` when the sun is at or below the horizon or
/// the obstacle has degenerate geometry.
pub fn shadow_polygon(
    obstacle: &Obstacle,
    sun: &SolarPosition,
    slope: Option<&PlotSlope>,
    config: &EngineConfig,
) -> Option<ShadowPolygon> {
    if obstacle.is_degenerate() {
        return None;
    }

    let effective_altitude = match slope {
        Some(slope) => {
            adjust_for_slope_with_threshold(slope, sun, config.slope_threshold_deg())
                .effective_altitude
        }
        None => sun.altitude,
    };

    if effective_altitude <= 0.0 {
        return None;
    }

    let length = (obstacle.height() / effective_altitude.to_radians().tan())
        .min(config.max_shadow_length_m());

    let shadow_bearing = (sun.azimuth + 180.0).rem_euclid(360.0);
    let (ux, uy) = bearing_vector(shadow_bearing);
    // Perpendicular to the shadow direction
    let (px, py) = (uy, -ux);

    let intensities = config.shade_intensities();

    let (points, shade_intensity) = match obstacle.kind {
        ObstacleKind::DeciduousTree {
            position,
            canopy_diameter,
            ..
        } => (
            tree_ring(position, canopy_diameter / 2.0, length, ux, uy, px, py),
            intensities.deciduous_tree,
        ),
        ObstacleKind::EvergreenTree {
            position,
            canopy_diameter,
            ..
        } => (
            tree_ring(position, canopy_diameter / 2.0, length, ux, uy, px, py),
            intensities.evergreen_tree,
        ),
        ObstacleKind::Building {
            position, width, ..
        } => (
            building_ring(position, width, length, ux, uy),
            intensities.building,
        ),
        ObstacleKind::Fence {
            position,
            width,
            direction,
            ..
        } => (
            wall_ring(position, width, direction, length, ux, uy),
            intensities.fence,
        ),
        ObstacleKind::Hedge {
            position,
            width,
            direction,
            ..
        } => (
            wall_ring(position, width, direction, length, ux, uy),
            intensities.hedge,
        ),
    };

    Some(ShadowPolygon {
        points,
        obstacle_id: obstacle.id.clone(),
        obstacle_type: obstacle.obstacle_type(),
        shade_intensity,
    })
}

/// Shadows of every obstacle in the slice, skipping those that cast none.
pub fn all_shadows(
    obstacles: &[Obstacle],
    sun: &SolarPosition,
    slope: Option<&PlotSlope>,
    config: &EngineConfig,
) -> Vec<ShadowPolygon> {
    obstacles
        .iter()
        .filter_map(|obstacle| shadow_polygon(obstacle, sun, slope, config))
        .collect()
}

/// Tapered ribbon from the trunk base to the crown-top projection. The far
/// end narrows to [`CANOPY_TAPER`] of the canopy radius and a tip vertex
/// rounds off the crown.
fn tree_ring(
    position: Point,
    radius: f64,
    length: f64,
    ux: f64,
    uy: f64,
    px: f64,
    py: f64,
) -> Vec<Point> {
    let far_radius = radius * CANOPY_TAPER;
    let far = translate(position, ux, uy, length);
    let tip = translate(position, ux, uy, length + far_radius);

    vec![
        translate(position, px, py, -radius),
        translate(position, px, py, radius),
        translate(far, px, py, far_radius),
        tip,
        translate(far, px, py, -far_radius),
    ]
}

/// Convex hull of the square footprint and the roof outline translated
/// along the shadow vector.
fn building_ring(position: Point, width: f64, length: f64, ux: f64, uy: f64) -> Vec<Point> {
    let half = width / 2.0;
    let footprint = [
        Point::new(position.x - half, position.y - half),
        Point::new(position.x + half, position.y - half),
        Point::new(position.x + half, position.y + half),
        Point::new(position.x - half, position.y + half),
    ];

    let mut corners: Vec<Point> = footprint.to_vec();
    corners.extend(footprint.iter().map(|c| translate(*c, ux, uy, length)));

    convex_hull(&corners)
}

/// Thin wall ribbon: the wall segment runs perpendicular to the bearing it
/// faces, and the shadow offsets it by the shadow vector.
fn wall_ring(
    position: Point,
    width: f64,
    direction: f64,
    length: f64,
    ux: f64,
    uy: f64,
) -> Vec<Point> {
    let (wx, wy) = bearing_vector((direction + 90.0).rem_euclid(360.0));
    let half = width / 2.0;

    let start = translate(position, wx, wy, -half);
    let end = translate(position, wx, wy, half);

    vec![
        start,
        end,
        translate(end, ux, uy, length),
        translate(start, ux, uy, length),
    ]
}
