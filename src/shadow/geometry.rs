use crate::coords::Point;

/// Ray-casting point-in-polygon test over a closed ring.
///
/// The ring may be given with or without a repeated closing vertex; edges
/// wrap from the last vertex back to the first either way. Points exactly
/// on an edge count as inside, which keeps observation points sitting on a
/// shadow boundary shaded rather than flickering.
pub fn point_in_polygon(point: &Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let a = &ring[i];
        let b = &ring[j];

        if on_segment(point, a, b) {
            return true;
        }

        if (a.y > point.y) != (b.y > point.y) {
            let intersect_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < intersect_x {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// Collinear with the segment and within its bounding box, horizontal
/// edges included.
fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > 1e-9 {
        return false;
    }

    p.x >= a.x.min(b.x) - 1e-9
        && p.x <= a.x.max(b.x) + 1e-9
        && p.y >= a.y.min(b.y) - 1e-9
        && p.y <= a.y.max(b.y) + 1e-9
}

fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull via Andrew's monotone chain, counter-clockwise, no
/// repeated closing vertex. Collinear boundary points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| (a.x - b.x).abs() < 1e-12 && (a.y - b.y).abs() < 1e-12);

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::new();
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_inside_square() {
        assert!(point_in_polygon(&Point::new(5.0, 5.0), &square()));
        assert!(point_in_polygon(&Point::new(0.1, 9.9), &square()));
    }

    #[test]
    fn test_point_outside_square() {
        assert!(!point_in_polygon(&Point::new(-1.0, 5.0), &square()));
        assert!(!point_in_polygon(&Point::new(11.0, 5.0), &square()));
        assert!(!point_in_polygon(&Point::new(5.0, 10.5), &square()));
    }

    #[test]
    fn test_point_on_edge_counts_inside() {
        let ring = square();
        // Horizontal edges
        assert!(point_in_polygon(&Point::new(5.0, 0.0), &ring));
        assert!(point_in_polygon(&Point::new(5.0, 10.0), &ring));
        // Vertical edges and a corner
        assert!(point_in_polygon(&Point::new(0.0, 5.0), &ring));
        assert!(point_in_polygon(&Point::new(10.0, 10.0), &ring));
        // Collinear with an edge but beyond its endpoints
        assert!(!point_in_polygon(&Point::new(11.0, 10.0), &ring));
        assert!(!point_in_polygon(&Point::new(-0.5, 0.0), &ring));
    }

    #[test]
    fn test_point_in_triangle() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ];
        assert!(point_in_polygon(&Point::new(2.0, 1.0), &triangle));
        assert!(!point_in_polygon(&Point::new(0.1, 2.9), &triangle));
    }

    #[test]
    fn test_degenerate_ring_is_never_inside() {
        let segment = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(!point_in_polygon(&Point::new(0.5, 0.5), &segment));
        assert!(!point_in_polygon(&Point::new(0.5, 0.5), &[]));
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let mut points = square();
        points.push(Point::new(5.0, 5.0));
        points.push(Point::new(2.0, 3.0));

        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        for corner in square() {
            assert!(hull.iter().any(|p| p.distance_to(&corner) < 1e-9));
        }
    }

    #[test]
    fn test_convex_hull_of_translated_square_union() {
        // A square and its copy shifted along a diagonal hull to a hexagon
        let mut points = square();
        points.extend(square().iter().map(|p| Point::new(p.x + 5.0, p.y + 5.0)));

        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 6);
    }
}
