//! Distance, projection, intersection and clipping helpers.
//!
//! These are pure functions over [`Point`]s. Mesh-aware wrappers that take
//! edge handles live in [`crate::core::queries`].

#![forbid(unsafe_code)]

use crate::geometry::point::Point;

// =============================================================================
// DISTANCES AND PROJECTION
// =============================================================================

/// Squared distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance to `a` when `a == b`.
#[must_use]
pub fn distance_squared_point_to_line(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance_squared(a);
    }
    let cross = ab.cross(p - a);
    cross * cross / len2
}

/// Squared distance from `p` to the closed segment `[a, b]`.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::geometry::point::Point;
/// use cdt_mesh::geometry::util::distance_squared_point_to_segment;
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(10.0, 0.0);
/// assert_eq!(distance_squared_point_to_segment(Point::new(5.0, 3.0), a, b), 9.0);
/// assert_eq!(distance_squared_point_to_segment(Point::new(13.0, 4.0), a, b), 25.0);
/// ```
#[must_use]
pub fn distance_squared_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance_squared(a.lerp(b, t))
}

/// Orthogonal projection of `p` onto the line through `a` and `b`.
#[must_use]
pub fn project_orthogonally(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a;
    }
    a.lerp(b, (p - a).dot(ab) / len2)
}

// =============================================================================
// INTERSECTIONS
// =============================================================================

/// Intersection point of segments `[a1, a2]` and `[b1, b2]`.
///
/// Endpoints count as part of the segments. Parallel segments, including
/// overlapping collinear ones, report no intersection.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::geometry::point::Point;
/// use cdt_mesh::geometry::util::segment_intersection;
///
/// let hit = segment_intersection(
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 10.0),
///     Point::new(0.0, 10.0),
///     Point::new(10.0, 0.0),
/// );
/// assert_eq!(hit, Some(Point::new(5.0, 5.0)));
/// ```
#[must_use]
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let (t, u) = line_parameters(a1, a2, b1, b2)?;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| a1.lerp(a2, t))
}

/// Intersection point of the infinite lines through `(a1, a2)` and `(b1, b2)`.
#[must_use]
pub fn line_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let (t, _) = line_parameters(a1, a2, b1, b2)?;
    let hit = a1.lerp(a2, t);
    hit.is_finite().then_some(hit)
}

/// Parameters `(t, u)` with `a1 + t (a2 - a1) == b1 + u (b2 - b1)`.
fn line_parameters(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<(f64, f64)> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom == 0.0 {
        return None;
    }
    let qp = b1 - a1;
    Some((qp.cross(s) / denom, qp.cross(r) / denom))
}

/// Whether the closed segment `[a, b]` comes within `radius` of `center`.
#[must_use]
pub fn segment_intersects_circle(a: Point, b: Point, center: Point, radius: f64) -> bool {
    distance_squared_point_to_segment(center, a, b) <= radius * radius
}

// =============================================================================
// CLIPPING
// =============================================================================

/// Clips segment `[a, b]` to the axis-aligned rectangle `[min, max]`
/// (Liang–Barsky).
///
/// Returns `None` when no part of the segment lies inside the rectangle.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::geometry::point::Point;
/// use cdt_mesh::geometry::util::clip_segment_to_rect;
///
/// let min = Point::new(0.0, 0.0);
/// let max = Point::new(100.0, 100.0);
/// let (p, q) = clip_segment_to_rect(Point::new(-50.0, 50.0), Point::new(50.0, 50.0), min, max).unwrap();
/// assert_eq!(p, Point::new(0.0, 50.0));
/// assert_eq!(q, Point::new(50.0, 50.0));
/// assert!(clip_segment_to_rect(Point::new(-5.0, -5.0), Point::new(-1.0, 200.0), min, max).is_none());
/// ```
#[must_use]
pub fn clip_segment_to_rect(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    let d = b - a;
    let checks = [
        (-d.x(), a.x() - min.x()),
        (d.x(), max.x() - a.x()),
        (-d.y(), a.y() - min.y()),
        (d.y(), max.y() - a.y()),
    ];

    let mut t_min = 0.0_f64;
    let mut t_max = 1.0_f64;
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t_min = t_min.max(t);
        } else {
            t_max = t_max.min(t);
        }
    }

    if t_min > t_max {
        return None;
    }
    Some((a.lerp(b, t_min), a.lerp(b, t_max)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_distance_ignores_segment_extent() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let p = Point::new(50.0, 2.0);
        assert_relative_eq!(distance_squared_point_to_line(p, a, b), 4.0);
        assert_relative_eq!(distance_squared_point_to_segment(p, a, b), 49.0 * 49.0 + 4.0);
    }

    #[test]
    fn degenerate_segment_distance_is_point_distance() {
        let a = Point::new(1.0, 1.0);
        let p = Point::new(4.0, 5.0);
        assert_relative_eq!(distance_squared_point_to_line(p, a, a), 25.0);
        assert_relative_eq!(distance_squared_point_to_segment(p, a, a), 25.0);
        assert_eq!(project_orthogonally(p, a, a), a);
    }

    #[test]
    fn projection_lands_on_line() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let projected = project_orthogonally(Point::new(0.0, 10.0), a, b);
        assert_relative_eq!(projected.x(), 5.0);
        assert_relative_eq!(projected.y(), 5.0);
    }

    #[test]
    fn segment_intersection_includes_endpoints() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, -1.0),
            Point::new(2.0, 1.0),
        );
        assert_eq!(hit, Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn segment_intersection_misses() {
        // Lines cross, segments do not.
        assert!(
            segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(5.0, -1.0),
                Point::new(5.0, 1.0),
            )
            .is_none()
        );
        // Parallel.
        assert!(
            segment_intersection(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
            )
            .is_none()
        );
    }

    #[test]
    fn line_intersection_extends_segments() {
        let hit = line_intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, -1.0),
            Point::new(5.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x(), 5.0);
        assert_relative_eq!(hit.y(), 0.0);
    }

    #[test]
    fn circle_segment_test() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(segment_intersects_circle(a, b, Point::new(5.0, 2.0), 2.5));
        assert!(!segment_intersects_circle(a, b, Point::new(5.0, 2.0), 1.5));
        assert!(!segment_intersects_circle(a, b, Point::new(13.0, 0.0), 2.0));
    }

    #[test]
    fn clip_keeps_inside_segment_untouched() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(10.0, 10.0);
        let (p, q) =
            clip_segment_to_rect(Point::new(1.0, 1.0), Point::new(9.0, 2.0), min, max).unwrap();
        assert_eq!(p, Point::new(1.0, 1.0));
        assert_eq!(q, Point::new(9.0, 2.0));
    }

    #[test]
    fn clip_crossing_segment() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(10.0, 10.0);
        let (p, q) =
            clip_segment_to_rect(Point::new(-10.0, 5.0), Point::new(20.0, 5.0), min, max).unwrap();
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(q.x(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.y(), 5.0);
        assert_relative_eq!(q.y(), 5.0);
    }

    #[test]
    fn clip_rejects_outside_parallel_segment() {
        let min = Point::new(0.0, 0.0);
        let max = Point::new(10.0, 10.0);
        assert!(clip_segment_to_rect(Point::new(-1.0, -3.0), Point::new(20.0, -3.0), min, max).is_none());
    }
}
