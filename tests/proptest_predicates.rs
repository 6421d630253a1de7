//! Property-based tests for planar predicates and geometric helpers.
//!
//! - Orientation sign consistency under vertex permutations
//! - Circumcentre equidistance
//! - Clipping and projection staying inside their targets

use cdt_mesh::geometry::point::Point;
use cdt_mesh::geometry::predicates::{
    EPSILON_SQUARED, Side, circumcenter, circumcircle_contains, orient2d, side_of_line,
    side_of_line_with_tolerance,
};
use cdt_mesh::geometry::util::{
    clip_segment_to_rect, distance_squared_point_to_line, distance_squared_point_to_segment,
    project_orthogonally, segment_intersection,
};
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-1000.0..1000.0).prop_filter("must be finite", |x: &f64| x.is_finite())
}

fn point_2d() -> impl Strategy<Value = Point> {
    (finite_coordinate(), finite_coordinate()).prop_map(|(x, y)| Point::new(x, y))
}

const fn flip(side: Side) -> Side {
    match side {
        Side::LEFT => Side::RIGHT,
        Side::RIGHT => Side::LEFT,
        Side::ON => Side::ON,
    }
}

// =============================================================================
// ORIENTATION PROPERTIES
// =============================================================================

proptest! {
    /// Property: swapping two vertices negates the orientation.
    #[test]
    fn prop_orientation_sign_flip(a in point_2d(), b in point_2d(), c in point_2d()) {
        let abc = orient2d(a, b, c);
        prop_assume!(abc.abs() > 1e-6);
        prop_assert_eq!(abc.signum(), -orient2d(a, c, b).signum());
    }

    /// Property: reversing the line direction flips the side.
    #[test]
    fn prop_side_of_line_antisymmetric(p in point_2d(), a in point_2d(), b in point_2d()) {
        prop_assume!(orient2d(a, b, p).abs() > 1e-6);
        prop_assert_eq!(side_of_line(p, b, a), flip(side_of_line(p, a, b)));
    }

    /// Property: the tolerant test only ever widens ON.
    #[test]
    fn prop_tolerant_side_agrees_off_the_line(p in point_2d(), a in point_2d(), b in point_2d()) {
        let tolerant = side_of_line_with_tolerance(p, a, b);
        if tolerant != Side::ON {
            prop_assert_eq!(tolerant, side_of_line(p, a, b));
        }
    }
}

// =============================================================================
// CIRCUMCIRCLE PROPERTIES
// =============================================================================

proptest! {
    /// Property: the circumcentre is equidistant from all three vertices.
    #[test]
    fn prop_circumcenter_equidistant(a in point_2d(), b in point_2d(), c in point_2d()) {
        prop_assume!(orient2d(a, b, c).abs() > 1.0);
        let center = circumcenter(a, b, c).unwrap();
        let ra = center.distance_squared(a);
        let rb = center.distance_squared(b);
        let rc = center.distance_squared(c);
        let tolerance = 1e-6 * ra.max(1.0);
        prop_assert!((ra - rb).abs() <= tolerance);
        prop_assert!((ra - rc).abs() <= tolerance);
    }

    /// Property: the triangle's own vertices are never strictly inside its
    /// circumcircle.
    #[test]
    fn prop_vertices_not_inside_own_circumcircle(a in point_2d(), b in point_2d(), c in point_2d()) {
        // Well-shaped triangles only, so the radius stays far below the slack.
        prop_assume!(orient2d(a, b, c).abs() > 0.1 * (b - a).length_squared().max((c - a).length_squared()));
        for p in [a, b, c] {
            prop_assert!(!circumcircle_contains(a, b, c, p, EPSILON_SQUARED));
        }
    }
}

// =============================================================================
// SEGMENT HELPER PROPERTIES
// =============================================================================

proptest! {
    /// Property: clipping yields a segment inside the rectangle.
    #[test]
    fn prop_clip_stays_in_rect(a in point_2d(), b in point_2d()) {
        let (min, max) = (Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        if let Some((p, q)) = clip_segment_to_rect(a, b, min, max) {
            for r in [p, q] {
                prop_assert!(r.x() >= -1e-9 && r.x() <= 100.0 + 1e-9);
                prop_assert!(r.y() >= -1e-9 && r.y() <= 100.0 + 1e-9);
            }
        }
    }

    /// Property: the orthogonal projection lies on the supporting line.
    #[test]
    fn prop_projection_on_line(p in point_2d(), a in point_2d(), b in point_2d()) {
        prop_assume!(a.distance_squared(b) > 1.0);
        let q = project_orthogonally(p, a, b);
        prop_assert!(distance_squared_point_to_line(q, a, b) <= 1e-6);
    }

    /// Property: an intersection point lies on both segments.
    #[test]
    fn prop_intersection_on_both_segments(
        a1 in point_2d(), a2 in point_2d(), b1 in point_2d(), b2 in point_2d(),
    ) {
        let (r, s) = (a2 - a1, b2 - b1);
        prop_assume!(r.cross(s).abs() > 1e-3 * (r.length_squared() * s.length_squared()).sqrt());
        if let Some(x) = segment_intersection(a1, a2, b1, b2) {
            prop_assert!(distance_squared_point_to_segment(x, a1, a2) <= 1e-6);
            prop_assert!(distance_squared_point_to_segment(x, b1, b2) <= 1e-6);
        }
    }
}
