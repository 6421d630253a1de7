//! Orientation and circumcircle predicates for planar triangles.
//!
//! All predicates use plain `f64` arithmetic. Where a tolerance is needed it
//! is expressed in squared distance units through [`EPSILON_SQUARED`], so a
//! point closer than [`EPSILON`] to a line counts as lying on it.

#![forbid(unsafe_code)]

use crate::geometry::point::Point;
use crate::geometry::util::distance_squared_point_to_line;
use std::fmt;

/// Distance under which two positions are considered coincident.
pub const EPSILON: f64 = 0.01;

/// [`EPSILON`] squared, used by every distance comparison in the crate.
pub const EPSILON_SQUARED: f64 = 0.0001;

/// Position of a point relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The point lies to the right of the line.
    RIGHT,
    /// The point lies on the line.
    ON,
    /// The point lies to the left of the line.
    LEFT,
}

impl Side {
    /// Signed integer form: `-1` right, `0` on, `1` left.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::RIGHT => -1,
            Self::ON => 0,
            Self::LEFT => 1,
        }
    }

    /// Returns `true` unless the point is strictly to the right.
    #[must_use]
    pub const fn is_left_or_on(self) -> bool {
        !matches!(self, Self::RIGHT)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RIGHT => write!(f, "RIGHT"),
            Self::ON => write!(f, "ON"),
            Self::LEFT => write!(f, "LEFT"),
        }
    }
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive when the triangle is counter-clockwise.
#[must_use]
#[inline]
pub fn orient2d(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Exact side of `p` relative to the directed line `a -> b`.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::geometry::point::Point;
/// use cdt_mesh::geometry::predicates::{Side, side_of_line};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(10.0, 0.0);
/// assert_eq!(side_of_line(Point::new(5.0, 1.0), a, b), Side::LEFT);
/// assert_eq!(side_of_line(Point::new(5.0, -1.0), a, b), Side::RIGHT);
/// assert_eq!(side_of_line(Point::new(20.0, 0.0), a, b), Side::ON);
/// ```
#[must_use]
pub fn side_of_line(p: Point, a: Point, b: Point) -> Side {
    let det = orient2d(a, b, p);
    if det > 0.0 {
        Side::LEFT
    } else if det < 0.0 {
        Side::RIGHT
    } else {
        Side::ON
    }
}

/// Side of `p` relative to `a -> b`, reporting [`Side::ON`] for points within
/// [`EPSILON`] of the supporting line.
#[must_use]
pub fn side_of_line_with_tolerance(p: Point, a: Point, b: Point) -> Side {
    if distance_squared_point_to_line(p, a, b) <= EPSILON_SQUARED {
        Side::ON
    } else {
        side_of_line(p, a, b)
    }
}

/// Centre of the circle through `a`, `b` and `c`.
///
/// Returns `None` for collinear input, where the circle degenerates to a line.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::geometry::point::Point;
/// use cdt_mesh::geometry::predicates::circumcenter;
///
/// let c = circumcenter(
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(0.0, 2.0),
/// )
/// .unwrap();
/// assert_eq!(c, Point::new(1.0, 1.0));
/// assert!(circumcenter(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)).is_none());
/// ```
#[must_use]
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.cross(ac);
    if d == 0.0 {
        return None;
    }
    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let ux = ac.y().mul_add(ab2, -(ab.y() * ac2)) / d;
    let uy = ab.x().mul_add(ac2, -(ac.x() * ab2)) / d;
    let center = Point::new(a.x() + ux, a.y() + uy);
    center.is_finite().then_some(center)
}

/// Whether `p` lies strictly inside the circumcircle of `(a, b, c)` by more
/// than the squared tolerance `slack`.
///
/// A degenerate triangle has no bounded circumcircle and contains nothing.
#[must_use]
pub fn circumcircle_contains(a: Point, b: Point, c: Point, p: Point, slack: f64) -> bool {
    circumcenter(a, b, c).is_some_and(|center| {
        p.distance_squared(center) < a.distance_squared(center) - slack
    })
}

// =============================================================================
// TESTS
// =============================================================================
