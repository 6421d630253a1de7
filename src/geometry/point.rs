//! Planar points and the small amount of vector arithmetic the mesh needs.
//!
//! A [`Point`] doubles as a 2D vector: subtracting two points yields the
//! displacement between them, and [`Point::cross`] / [`Point::dot`] operate on
//! those displacements. Coordinates use the usual mathematical orientation
//! (y grows upwards), so a positive cross product means "to the left".
//!
//! # Examples
//!
//! ```rust
//! use cdt_mesh::geometry::point::Point;
//!
//! let a = Point::new(1.0, 2.0);
//! let b = Point::new(4.0, 6.0);
//! assert_eq!(a.distance_squared(b), 25.0);
//! assert_eq!((b - a).cross(Point::new(0.0, 1.0)), 3.0);
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A position (or displacement) in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The x coordinate.
    #[must_use]
    #[inline]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[must_use]
    #[inline]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Both coordinates as an array.
    #[must_use]
    #[inline]
    pub const fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Returns `true` if neither coordinate is NaN or infinite.
    #[must_use]
    #[inline]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean norm of the point seen as a vector.
    #[must_use]
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x.mul_add(self.x, self.y * self.y)
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    #[inline]
    pub fn distance_squared(self, other: Self) -> f64 {
        (other - self).length_squared()
    }

    /// Dot product of two vectors.
    #[must_use]
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Z component of the 3D cross product of two planar vectors.
    ///
    /// Positive when `other` points to the left of `self`.
    #[must_use]
    #[inline]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// Linear interpolation `self + t * (other - self)`.
    #[must_use]
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Midpoint between two points.
    #[must_use]
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<[f64; 2]> for Point {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords[0], coords[1])
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        point.coords()
    }
}

// =============================================================================
// ARITHMETIC
// =============================================================================

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
