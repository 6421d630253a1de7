//! Point location by walking the triangulation.
//!
//! Classifies a query point as coinciding with a vertex, lying on an edge, or
//! falling inside a face.
//!
//! # Algorithm
//!
//! The walk starts from a face near a hint vertex (the last inserted vertex,
//! or the closest of a small strided sample of vertices) and repeatedly:
//! 1. Tests the point against the three edges of the current face
//! 2. Crosses one edge the point lies strictly to the right of, chosen at
//!    random among the candidates
//! 3. Stops when no such edge remains and classifies the point in that face
//!
//! Choosing at random among the crossable edges makes the walk terminate on
//! any triangulation, Delaunay or not.
//!
//! # References
//!
//! - O. Devillers, S. Pion, and M. Teillaud, "Walking in a Triangulation",
//!   International Journal of Foundations of Computer Science, 2001.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::collections::SmallBuffer;
use crate::core::mesh::{EdgeKey, FaceKey, Mesh, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::Side;

/// Minimum number of faces a walk may visit before giving up.
const MIN_WALK_STEPS: usize = 1000;

/// Walks longer than this are reported at debug level.
const LONG_WALK_STEPS: usize = 50;

/// Result of a point location query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocateResult {
    /// Point is within ε of an existing vertex
    OnVertex(VertexKey),
    /// Point is within ε of an edge, away from its endpoints
    OnEdge(EdgeKey),
    /// Point is strictly inside a face
    InFace(FaceKey),
    /// Point lies beyond the border-closing triangle
    Outside,
}

/// Error during point location.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum LocateError {
    /// Query point has a NaN or infinite coordinate
    #[error("Cannot locate non-finite point {point}")]
    NonFinitePoint {
        /// The rejected point
        point: Point,
    },

    /// No real face was available to start from
    #[error("Invalid starting face: {face:?}")]
    InvalidStartFace {
        /// The face the walk tried to start from
        face: FaceKey,
    },

    /// Walk reached a face whose links are broken
    #[error("Walk hit a broken face {face:?}")]
    DeadEnd {
        /// The face with missing links
        face: FaceKey,
    },

    /// Walk did not converge (numerical degeneracy or a corrupted mesh)
    #[error("Walk did not terminate after {steps} steps")]
    StepLimitExceeded {
        /// Number of steps taken
        steps: usize,
    },
}

/// Locates `point` in `mesh`, starting the walk near `hint` when given.
///
/// # Errors
///
/// Returns [`LocateError`] if the point is not finite or the walk cannot
/// proceed through the mesh.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::core::algorithms::locate::{LocateResult, locate_position};
/// use cdt_mesh::prelude::*;
///
/// let mut mesh = Mesh::new(10.0, 10.0).unwrap();
/// let v = mesh.insert_vertex(Point::new(4.0, 4.0)).unwrap();
///
/// assert_eq!(
///     locate_position(&mesh, Point::new(4.001, 4.0), None).unwrap(),
///     LocateResult::OnVertex(v)
/// );
/// assert!(matches!(
///     locate_position(&mesh, Point::new(8.0, 1.0), Some(v)).unwrap(),
///     LocateResult::InFace(_)
/// ));
/// ```
pub fn locate_position(
    mesh: &Mesh,
    point: Point,
    hint: Option<VertexKey>,
) -> Result<LocateResult, LocateError> {
    if !point.is_finite() {
        return Err(LocateError::NonFinitePoint { point });
    }

    let start = hint
        .and_then(|v| mesh.faces_around(v).first().copied())
        .or_else(|| sample_start_face(mesh, point))
        .or_else(|| {
            mesh.faces()
                .find(|(_, f)| f.is_real())
                .map(|(key, _)| key)
        })
        .ok_or(LocateError::InvalidStartFace {
            face: FaceKey::default(),
        })?;
    if mesh.face(start).is_none() {
        return Err(LocateError::InvalidStartFace { face: start });
    }

    // Seeded from the query so that repeated queries walk the same path.
    let mut rng = StdRng::seed_from_u64(point.x().to_bits() ^ point.y().to_bits().rotate_left(32));
    let max_steps = mesh.number_of_faces().max(MIN_WALK_STEPS);

    let mut face = start;
    for step in 0..max_steps {
        if step == LONG_WALK_STEPS {
            tracing::debug!(%point, ?start, "long point location walk");
        }

        let edges = mesh.face_edges(face).ok_or(LocateError::DeadEnd { face })?;
        let mut crossable = SmallBuffer::<EdgeKey, 3>::new();
        for e in edges {
            match mesh.relative_position(point, e) {
                Some(Side::RIGHT) => crossable.push(e),
                Some(_) => {}
                None => return Err(LocateError::DeadEnd { face }),
            }
        }

        if crossable.is_empty() {
            tracing::trace!(%point, ?face, steps = step, "walk finished");
            return mesh.is_in_face(point, face).ok_or(LocateError::DeadEnd { face });
        }

        let crossing = crossable[rng.random_range(0..crossable.len())];
        let next = mesh
            .right_face(crossing)
            .ok_or(LocateError::DeadEnd { face })?;
        if !mesh.face(next).is_some_and(|f| f.is_real()) {
            return Ok(LocateResult::Outside);
        }
        face = next;
    }

    tracing::warn!(%point, steps = max_steps, "point location walk exceeded its step limit");
    Err(LocateError::StepLimitExceeded { steps: max_steps })
}

/// Real face next to the closest of roughly `n^(1/3)` evenly strided real
/// vertices.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn sample_start_face(mesh: &Mesh, point: Point) -> Option<FaceKey> {
    let n = mesh.number_of_vertices();
    let sample_size = ((n as f64).cbrt().ceil() as usize).max(1);
    let stride = (n / sample_size).max(1);

    mesh.vertices()
        .step_by(stride)
        .filter(|(_, v)| v.is_real())
        .min_by(|(_, a), (_, b)| {
            a.point()
                .distance_squared(point)
                .total_cmp(&b.point().distance_squared(point))
        })
        .and_then(|(key, _)| mesh.faces_around(key).first().copied())
}

impl Mesh {
    /// Locates `point`, starting from the most recently inserted vertex.
    ///
    /// # Errors
    ///
    /// See [`locate_position`].
    pub fn locate_position(&self, point: Point) -> Result<LocateResult, LocateError> {
        locate_position(self, point, self.last_inserted)
    }
}
