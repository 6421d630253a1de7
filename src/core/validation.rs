//! Whole-mesh invariant checks.
//!
//! [`Mesh::is_valid`] walks every entity and verifies the structural
//! invariants the mutating operations maintain; [`Mesh::validate_delaunay`]
//! checks the geometric one. Both are linear in the size of the mesh and meant
//! for tests and debugging, not for hot paths.
//!
//! Errors carry the stable ids of the offending entities.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::core::collections::{FastHashMap, SmallBuffer, fast_hash_map_with_capacity};
use crate::core::mesh::{Mesh, VertexKey};
use crate::geometry::predicates::{EPSILON, EPSILON_SQUARED, orient2d};

/// A broken mesh invariant.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::core::validation::MeshValidationError;
///
/// let err = MeshValidationError::FaceNotTriangle { face: 7 };
/// assert_eq!(err.to_string(), "Face 7 is not bounded by a 3-cycle of half-edges");
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshValidationError {
    /// A record points at an entity that no longer exists.
    #[error("{entity} {id} references a missing {target}")]
    DanglingReference {
        /// Kind of the referencing record.
        entity: &'static str,
        /// Id of the referencing record.
        id: u64,
        /// Kind of the missing entity.
        target: &'static str,
    },

    /// Following `next_left` three times from a face's edge does not return.
    #[error("Face {face} is not bounded by a 3-cycle of half-edges")]
    FaceNotTriangle {
        /// Id of the face.
        face: u64,
    },

    /// A half-edge on a face's cycle names a different left face.
    #[error("Edge {edge} lies on the cycle of face {face} but names another left face")]
    InconsistentLeftFace {
        /// Id of the half-edge.
        edge: u64,
        /// Id of the face whose cycle contains it.
        face: u64,
    },

    /// A real face's corners are not strictly counter-clockwise.
    #[error("Face {face} is inverted or degenerate")]
    InvertedFace {
        /// Id of the face.
        face: u64,
    },

    /// `opposite` is not an involution, or twins share their origin.
    #[error("Edge {edge} and its opposite are not mutual twins")]
    BrokenOpposite {
        /// Id of the half-edge.
        edge: u64,
    },

    /// A vertex's stored edge does not leave that vertex.
    #[error("Vertex {vertex} stores an edge that does not leave it")]
    InvalidVertexEdge {
        /// Id of the vertex.
        vertex: u64,
    },

    /// A segment's edges do not form a contiguous chain.
    #[error("Constraint segment {segment} has a broken edge chain")]
    BrokenConstraintChain {
        /// Id of the segment.
        segment: u64,
    },

    /// A segment and an edge or vertex disagree about ownership.
    #[error("Constraint segment {segment} and entity {entity} disagree about ownership")]
    ConstraintOwnershipMismatch {
        /// Id of the segment.
        segment: u64,
        /// Id of the edge or vertex.
        entity: u64,
    },

    /// An edge is constrained without an owning segment, or the reverse.
    #[error("Edge {edge} constrained flag does not match its owning segments")]
    ConstrainedFlagMismatch {
        /// Id of the half-edge.
        edge: u64,
    },

    /// A shape and a segment disagree about membership.
    #[error("Constraint shape {shape} and segment {segment} disagree about membership")]
    ShapeMembershipMismatch {
        /// Id of the shape.
        shape: u64,
        /// Id of the segment.
        segment: u64,
    },

    /// Two vertices lie within ε of each other.
    #[error("Vertices {first} and {second} are closer than ε")]
    DuplicateVertices {
        /// Id of one vertex.
        first: u64,
        /// Id of the other vertex.
        second: u64,
    },

    /// An unconstrained real edge fails the local Delaunay test.
    #[error("Edge {edge} is not locally Delaunay")]
    DelaunayViolation {
        /// Id of the half-edge.
        edge: u64,
    },
}

// =============================================================================
// STRUCTURAL VALIDATION
// =============================================================================

impl Mesh {
    /// Checks every structural invariant of the mesh.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`] found.
    pub fn is_valid(&self) -> Result<(), MeshValidationError> {
        self.validate_faces()?;
        self.validate_edges()?;
        self.validate_vertices()?;
        self.validate_constraints()?;
        self.validate_vertex_spacing()
    }

    /// Checks that every unconstrained real edge is locally Delaunay.
    ///
    /// # Errors
    ///
    /// Returns [`MeshValidationError::DelaunayViolation`] for the first
    /// offending edge.
    pub fn validate_delaunay(&self) -> Result<(), MeshValidationError> {
        for (key, edge) in self.edges() {
            if edge.is_real() && !edge.is_constrained() && !self.is_delaunay(key) {
                return Err(MeshValidationError::DelaunayViolation { edge: edge.id() });
            }
        }
        Ok(())
    }

    fn validate_faces(&self) -> Result<(), MeshValidationError> {
        for (key, face) in self.faces() {
            let dangling = MeshValidationError::DanglingReference {
                entity: "face",
                id: face.id(),
                target: "edge",
            };
            let Some(edges) = self.face_edges(key) else {
                return Err(dangling);
            };
            if self.next_left(edges[2]) != Some(edges[0]) {
                return Err(MeshValidationError::FaceNotTriangle { face: face.id() });
            }
            for e in edges {
                let edge = self.edge(e).ok_or_else(|| dangling.clone())?;
                if edge.left_face() != key {
                    return Err(MeshValidationError::InconsistentLeftFace {
                        edge: edge.id(),
                        face: face.id(),
                    });
                }
            }
            if face.is_real() {
                let [a, b, c] = self.face_vertices(key).ok_or_else(|| dangling.clone())?;
                let corners = (self.vertex_point(a), self.vertex_point(b), self.vertex_point(c));
                let (Some(a), Some(b), Some(c)) = corners else {
                    return Err(dangling);
                };
                if orient2d(a, b, c) <= 0.0 {
                    return Err(MeshValidationError::InvertedFace { face: face.id() });
                }
            }
        }
        Ok(())
    }

    fn validate_edges(&self) -> Result<(), MeshValidationError> {
        for (key, edge) in self.edges() {
            let dangling = |target| MeshValidationError::DanglingReference {
                entity: "edge",
                id: edge.id(),
                target,
            };
            let opposite = self.edge(edge.opposite()).ok_or_else(|| dangling("opposite edge"))?;
            if opposite.opposite() != key || opposite.origin() == edge.origin() {
                return Err(MeshValidationError::BrokenOpposite { edge: edge.id() });
            }
            if self.vertex(edge.origin()).is_none() {
                return Err(dangling("origin vertex"));
            }
            if self.edge(edge.next_left()).is_none() {
                return Err(dangling("next edge"));
            }
            if self.face(edge.left_face()).is_none() {
                return Err(dangling("left face"));
            }
            if edge.is_constrained() == edge.constraint_segments().is_empty() {
                return Err(MeshValidationError::ConstrainedFlagMismatch { edge: edge.id() });
            }
        }
        Ok(())
    }

    fn validate_vertices(&self) -> Result<(), MeshValidationError> {
        for (key, vertex) in self.vertices() {
            match self.edge(vertex.edge()) {
                Some(edge) if edge.origin() == key => {}
                _ => return Err(MeshValidationError::InvalidVertexEdge { vertex: vertex.id() }),
            }
        }
        Ok(())
    }

    fn validate_constraints(&self) -> Result<(), MeshValidationError> {
        for (key, segment) in self.segments() {
            let broken = MeshValidationError::BrokenConstraintChain { segment: segment.id() };
            let chain = segment.edges();
            if chain.is_empty() {
                return Err(broken);
            }
            for pair in chain.windows(2) {
                let reaches = self.destination(pair[0]);
                let leaves = self.edge(pair[1]).map(|e| e.origin());
                if reaches.is_none() || reaches != leaves {
                    return Err(broken);
                }
            }
            for &e in chain {
                let edge = self.edge(e).ok_or_else(|| broken.clone())?;
                let twin = self.edge(edge.opposite()).ok_or_else(|| broken.clone())?;
                for half in [edge, twin] {
                    if !half.constraint_segments().contains(&key) {
                        return Err(MeshValidationError::ConstraintOwnershipMismatch {
                            segment: segment.id(),
                            entity: half.id(),
                        });
                    }
                }
                for v in [Some(edge.origin()), self.destination(e)].into_iter().flatten() {
                    let vertex = self.vertex(v).ok_or_else(|| broken.clone())?;
                    if !vertex.constraint_segments().contains(&key) {
                        return Err(MeshValidationError::ConstraintOwnershipMismatch {
                            segment: segment.id(),
                            entity: vertex.id(),
                        });
                    }
                }
            }
            if let Some(shape_key) = segment.shape() {
                let member = self
                    .shape(shape_key)
                    .is_some_and(|shape| shape.segments().contains(&key));
                if !member {
                    return Err(MeshValidationError::ShapeMembershipMismatch {
                        shape: self.shape(shape_key).map_or(u64::MAX, |s| s.id()),
                        segment: segment.id(),
                    });
                }
            }
        }

        for (key, edge) in self.edges() {
            for &s in edge.constraint_segments() {
                let owns = self.segment(s).is_some_and(|segment| {
                    segment.edges().contains(&key) || segment.edges().contains(&edge.opposite())
                });
                if !owns {
                    return Err(MeshValidationError::ConstraintOwnershipMismatch {
                        segment: self.segment(s).map_or(u64::MAX, |seg| seg.id()),
                        entity: edge.id(),
                    });
                }
            }
        }

        for (key, shape) in self.shapes() {
            for &s in shape.segments() {
                if self.segment(s).and_then(|seg| seg.shape()) != Some(key) {
                    return Err(MeshValidationError::ShapeMembershipMismatch {
                        shape: shape.id(),
                        segment: self.segment(s).map_or(u64::MAX, |seg| seg.id()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Buckets vertices into an ε grid and compares each with its
    /// neighbouring cells.
    #[allow(clippy::cast_possible_truncation)]
    fn validate_vertex_spacing(&self) -> Result<(), MeshValidationError> {
        let cell = |x: f64| (x / EPSILON).floor() as i64;
        let mut grid: FastHashMap<(i64, i64), SmallBuffer<VertexKey, 4>> =
            fast_hash_map_with_capacity(self.number_of_vertices());

        for (key, vertex) in self.vertices() {
            let p = vertex.point();
            let (cx, cy) = (cell(p.x()), cell(p.y()));
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &other in bucket {
                        let Some(o) = self.vertex(other) else {
                            continue;
                        };
                        if o.point().distance_squared(p) <= EPSILON_SQUARED {
                            return Err(MeshValidationError::DuplicateVertices {
                                first: o.id(),
                                second: vertex.id(),
                            });
                        }
                    }
                }
            }
            grid.entry((cx, cy)).or_default().push(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point;

    #[test]
    fn fresh_and_populated_meshes_are_valid() {
        let mut mesh = Mesh::new(50.0, 50.0).unwrap();
        assert_eq!(mesh.is_valid(), Ok(()));
        for p in [(5.0, 5.0), (45.0, 7.0), (25.0, 40.0), (20.0, 20.0)] {
            mesh.insert_vertex(p.into()).unwrap();
        }
        mesh.insert_constraint_segment(Point::new(2.0, 30.0), Point::new(48.0, 22.0))
            .unwrap();
        assert_eq!(mesh.is_valid(), Ok(()));
        assert_eq!(mesh.validate_delaunay(), Ok(()));
    }

    #[test]
    fn broken_vertex_edge_is_reported() {
        let mut mesh = Mesh::new(50.0, 50.0).unwrap();
        let v = mesh.insert_vertex(Point::new(10.0, 10.0)).unwrap();
        let foreign = mesh
            .edges()
            .find(|(_, e)| e.origin() != v)
            .map(|(k, _)| k)
            .unwrap();
        mesh.set_vertex_edge(v, foreign);
        let id = mesh.vertex(v).unwrap().id();
        assert_eq!(
            mesh.is_valid(),
            Err(MeshValidationError::InvalidVertexEdge { vertex: id })
        );
    }

    #[test]
    fn inverted_face_is_reported() {
        let mut mesh = Mesh::new(10.0, 10.0).unwrap();
        for p in [(1.0, 1.0), (9.0, 1.0), (5.0, 9.0), (5.0, 4.0)] {
            mesh.insert_vertex(p.into()).unwrap();
        }
        assert_eq!(mesh.is_valid(), Ok(()));

        // The spoke from the inner vertex has a reflex quadrilateral, so
        // swapping it folds one triangle over the other.
        let spoke = mesh
            .edges()
            .find(|(e, _)| {
                mesh.edge_points(*e) == Some((Point::new(5.0, 4.0), Point::new(1.0, 1.0)))
            })
            .map(|(e, _)| e)
            .unwrap();
        assert!(!mesh.is_convex(spoke));
        mesh.swap_diagonal(spoke).unwrap();
        assert!(matches!(
            mesh.is_valid(),
            Err(MeshValidationError::InvertedFace { .. })
        ));
    }

    #[test]
    fn close_vertices_are_reported() {
        let mut mesh = Mesh::new(50.0, 50.0).unwrap();
        mesh.add_vertex(Point::new(10.0, 10.0), true);
        mesh.add_vertex(Point::new(10.0, 10.005), true);
        assert!(matches!(
            mesh.validate_vertex_spacing(),
            Err(MeshValidationError::DuplicateVertices { .. })
        ));
    }

    #[test]
    fn non_delaunay_edge_is_reported() {
        let mut mesh = Mesh::new(10.0, 10.0).unwrap();
        for p in [(2.0, 5.0), (5.0, 2.0), (8.0, 5.0), (5.0, 8.5)] {
            mesh.insert_vertex(p.into()).unwrap();
        }
        let diagonal = mesh
            .edges()
            .find(|(e, _)| {
                mesh.edge_points(*e) == Some((Point::new(2.0, 5.0), Point::new(8.0, 5.0)))
            })
            .map(|(e, _)| e)
            .unwrap();
        mesh.flip_edge(diagonal).unwrap();
        assert!(matches!(
            mesh.validate_delaunay(),
            Err(MeshValidationError::DelaunayViolation { .. })
        ));
    }
}
