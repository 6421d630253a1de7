//! # cdt-mesh
//!
//! A planar constrained Delaunay triangulation (CDT) kept on a half-edge mesh,
//! with incremental vertex insertion, constraint segment and shape insertion,
//! and deletion of both.
//!
//! The mesh covers the rectangle `[0, width] × [0, height]` and is closed by a
//! large border triangle around it, so every point of the domain always lies
//! in some triangle. Faces inside the border triangle are *real*; the single
//! face outside it is not.
//!
//! # Features
//!
//! - Incremental insertion with stochastic walk point location
//! - Constraint segments and polyline/polygon shapes, including crossing and
//!   overlapping constraints
//! - Deletion of vertices and constraints with local re-triangulation
//! - Transformable obstacles re-inserted when they move
//! - Whole-mesh invariant validation
//! - Serialization of points and configuration with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use cdt_mesh::prelude::*;
//!
//! let mut mesh = Mesh::new(100.0, 100.0).unwrap();
//!
//! // An empty mesh holds only the border triangle.
//! assert_eq!(mesh.number_of_vertices(), 3);
//! assert_eq!(mesh.number_of_faces(), 2);
//!
//! for p in [(10.0, 10.0), (80.0, 20.0), (40.0, 70.0), (60.0, 60.0)] {
//!     mesh.insert_vertex(p.into()).unwrap();
//! }
//! let wall = mesh
//!     .insert_constraint_segment(Point::new(5.0, 50.0), Point::new(95.0, 45.0))
//!     .unwrap();
//!
//! assert!(mesh.is_valid().is_ok());
//! assert!(mesh.validate_delaunay().is_ok());
//!
//! assert!(mesh.delete_constraint_segment(wall));
//! assert!(mesh.is_valid().is_ok());
//! ```
//!
//! # Mesh Invariants
//!
//! Every public mutating operation leaves the mesh satisfying the invariants
//! checked by [`Mesh::is_valid`](core::mesh::Mesh::is_valid) and
//! [`Mesh::validate_delaunay`](core::mesh::Mesh::validate_delaunay):
//!
//! | Invariant | Notes |
//! |---|---|
//! | Triangular faces | Every face is a 3-cycle of half-edges naming it as their left face. |
//! | Twin symmetry | `opposite` is an involution and twins have swapped endpoints. |
//! | Vertex anchors | Each vertex stores a live edge leaving it. |
//! | Constraint chains | A segment's edges form a contiguous chain from its start to its end. |
//! | Ownership symmetry | Segments, edges, vertices and shapes agree about membership. |
//! | Vertex spacing | No two vertices lie within [`EPSILON`](geometry::predicates::EPSILON). |
//! | Delaunay closure | Every unconstrained real edge is locally Delaunay. |
//!
//! Operations that cannot proceed (a point outside the domain, a constraint
//! that collapses to a point, a vertex that is a constraint endpoint) refuse by
//! returning `None` or `false` and leave the mesh untouched.
//!
//! # Logging
//!
//! The crate reports through [`tracing`]: refusals at `debug`, recoverable
//! anomalies (a failed constraint walk, an exhausted flip budget) at `warn`,
//! and per-step detail at `trace`. Install any subscriber to see them.

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module holds the mesh, its entities and the algorithms that
/// mutate it.
pub mod core {
    /// Algorithms that locate, insert, delete and re-triangulate.
    pub mod algorithms {
        /// Constraint segment and shape insertion and deletion.
        pub mod constraints;
        /// Edge flips and Delaunay restoration.
        pub mod flips;
        /// Vertex insertion into faces and onto edges.
        pub mod insertion;
        /// Point location by stochastic walk.
        pub mod locate;
        /// Vertex deletion.
        pub mod removal;
        /// Hole carving and constrained re-triangulation.
        pub mod retriangulation;
    }
    pub mod builder;
    /// Arena and hash collection aliases.
    pub mod collections;
    pub mod constraint;
    pub mod edge;
    pub mod face;
    pub mod iterators;
    pub mod mesh;
    pub mod object;
    pub mod queries;
    pub mod validation;
    pub mod vertex;
}

/// Planar points, predicates and geometric helpers.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    /// Distance, projection, intersection and clipping.
    pub mod util;
    pub use point::*;
    pub use predicates::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::algorithms::flips::FlipStats;
    pub use crate::core::algorithms::locate::{LocateError, LocateResult};
    pub use crate::core::builder::{MeshConfig, MeshConfigBuilder};
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };
    pub use crate::core::constraint::{ConstraintSegment, ConstraintShape};
    pub use crate::core::edge::Edge;
    pub use crate::core::face::Face;
    pub use crate::core::mesh::{
        EdgeKey, FaceKey, Mesh, MeshError, ObjectKey, SegmentKey, ShapeKey, VertexKey,
    };
    pub use crate::core::object::MeshObject;
    pub use crate::core::validation::MeshValidationError;
    pub use crate::core::vertex::Vertex;
    pub use crate::geometry::point::Point;
    pub use crate::geometry::predicates::{EPSILON, EPSILON_SQUARED, Side};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{is_normal, prelude::*};

    #[test]
    fn normal_types() {
        assert!(is_normal::<Point>());
        assert!(is_normal::<Vertex>());
        assert!(is_normal::<Edge>());
        assert!(is_normal::<Face>());
        assert!(is_normal::<Mesh>());
        assert!(is_normal::<MeshObject>());
        assert!(is_normal::<MeshConfig>());
    }

    #[test]
    fn prelude_collections_exports() {
        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
        buffer.push(42);
        assert_eq!(buffer.len(), 1);

        assert!(fast_hash_map_with_capacity::<u64, usize>(100).capacity() >= 100);
        assert!(fast_hash_set_with_capacity::<u64>(50).capacity() >= 50);
    }

    #[test]
    fn prelude_errors_display() {
        let err = Mesh::new(0.0, 1.0).unwrap_err();
        assert!(matches!(err, MeshError::InvalidDomain { .. }));
        assert!(!err.to_string().is_empty());
    }
}
