//! Half-edges.
//!
//! Every undirected mesh edge is stored as two [`Edge`] records pointing at
//! each other through `opposite`. A half-edge knows its origin, the next
//! half-edge counter-clockwise around the face on its left, and that face.
//! Everything else (destination, previous edge, right face, rotations about
//! the origin) is derived by the mesh from those three links; see
//! [`Mesh::destination`](crate::core::mesh::Mesh::destination) and friends.
//!
//! ```text
//!            destination
//!               ^  \
//!     opposite  |   \ next_left
//!               |    v
//!   right face  |  left face
//!               |    /
//!               |   /
//!             origin
//! ```

use crate::core::collections::SmallBuffer;
use crate::core::mesh::{EdgeKey, FaceKey, SegmentKey, VertexKey};

/// A directed half-edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    id: u64,
    pub(crate) origin: VertexKey,
    pub(crate) opposite: EdgeKey,
    pub(crate) next_left: EdgeKey,
    pub(crate) left_face: FaceKey,
    pub(crate) is_real: bool,
    pub(crate) is_constrained: bool,
    pub(crate) segments: SmallBuffer<SegmentKey, 2>,
}

impl Edge {
    /// Creates a half-edge leaving `origin`. Links are wired by the mesh.
    pub(crate) fn new(id: u64, origin: VertexKey, is_real: bool, is_constrained: bool) -> Self {
        Self {
            id,
            origin,
            opposite: EdgeKey::default(),
            next_left: EdgeKey::default(),
            left_face: FaceKey::default(),
            is_real,
            is_constrained,
            segments: SmallBuffer::new(),
        }
    }

    /// Stable, never reused identifier.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Vertex this half-edge leaves from.
    #[must_use]
    #[inline]
    pub const fn origin(&self) -> VertexKey {
        self.origin
    }

    /// The same undirected edge traversed the other way.
    #[must_use]
    #[inline]
    pub const fn opposite(&self) -> EdgeKey {
        self.opposite
    }

    /// Next half-edge around the left face.
    #[must_use]
    #[inline]
    pub const fn next_left(&self) -> EdgeKey {
        self.next_left
    }

    /// Face on the left of this half-edge.
    #[must_use]
    #[inline]
    pub const fn left_face(&self) -> FaceKey {
        self.left_face
    }

    /// `false` only for the border-closing edges between non-real vertices.
    #[must_use]
    #[inline]
    pub const fn is_real(&self) -> bool {
        self.is_real
    }

    /// Constrained edges are never flipped.
    #[must_use]
    #[inline]
    pub const fn is_constrained(&self) -> bool {
        self.is_constrained
    }

    /// Constraint segments owning this edge.
    #[must_use]
    pub fn constraint_segments(&self) -> &[SegmentKey] {
        &self.segments
    }

    pub(crate) fn add_segment(&mut self, segment: SegmentKey) {
        if !self.segments.contains(&segment) {
            self.segments.push(segment);
        }
    }

    pub(crate) fn remove_segment(&mut self, segment: SegmentKey) {
        self.segments.retain(|s| *s != segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::StorageMap;
    use crate::core::vertex::Vertex;
    use crate::geometry::point::Point;

    #[test]
    fn new_edge_is_unwired() {
        let mut vertices: StorageMap<VertexKey, Vertex> = StorageMap::with_key();
        let v = vertices.insert(Vertex::new(0, Point::new(0.0, 0.0), true));

        let e = Edge::new(7, v, true, false);
        assert_eq!(e.id(), 7);
        assert_eq!(e.origin(), v);
        assert_eq!(e.opposite(), EdgeKey::default());
        assert_eq!(e.next_left(), EdgeKey::default());
        assert_eq!(e.left_face(), FaceKey::default());
        assert!(e.is_real());
        assert!(!e.is_constrained());
        assert!(e.constraint_segments().is_empty());
    }
}
