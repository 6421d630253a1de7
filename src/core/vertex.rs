//! Mesh vertices.
//!
//! A [`Vertex`] stores its position, one outgoing half-edge (from which the
//! whole fan can be recovered with
//! [`OutgoingEdges`](crate::core::iterators::OutgoingEdges)), whether it is a
//! real vertex of the domain or one of the border-closing vertices, and the
//! constraint segments that pass through or end at it.

use crate::core::collections::SmallBuffer;
use crate::core::mesh::{EdgeKey, SegmentKey};
use crate::geometry::point::Point;

/// A vertex of the half-edge mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    id: u64,
    point: Point,
    pub(crate) edge: EdgeKey,
    is_real: bool,
    pub(crate) segments: SmallBuffer<SegmentKey, 2>,
}

impl Vertex {
    /// Creates an unattached vertex. The incident edge is wired by the mesh.
    pub(crate) fn new(id: u64, point: Point, is_real: bool) -> Self {
        Self {
            id,
            point,
            edge: EdgeKey::default(),
            is_real,
            segments: SmallBuffer::new(),
        }
    }

    /// Stable, never reused identifier.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Position of the vertex.
    #[must_use]
    #[inline]
    pub const fn point(&self) -> Point {
        self.point
    }

    /// One outgoing half-edge.
    #[must_use]
    #[inline]
    pub const fn edge(&self) -> EdgeKey {
        self.edge
    }

    /// `false` for the border-closing vertices outside the domain.
    #[must_use]
    #[inline]
    pub const fn is_real(&self) -> bool {
        self.is_real
    }

    /// Constraint segments ending at or passing through this vertex.
    #[must_use]
    pub fn constraint_segments(&self) -> &[SegmentKey] {
        &self.segments
    }

    /// Whether any constraint segment uses this vertex.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.segments.is_empty()
    }

    pub(crate) fn add_segment(&mut self, segment: SegmentKey) {
        if !self.segments.contains(&segment) {
            self.segments.push(segment);
        }
    }

    pub(crate) fn remove_segment(&mut self, segment: SegmentKey) -> bool {
        let before = self.segments.len();
        self.segments.retain(|s| *s != segment);
        self.segments.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::StorageMap;
    use crate::core::constraint::ConstraintSegment;

    #[test]
    fn segment_membership_has_no_duplicates() {
        let mut segments: StorageMap<SegmentKey, ConstraintSegment> = StorageMap::with_key();
        let s1 = segments.insert(ConstraintSegment::new(1, None));
        let s2 = segments.insert(ConstraintSegment::new(2, None));

        let mut v = Vertex::new(0, Point::new(1.0, 2.0), true);
        assert!(!v.is_constrained());
        v.add_segment(s1);
        v.add_segment(s1);
        v.add_segment(s2);
        assert_eq!(v.constraint_segments(), &[s1, s2]);
        assert!(v.remove_segment(s1));
        assert!(!v.remove_segment(s1));
        assert_eq!(v.constraint_segments(), &[s2]);
    }

    #[test]
    fn new_vertex_accessors() {
        let v = Vertex::new(42, Point::new(3.0, 4.0), false);
        assert_eq!(v.id(), 42);
        assert_eq!(v.point(), Point::new(3.0, 4.0));
        assert!(!v.is_real());
        assert_eq!(v.edge(), EdgeKey::default());
    }
}
