//! Constraint segments and shapes.
//!
//! A [`ConstraintSegment`] is one user-inserted straight segment, realised in
//! the mesh as a chain of half-edges running from its first endpoint to its
//! second. Vertices met along the way (existing ones, or new ones created
//! where the segment crosses another constraint) split the chain into several
//! edges. A [`ConstraintShape`] groups the segments of one polyline or
//! polygon so they can be removed together.

use crate::core::mesh::{EdgeKey, SegmentKey, ShapeKey};

/// Chain of half-edges realising one inserted segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintSegment {
    id: u64,
    pub(crate) edges: Vec<EdgeKey>,
    pub(crate) shape: Option<ShapeKey>,
}

impl ConstraintSegment {
    pub(crate) const fn new(id: u64, shape: Option<ShapeKey>) -> Self {
        Self {
            id,
            edges: Vec::new(),
            shape,
        }
    }

    /// Stable, never reused identifier.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Half-edges from the first endpoint to the second, in order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    /// Shape this segment belongs to, if any.
    #[must_use]
    pub const fn shape(&self) -> Option<ShapeKey> {
        self.shape
    }

    /// Appends `edge` unless it or its twin is already part of the chain.
    pub(crate) fn push_edge(&mut self, edge: EdgeKey, opposite: EdgeKey) {
        if !self.edges.contains(&edge) && !self.edges.contains(&opposite) {
            self.edges.push(edge);
        }
    }

    /// Replaces the chain element `old` with
    /// `replacement`, returning whether it was found.
    pub(crate) fn replace_edge(&mut self, old: EdgeKey, replacement: &[EdgeKey]) -> bool {
        match self.edges.iter().position(|e| *e == old) {
            Some(index) => {
                self.edges.splice(index..=index, replacement.iter().copied());
                true
            }
            None => false,
        }
    }
}

/// Group of segments inserted together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintShape {
    id: u64,
    pub(crate) segments: Vec<SegmentKey>,
}

impl ConstraintShape {
    pub(crate) const fn new(id: u64) -> Self {
        Self {
            id,
            segments: Vec::new(),
        }
    }

    /// Stable, never reused identifier.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Segments in insertion order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentKey] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::StorageMap;
    use crate::core::edge::Edge;

    fn edge_keys(n: usize) -> Vec<EdgeKey> {
        let mut edges: StorageMap<EdgeKey, Edge> = StorageMap::with_key();
        (0..n)
            .map(|i| edges.insert(Edge::new(i as u64, Default::default(), true, true)))
            .collect()
    }

    #[test]
    fn push_edge_skips_either_direction() {
        let keys = edge_keys(3);
        let mut segment = ConstraintSegment::new(1, None);
        segment.push_edge(keys[0], keys[1]);
        segment.push_edge(keys[1], keys[0]);
        segment.push_edge(keys[0], keys[1]);
        segment.push_edge(keys[2], keys[2]);
        assert_eq!(segment.edges(), &[keys[0], keys[2]]);
    }

    #[test]
    fn replace_edge_splices_in_place() {
        let keys = edge_keys(5);
        let mut segment = ConstraintSegment::new(1, None);
        segment.edges = vec![keys[0], keys[1], keys[2]];
        assert!(segment.replace_edge(keys[1], &[keys[3], keys[4]]));
        assert_eq!(segment.edges(), &[keys[0], keys[3], keys[4], keys[2]]);
        assert!(!segment.replace_edge(keys[1], &[keys[0]]));
    }
}
