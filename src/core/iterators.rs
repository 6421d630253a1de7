//! Rotation around a vertex.
//!
//! [`OutgoingEdges`] is the traversal primitive every adjacency query is built
//! on: starting from a vertex's stored edge it repeatedly applies
//! [`Mesh::rot_left`] and yields each outgoing half-edge once, in
//! counter-clockwise order, until it is back at the start.
//!
//! # Examples
//!
//! ```rust
//! use cdt_mesh::prelude::*;
//!
//! let mut mesh = Mesh::new(100.0, 100.0).unwrap();
//! let v = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
//!
//! // A vertex split out of the border triangle has three neighbours.
//! assert_eq!(mesh.outgoing_edges(v).count(), 3);
//! assert_eq!(mesh.neighbors(v).len(), 3);
//! ```

use crate::core::mesh::{EdgeKey, FaceKey, Mesh, VertexKey};

/// Cursor over the outgoing half-edges of one vertex.
///
/// Holds only a shared reference to the mesh and the current edge; it yields
/// nothing for a vertex that no longer exists.
#[derive(Clone, Debug)]
pub struct OutgoingEdges<'a> {
    mesh: &'a Mesh,
    start: EdgeKey,
    current: Option<EdgeKey>,
    real_edges_only: bool,
    remaining: usize,
}

impl<'a> OutgoingEdges<'a> {
    /// Starts a rotation around `vertex`.
    ///
    /// With `real_edges_only`, the border-closing edges are skipped.
    #[must_use]
    pub fn new(mesh: &'a Mesh, vertex: VertexKey, real_edges_only: bool) -> Self {
        let start = mesh
            .vertex(vertex)
            .map(|v| v.edge())
            .filter(|e| mesh.edge(*e).is_some());
        Self {
            mesh,
            start: start.unwrap_or_default(),
            current: start,
            real_edges_only,
            remaining: mesh.number_of_edges(),
        }
    }
}

impl Iterator for OutgoingEdges<'_> {
    type Item = EdgeKey;

    fn next(&mut self) -> Option<EdgeKey> {
        loop {
            let current = self.current?;
            // A broken fan would otherwise spin forever.
            if self.remaining == 0 {
                tracing::warn!(?current, "outgoing edge rotation did not close");
                self.current = None;
                return None;
            }
            self.remaining -= 1;

            self.current = self
                .mesh
                .rot_left(current)
                .filter(|next| *next != self.start);

            let is_real = self.mesh.edge(current).is_some_and(|e| e.is_real());
            if is_real || !self.real_edges_only {
                return Some(current);
            }
        }
    }
}

impl Mesh {
    /// Outgoing half-edges of `vertex`, skipping border-closing edges.
    #[must_use]
    pub fn outgoing_edges(&self, vertex: VertexKey) -> OutgoingEdges<'_> {
        OutgoingEdges::new(self, vertex, true)
    }

    /// Outgoing half-edges of `vertex`, including border-closing edges.
    #[must_use]
    pub fn all_outgoing_edges(&self, vertex: VertexKey) -> OutgoingEdges<'_> {
        OutgoingEdges::new(self, vertex, false)
    }

    /// Vertices joined to `vertex` by a real edge, counter-clockwise.
    #[must_use]
    pub fn neighbors(&self, vertex: VertexKey) -> Vec<VertexKey> {
        self.outgoing_edges(vertex)
            .filter_map(|e| self.destination(e))
            .collect()
    }

    /// Real faces incident to `vertex`, counter-clockwise.
    #[must_use]
    pub fn faces_around(&self, vertex: VertexKey) -> Vec<FaceKey> {
        self.all_outgoing_edges(vertex)
            .filter_map(|e| self.edge(e).map(|edge| edge.left_face()))
            .filter(|f| self.face(*f).is_some_and(|face| face.is_real()))
            .collect()
    }
}
