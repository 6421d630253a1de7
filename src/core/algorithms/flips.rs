//! Edge flips and local Delaunay restoration.
//!
//! Every topology change (splitting a face, splitting an edge, filling a
//! hole) seeds an [`OperationContext`] with the edges it exposed.
//! [`Mesh::restore_as_delaunay`] then drains that queue, flipping each real,
//! unconstrained edge that fails [`Mesh::is_delaunay`] and enqueueing the
//! edges of the quadrilateral that the flip exposed. It never scans the
//! whole mesh.
//!
//! # References
//! - C. L. Lawson (1977) - "Software for C1 Surface Interpolation"
//! - L. Guibas & J. Stolfi (1985) - "Primitives for the Manipulation of General
//!   Subdivisions and the Computation of Voronoi Diagrams"

use std::collections::VecDeque;

use crate::core::mesh::{EdgeKey, Mesh, VertexKey};

/// Extra flips allowed on top of the per-edge budget.
const FLIP_BUDGET_SLACK: usize = 64;

/// Scratch state of one mutating operation.
///
/// Holds the vertex the operation is centred on and the queue of edges
/// waiting for a Delaunay check. Each queued edge remembers the centre that
/// was current when it was pushed.
#[derive(Clone, Debug, Default)]
pub(crate) struct OperationContext {
    center_vertex: Option<VertexKey>,
    edges_to_check: VecDeque<(EdgeKey, Option<VertexKey>)>,
}

impl OperationContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn center_vertex(&self) -> Option<VertexKey> {
        self.center_vertex
    }

    pub(crate) const fn set_center_vertex(&mut self, vertex: Option<VertexKey>) {
        self.center_vertex = vertex;
    }

    /// Queues `edge` for a Delaunay check against the current centre.
    pub(crate) fn push(&mut self, edge: EdgeKey) {
        self.edges_to_check.push_back((edge, self.center_vertex));
    }

    pub(crate) fn extend(&mut self, edges: impl IntoIterator<Item = EdgeKey>) {
        for edge in edges {
            self.push(edge);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edges_to_check.is_empty()
    }

    fn pop(&mut self) -> Option<(EdgeKey, Option<VertexKey>)> {
        self.edges_to_check.pop_front()
    }

    fn clear(&mut self) {
        self.edges_to_check.clear();
    }
}

/// Counters from one restoration pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlipStats {
    /// Queue entries examined, including stale and skipped ones.
    pub edges_checked: usize,
    /// Flips performed.
    pub flips_performed: usize,
}

impl Mesh {
    /// Flips a real, unconstrained edge whose quadrilateral is strictly
    /// convex, returning the new diagonal.
    ///
    /// Returns `None` and leaves the mesh untouched otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(10.0, 10.0).unwrap();
    /// for p in [(2.0, 5.0), (5.0, 2.0), (8.0, 5.0), (5.0, 8.5)] {
    ///     mesh.insert_vertex(p.into()).unwrap();
    /// }
    /// let diagonal = mesh
    ///     .edges()
    ///     .find(|(e, _)| mesh.edge_points(*e) == Some((Point::new(2.0, 5.0), Point::new(8.0, 5.0))))
    ///     .map(|(e, _)| e)
    ///     .unwrap();
    ///
    /// let flipped = mesh.flip_edge(diagonal).unwrap();
    /// let (a, b) = mesh.edge_points(flipped).unwrap();
    /// assert_eq!(a.x(), 5.0);
    /// assert_eq!(b.x(), 5.0);
    /// assert!(mesh.edge(diagonal).is_none());
    /// assert!(mesh.is_valid().is_ok());
    /// ```
    pub fn flip_edge(&mut self, edge: EdgeKey) -> Option<EdgeKey> {
        let e = self.edges.get(edge)?;
        if !e.is_real() || e.is_constrained() {
            tracing::debug!(?edge, "refusing to flip a border or constrained edge");
            return None;
        }
        let both_faces_real = [Some(e.left_face()), self.right_face(edge)]
            .into_iter()
            .all(|f| f.and_then(|f| self.face(f)).is_some_and(|f| f.is_real()));
        if !both_faces_real || !self.is_convex(edge) {
            tracing::debug!(?edge, "refusing to flip an edge without a convex quadrilateral");
            return None;
        }
        self.swap_diagonal(edge)
    }

    /// Replaces `edge` with the other diagonal of its quadrilateral.
    ///
    /// The four outer half-edges are kept and relinked; the old edge pair
    /// and both faces are removed and replaced.
    ///
    /// ```text
    ///          top                    top
    ///         / ^ \                  /   \
    ///        /  |  \                /  t  \
    ///    left   |   right  =>   left ----> right
    ///        \  |  /                \  b  /
    ///         \ | /                  \   /
    ///          bot                    bot
    /// ```
    pub(crate) fn swap_diagonal(&mut self, edge: EdgeKey) -> Option<EdgeKey> {
        let e_bot_top = edge;
        let e_top_bot = self.edges.get(e_bot_top)?.opposite;
        let e_top_left = self.next_left(e_bot_top)?;
        let e_left_bot = self.next_left(e_top_left)?;
        let e_bot_right = self.next_left(e_top_bot)?;
        let e_right_top = self.next_left(e_bot_right)?;

        let v_bot = self.edges.get(e_bot_top)?.origin;
        let v_top = self.edges.get(e_top_bot)?.origin;
        let v_left = self.edges.get(e_left_bot)?.origin;
        let v_right = self.edges.get(e_right_top)?.origin;
        let f_left = self.edges.get(e_bot_top)?.left_face;
        let f_right = self.edges.get(e_top_bot)?.left_face;

        let (e_left_right, e_right_left) = self.add_edge_pair(v_left, v_right, true, false);
        let f_top = self.add_face(e_left_right, true);
        let f_bot = self.add_face(e_right_left, true);

        self.link(e_left_right, e_right_top, f_top);
        self.link(e_right_top, e_top_left, f_top);
        self.link(e_top_left, e_left_right, f_top);

        self.link(e_right_left, e_left_bot, f_bot);
        self.link(e_left_bot, e_bot_right, f_bot);
        self.link(e_bot_right, e_right_left, f_bot);

        if self.vertices.get(v_bot).is_some_and(|v| v.edge == e_bot_top) {
            self.set_vertex_edge(v_bot, e_bot_right);
        }
        if self.vertices.get(v_top).is_some_and(|v| v.edge == e_top_bot) {
            self.set_vertex_edge(v_top, e_top_left);
        }

        self.faces.remove(f_left);
        self.faces.remove(f_right);
        self.remove_edge_pair(e_bot_top);

        tracing::trace!(old = ?e_bot_top, new = ?e_left_right, "flipped edge");
        Some(e_left_right)
    }

    /// Drains the context's queue, flipping edges until every queued edge is
    /// locally Delaunay.
    ///
    /// Constrained, border and stale edges are skipped. The pass is bounded
    /// by a flip budget proportional to the number of edges; when the budget
    /// runs out the remaining queue is dropped with a warning.
    pub(crate) fn restore_as_delaunay(&mut self, ctx: &mut OperationContext) -> FlipStats {
        let budget = 4 * self.number_of_edges() + FLIP_BUDGET_SLACK;
        let mut stats = FlipStats::default();

        while let Some((edge, center)) = ctx.pop() {
            stats.edges_checked += 1;
            let Some(e) = self.edges.get(edge) else {
                continue;
            };
            if !e.is_real() || e.is_constrained() || self.is_delaunay(edge) {
                continue;
            }
            if !self.is_convex(edge) {
                tracing::trace!(?edge, "non-Delaunay edge is not flippable");
                continue;
            }
            if stats.flips_performed >= budget {
                tracing::warn!(
                    flips = stats.flips_performed,
                    pending = ctx.edges_to_check.len(),
                    "Delaunay restoration exceeded its flip budget"
                );
                ctx.clear();
                break;
            }

            let Some(quad) = self.quad_edges(edge) else {
                continue;
            };
            if self.swap_diagonal(edge).is_none() {
                continue;
            }
            stats.flips_performed += 1;

            let [next_left, prev_left, next_right, prev_right] = quad;
            let left_apex = self.edges.get(prev_left).map(|e| e.origin);
            let right_apex = self.edges.get(prev_right).map(|e| e.origin);
            let exposed: &[EdgeKey] = match center {
                Some(c) if Some(c) == left_apex => &[next_right, prev_right],
                Some(c) if Some(c) == right_apex => &[next_left, prev_left],
                _ => &[next_left, prev_left, next_right, prev_right],
            };
            for &e in exposed {
                ctx.edges_to_check.push_back((e, center));
            }
        }

        tracing::trace!(?stats, "Delaunay restoration finished");
        stats
    }

    /// The four outer half-edges of an edge's quadrilateral:
    /// `[next_left, prev_left, next_right, prev_right]`.
    fn quad_edges(&self, edge: EdgeKey) -> Option<[EdgeKey; 4]> {
        Some([
            self.next_left(edge)?,
            self.prev_left(edge)?,
            self.next_right(edge)?,
            self.prev_right(edge)?,
        ])
    }
}
