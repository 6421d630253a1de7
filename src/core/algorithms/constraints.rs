//! Constraint segment and shape insertion and deletion.
//!
//! # Inserting a segment
//!
//! The segment is clipped to the domain and both endpoints are inserted as
//! vertices. A walk then runs from the first endpoint towards the second,
//! alternating between two states:
//!
//! - **At a vertex**: if an outgoing edge already leads to the end vertex, or
//!   to a vertex lying on the segment within ε, that edge is constrained and
//!   the walk continues from its destination. Otherwise the edge across the
//!   segment's way out of the vertex is found. A constrained one is split at
//!   the crossing; an unconstrained one is recorded as intersected and the
//!   walk steps across it.
//! - **Inside a face, entered through an edge**: if the face's apex is the
//!   end vertex (or lies on the segment), the corridor of crossed triangles
//!   is closed. Otherwise the walk leaves through whichever of the two other
//!   edges the segment crosses, splitting it if constrained.
//!
//! While walking, the half-edges flanking the corridor are collected as its
//! left and right boundaries. Closing a corridor adds the new constrained
//! edge, removes the crossed triangles and re-triangulates the polygon on
//! each side of the new edge.
//!
//! ```text
//!        left boundary
//!     o-----o-----o-----o
//!     |\   / \   / \   /|
//!   down \/   \ /   \ / up        crossed edges run right -> left
//!     |  /\   / \   / \ |
//!     o-----o-----o-----o
//!        right boundary
//! ```

use std::collections::VecDeque;

use crate::core::algorithms::flips::OperationContext;
use crate::core::constraint::{ConstraintSegment, ConstraintShape};
use crate::core::mesh::{EdgeKey, Mesh, SegmentKey, ShapeKey, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{EPSILON_SQUARED, Side, side_of_line};
use crate::geometry::util::{clip_segment_to_rect, distance_squared_point_to_segment, line_intersection};

/// Where the constraint walk currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// On a vertex of the segment.
    Vertex(VertexKey),
    /// In the face left of this half-edge, having just crossed it.
    Edge(EdgeKey),
}

/// Straight segment being inserted, with the corridor collected so far.
#[derive(Debug)]
struct ConstraintWalk {
    segment: SegmentKey,
    start: Point,
    end: Point,
    v_end: VertexKey,
    v_down: VertexKey,
    intersected: Vec<EdgeKey>,
    left_bound: VecDeque<EdgeKey>,
    right_bound: Vec<EdgeKey>,
}

impl ConstraintWalk {
    /// Whether `p` lies on the segment within ε.
    fn is_on_segment(&self, p: Point) -> bool {
        distance_squared_point_to_segment(p, self.start, self.end) <= EPSILON_SQUARED
    }

    fn reset(&mut self, v_down: VertexKey) {
        self.v_down = v_down;
        self.intersected.clear();
        self.left_bound.clear();
        self.right_bound.clear();
    }
}

impl Mesh {
    /// Inserts a constrained segment from `p1` to `p2`.
    ///
    /// The segment is clipped to the domain first. Every unconstrained edge
    /// it crosses is removed and the polygons on both sides are
    /// re-triangulated; constrained edges it crosses are split at the
    /// crossing. Returns `None` if the clipped segment is empty or collapses
    /// to a single vertex.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// let s = mesh
    ///     .insert_constraint_segment(Point::new(10.0, 10.0), Point::new(90.0, 90.0))
    ///     .unwrap();
    ///
    /// let chain = mesh.segment(s).unwrap().edges();
    /// let (first, _) = mesh.edge_points(chain[0]).unwrap();
    /// let (_, last) = mesh.edge_points(chain[chain.len() - 1]).unwrap();
    /// assert_eq!((first, last), (Point::new(10.0, 10.0), Point::new(90.0, 90.0)));
    /// assert!(mesh.validate_delaunay().is_ok());
    /// ```
    pub fn insert_constraint_segment(&mut self, p1: Point, p2: Point) -> Option<SegmentKey> {
        self.insert_segment_in_shape(p1, p2, None)
    }

    /// Inserts the polyline through `points` as one shape.
    ///
    /// Consecutive points form segments. Returns `None` for fewer than two
    /// points or if no segment could be inserted.
    pub fn insert_constraint_shape(&mut self, points: &[Point]) -> Option<ShapeKey> {
        self.insert_shape(points, false)
    }

    /// Inserts the closed polygon through `points` as one shape.
    ///
    /// Like [`Mesh::insert_constraint_shape`], with a final segment from the
    /// last point back to the first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// let square = [(20.0, 20.0), (60.0, 20.0), (60.0, 60.0), (20.0, 60.0)].map(Point::from);
    /// let shape = mesh.insert_constraint_polygon(&square).unwrap();
    /// assert_eq!(mesh.shape(shape).unwrap().segments().len(), 4);
    ///
    /// assert!(mesh.delete_constraint_shape(shape));
    /// assert_eq!(mesh.number_of_segments(), 0);
    /// assert!(mesh.is_valid().is_ok());
    /// ```
    pub fn insert_constraint_polygon(&mut self, points: &[Point]) -> Option<ShapeKey> {
        self.insert_shape(points, true)
    }

    fn insert_shape(&mut self, points: &[Point], closed: bool) -> Option<ShapeKey> {
        if points.len() < 2 {
            tracing::debug!(points = points.len(), "constraint shape needs at least two points");
            return None;
        }
        let closing = (closed && points.len() > 2).then(|| (points[points.len() - 1], points[0]));
        let pairs: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).chain(closing).collect();
        self.insert_segment_pairs(&pairs)
    }

    /// Inserts each `(start, end)` pair as a segment of one new shape.
    ///
    /// The shape is dropped again if none of its segments could be inserted.
    pub(crate) fn insert_segment_pairs(&mut self, pairs: &[(Point, Point)]) -> Option<ShapeKey> {
        let id = self.allocate_id();
        let shape = self.shapes.insert(ConstraintShape::new(id));
        for &(p, q) in pairs {
            if let Some(segment) = self.insert_segment_in_shape(p, q, Some(shape))
                && let Some(s) = self.shapes.get_mut(shape)
            {
                s.segments.push(segment);
            }
        }

        if self.shapes.get(shape).is_some_and(|s| s.segments.is_empty()) {
            tracing::debug!("no segment of the constraint shape could be inserted");
            self.shapes.remove(shape);
            return None;
        }
        Some(shape)
    }

    fn insert_segment_in_shape(
        &mut self,
        p1: Point,
        p2: Point,
        shape: Option<ShapeKey>,
    ) -> Option<SegmentKey> {
        let domain_max = Point::new(self.width(), self.height());
        let Some((a, b)) = clip_segment_to_rect(p1, p2, Point::default(), domain_max) else {
            tracing::debug!(%p1, %p2, "constraint segment lies outside the domain");
            return None;
        };

        let v_start = self.insert_vertex(a)?;
        let v_end = self.insert_vertex(b)?;
        if v_start == v_end {
            tracing::debug!(%p1, %p2, "constraint segment collapses to a single vertex");
            return None;
        }

        let start = self.vertex_point(v_start)?;
        let end = self.vertex_point(v_end)?;

        let id = self.allocate_id();
        let segment = self.segments.insert(ConstraintSegment::new(id, shape));
        let mut walk = ConstraintWalk {
            segment,
            start,
            end,
            v_end,
            v_down: v_start,
            intersected: Vec::new(),
            left_bound: VecDeque::new(),
            right_bound: Vec::new(),
        };

        let mut ctx = OperationContext::new();
        let completed = self.walk_constraint(&mut ctx, &mut walk, v_start);
        if completed.is_none() {
            tracing::warn!(%p1, %p2, "constraint walk failed, discarding segment");
            self.discard_segment(&mut ctx, segment);
        }
        self.restore_as_delaunay(&mut ctx);
        completed.map(|()| segment)
    }

    /// Walks from `v_start` to the walk's end vertex, constraining the edges
    /// along the way. `None` means the walk got stuck.
    fn walk_constraint(
        &mut self,
        ctx: &mut OperationContext,
        walk: &mut ConstraintWalk,
        v_start: VertexKey,
    ) -> Option<()> {
        let max_steps = self.number_of_edges() + 16;
        let mut cursor = Cursor::Vertex(v_start);

        for _ in 0..max_steps {
            cursor = match cursor {
                Cursor::Vertex(v) if v == walk.v_end => return Some(()),
                Cursor::Vertex(v) => self.walk_from_vertex(ctx, walk, v)?,
                Cursor::Edge(e) => self.walk_from_edge(ctx, walk, e)?,
            };
            tracing::trace!(?cursor, "constraint walk step");
        }
        tracing::warn!(steps = max_steps, "constraint walk exceeded its step limit");
        None
    }

    fn walk_from_vertex(
        &mut self,
        ctx: &mut OperationContext,
        walk: &mut ConstraintWalk,
        v: VertexKey,
    ) -> Option<Cursor> {
        let pv = self.vertex_point(v)?;
        let outgoing: Vec<EdgeKey> = self.outgoing_edges(v).collect();

        if let Some(&e) = outgoing
            .iter()
            .find(|e| self.destination(**e) == Some(walk.v_end))
        {
            self.constrain_edge(walk.segment, e);
            return Some(Cursor::Vertex(walk.v_end));
        }

        let ahead = walk.end - pv;
        for &e in &outgoing {
            let Some(d) = self.destination(e) else {
                continue;
            };
            let pd = self.vertex_point(d)?;
            if walk.is_on_segment(pd) && (pd - pv).dot(ahead) > 0.0 {
                self.constrain_edge(walk.segment, e);
                walk.reset(d);
                return Some(Cursor::Vertex(d));
            }
        }

        for &e in &outgoing {
            let Some(across) = self.next_left(e) else {
                continue;
            };
            let Some(x) = self.edge_segment_intersection(across, pv, walk.end) else {
                continue;
            };

            if self.edge(across)?.is_constrained() {
                let nv = self.split_edge(ctx, across, x)?;
                let joining = self
                    .outgoing_edges(v)
                    .find(|e| self.destination(*e) == Some(nv))?;
                self.constrain_edge(walk.segment, joining);
                walk.reset(nv);
                return Some(Cursor::Vertex(nv));
            }

            walk.intersected.push(across);
            walk.left_bound.push_front(self.next_left(across)?);
            walk.right_bound.push(self.prev_left(across)?);
            return Some(Cursor::Edge(self.edge(across)?.opposite()));
        }

        tracing::warn!(?v, "constraint walk found no way out of vertex");
        None
    }

    fn walk_from_edge(
        &mut self,
        ctx: &mut OperationContext,
        walk: &mut ConstraintWalk,
        entered: EdgeKey,
    ) -> Option<Cursor> {
        // `entered` runs left -> right; the face ahead is on its left.
        let to_apex = self.next_left(entered)?;
        let from_apex = self.next_left(to_apex)?;
        let apex = self.destination(to_apex)?;
        let p_apex = self.vertex_point(apex)?;

        if apex == walk.v_end || walk.is_on_segment(p_apex) {
            walk.left_bound.push_front(from_apex);
            walk.right_bound.push(to_apex);
            self.insert_new_constrained_edge(ctx, walk, apex);
            walk.reset(apex);
            return Some(Cursor::Vertex(apex));
        }

        let apex_is_left = side_of_line(p_apex, walk.start, walk.end) == Side::LEFT;
        let crossing = if apex_is_left { to_apex } else { from_apex };

        if self.edge(crossing)?.is_constrained() {
            let (a, b) = self.edge_points(crossing)?;
            let x = self
                .edge_segment_intersection(crossing, walk.start, walk.end)
                .or_else(|| line_intersection(a, b, walk.start, walk.end))?;
            let v_left = self.edge(*walk.left_bound.front()?)?.origin();
            let v_right = self.destination(*walk.right_bound.last()?)?;

            let nv = self.split_edge(ctx, crossing, x)?;
            let outgoing: Vec<EdgeKey> = self.all_outgoing_edges(nv).collect();
            let to_left = outgoing
                .iter()
                .copied()
                .find(|e| self.destination(*e) == Some(v_left))?;
            let to_right = outgoing
                .iter()
                .copied()
                .find(|e| self.destination(*e) == Some(v_right))?;
            walk.left_bound.push_front(to_left);
            walk.right_bound.push(self.edge(to_right)?.opposite());
            self.insert_new_constrained_edge(ctx, walk, nv);
            walk.reset(nv);
            return Some(Cursor::Vertex(nv));
        }

        walk.intersected.push(crossing);
        if apex_is_left {
            walk.left_bound.push_front(from_apex);
        } else {
            walk.right_bound.push(to_apex);
        }
        Some(Cursor::Edge(self.edge(crossing)?.opposite()))
    }

    /// Closes the corridor from the walk's current start to `up` with a new
    /// constrained edge and re-triangulates both sides of it.
    fn insert_new_constrained_edge(
        &mut self,
        ctx: &mut OperationContext,
        walk: &mut ConstraintWalk,
        up: VertexKey,
    ) {
        let down = walk.v_down;
        let (down_up, up_down) = self.add_edge_pair(down, up, true, true);
        self.attach_segment(walk.segment, down_up);

        let mut left = Vec::with_capacity(walk.left_bound.len() + 1);
        left.push(down_up);
        left.extend(walk.left_bound.iter().copied());
        let mut right = Vec::with_capacity(walk.right_bound.len() + 1);
        right.push(up_down);
        right.extend(walk.right_bound.iter().copied());

        self.untriangulate(&walk.intersected);
        self.triangulate(&left, true);
        self.triangulate(&right, true);

        tracing::trace!(
            crossed = walk.intersected.len(),
            left = left.len(),
            right = right.len(),
            "re-triangulated constraint corridor"
        );
        ctx.set_center_vertex(None);
        ctx.extend(left.into_iter().skip(1));
        ctx.extend(right.into_iter().skip(1));
    }

    /// Marks an existing edge as part of `segment`.
    fn constrain_edge(&mut self, segment: SegmentKey, edge: EdgeKey) {
        if let Some(e) = self.edges.get_mut(edge) {
            e.is_constrained = true;
        }
        if let Some(opposite) = self.edges.get(edge).map(|e| e.opposite)
            && let Some(e) = self.edges.get_mut(opposite)
        {
            e.is_constrained = true;
        }
        self.attach_segment(segment, edge);
    }

    /// Records ownership between `segment`, an edge pair and its endpoints,
    /// and appends the edge to the segment's chain.
    fn attach_segment(&mut self, segment: SegmentKey, edge: EdgeKey) {
        let Some((origin, opposite)) = self.edges.get(edge).map(|e| (e.origin, e.opposite)) else {
            return;
        };
        let Some(destination) = self.destination(edge) else {
            return;
        };
        for e in [edge, opposite] {
            if let Some(e) = self.edges.get_mut(e) {
                e.add_segment(segment);
            }
        }
        for v in [origin, destination] {
            if let Some(v) = self.vertices.get_mut(v) {
                v.add_segment(segment);
            }
        }
        if let Some(s) = self.segments.get_mut(segment) {
            s.push_edge(edge, opposite);
        }
    }

    /// Strips `segment` from everything that references it and drops it.
    ///
    /// Returns the unconstrained edges and the vertices the segment touched,
    /// in chain order.
    fn detach_segment(&mut self, segment: SegmentKey) -> Option<(Vec<EdgeKey>, Vec<VertexKey>)> {
        let removed = self.segments.remove(segment)?;
        let mut released = Vec::new();
        let mut touched = Vec::with_capacity(removed.edges.len() + 1);

        for &edge in &removed.edges {
            let Some(opposite) = self.edges.get(edge).map(|e| e.opposite) else {
                continue;
            };
            for half in [edge, opposite] {
                if let Some(e) = self.edges.get_mut(half) {
                    e.remove_segment(segment);
                    if e.segments.is_empty() {
                        e.is_constrained = false;
                    }
                }
            }
            if self.edges.get(edge).is_some_and(|e| !e.is_constrained) {
                released.push(edge);
            }
            touched.extend(self.edges.get(edge).map(|e| e.origin));
        }
        if let Some(&last) = removed.edges.last() {
            touched.extend(self.destination(last));
        }
        for &v in &touched {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.remove_segment(segment);
            }
        }
        if let Some(shape) = removed.shape
            && let Some(s) = self.shapes.get_mut(shape)
        {
            s.segments.retain(|s| *s != segment);
        }
        Some((released, touched))
    }

    /// Rolls back a segment whose walk failed, keeping edges it already
    /// constrained as plain edges and queueing them for restoration.
    fn discard_segment(&mut self, ctx: &mut OperationContext, segment: SegmentKey) {
        if let Some((released, touched)) = self.detach_segment(segment) {
            tracing::debug!(
                ?segment,
                released = released.len(),
                vertices = touched.len(),
                "discarded partially inserted constraint segment"
            );
            ctx.extend(released);
        }
    }

    /// Deletes a constraint segment.
    ///
    /// Edges no other segment owns become unconstrained, and every vertex of
    /// the segment that no longer supports a constraint is deleted. Returns
    /// `false` if the segment does not exist.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// let (v, e, f) = (mesh.number_of_vertices(), mesh.number_of_edges(), mesh.number_of_faces());
    ///
    /// let s = mesh
    ///     .insert_constraint_segment(Point::new(20.0, 30.0), Point::new(70.0, 40.0))
    ///     .unwrap();
    /// assert!(mesh.delete_constraint_segment(s));
    /// assert_eq!(
    ///     (mesh.number_of_vertices(), mesh.number_of_edges(), mesh.number_of_faces()),
    ///     (v, e, f)
    /// );
    /// assert!(!mesh.delete_constraint_segment(s));
    /// ```
    pub fn delete_constraint_segment(&mut self, segment: SegmentKey) -> bool {
        let Some((released, touched)) = self.detach_segment(segment) else {
            return false;
        };

        // Released edges must be Delaunay again before any star is refilled.
        let mut ctx = OperationContext::new();
        ctx.extend(released);
        self.restore_as_delaunay(&mut ctx);

        // Endpoints and junctions of other constraints refuse deletion.
        for v in touched {
            self.delete_vertex(v);
        }
        tracing::debug!(?segment, "deleted constraint segment");
        true
    }

    /// Deletes every segment of a shape, then the shape itself.
    ///
    /// Returns `false` if the shape does not exist.
    pub fn delete_constraint_shape(&mut self, shape: ShapeKey) -> bool {
        let Some(segments) = self.shapes.get(shape).map(|s| s.segments.clone()) else {
            return false;
        };
        for segment in segments {
            self.delete_constraint_segment(segment);
        }
        self.shapes.remove(shape);
        if self.border_shape() == Some(shape) {
            self.clear_border_shape();
        }
        true
    }
}
