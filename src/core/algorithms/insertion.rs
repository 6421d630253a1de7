//! Incremental vertex insertion.
//!
//! A new point is located and then spliced into the mesh in one of two ways:
//!
//! - **Inside a face**: [`Mesh::split_face`] replaces the triangle with three
//!   triangles fanned from the new vertex (1 → 3).
//! - **On an edge**: [`Mesh::split_edge`] replaces the edge and its two
//!   triangles with four triangles around the new vertex (2 → 4). A
//!   constrained edge stays constrained: its two halves inherit the owning
//!   segments and the segments' edge chains are spliced.
//!
//! Both seed the operation's flip queue with the boundary of the new star;
//! [`Mesh::insert_vertex`] then restores the Delaunay property locally.

use crate::core::algorithms::flips::OperationContext;
use crate::core::algorithms::locate::LocateResult;
use crate::core::mesh::{EdgeKey, FaceKey, Mesh, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::EPSILON_SQUARED;
use crate::geometry::util::project_orthogonally;

impl Mesh {
    /// Inserts a vertex at `point` and restores the Delaunay property around
    /// it.
    ///
    /// Returns the existing vertex when one lies within ε of `point`, and
    /// `None` when `point` is outside the domain or not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// let v = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
    ///
    /// // Inserting again (or within ε) is a no-op returning the same vertex.
    /// assert_eq!(mesh.insert_vertex(Point::new(50.0, 50.001)), Some(v));
    /// assert_eq!(mesh.insert_vertex(Point::new(150.0, 50.0)), None);
    /// ```
    pub fn insert_vertex(&mut self, point: Point) -> Option<VertexKey> {
        let mut ctx = OperationContext::new();
        let vertex = self.insert_vertex_with(&mut ctx, point)?;
        self.restore_as_delaunay(&mut ctx);
        Some(vertex)
    }

    /// Locates and splices in `point` without restoring the Delaunay
    /// property; the exposed edges are left in `ctx`.
    pub(crate) fn insert_vertex_with(
        &mut self,
        ctx: &mut OperationContext,
        point: Point,
    ) -> Option<VertexKey> {
        if !self.contains_point(point) {
            tracing::debug!(%point, "rejecting vertex outside the domain");
            return None;
        }

        let located = match self.locate_position(point) {
            Ok(located) => located,
            Err(err) => {
                tracing::warn!(%err, %point, "could not locate vertex for insertion");
                return None;
            }
        };

        let vertex = match located {
            LocateResult::OnVertex(v) => return Some(v),
            LocateResult::OnEdge(e) => self.split_edge(ctx, e, point)?,
            LocateResult::InFace(f) => self.split_face(ctx, f, point)?,
            LocateResult::Outside => {
                tracing::warn!(%point, "in-domain point located outside the border triangle");
                return None;
            }
        };
        self.last_inserted = Some(vertex);
        Some(vertex)
    }

    /// Splits a triangle into three around a new vertex at `point`.
    ///
    /// ```text
    ///            v3
    ///           /|\
    ///          / | \
    ///         /  v  \
    ///        / /   \ \
    ///       v1 ----- v2
    /// ```
    pub(crate) fn split_face(
        &mut self,
        ctx: &mut OperationContext,
        face: FaceKey,
        point: Point,
    ) -> Option<VertexKey> {
        let [e1, e2, e3] = self.face_edges(face)?;
        let [v1, v2, v3] = self.face_vertices(face)?;

        let v = self.add_vertex(point, true);
        let (e_v1, e1_v) = self.add_edge_pair(v, v1, true, false);
        let (e_v2, e2_v) = self.add_edge_pair(v, v2, true, false);
        let (e_v3, e3_v) = self.add_edge_pair(v, v3, true, false);

        let f1 = self.add_face(e_v1, true);
        let f2 = self.add_face(e_v2, true);
        let f3 = self.add_face(e_v3, true);

        self.link(e_v1, e1, f1);
        self.link(e1, e2_v, f1);
        self.link(e2_v, e_v1, f1);

        self.link(e_v2, e2, f2);
        self.link(e2, e3_v, f2);
        self.link(e3_v, e_v2, f2);

        self.link(e_v3, e3, f3);
        self.link(e3, e1_v, f3);
        self.link(e1_v, e_v3, f3);

        self.set_vertex_edge(v, e_v1);
        self.faces.remove(face);

        tracing::trace!(?v, ?face, "split face");
        ctx.set_center_vertex(Some(v));
        ctx.extend([e1, e2, e3]);
        Some(v)
    }

    /// Splits an edge and its two triangles into four around a new vertex.
    ///
    /// The vertex is placed at the orthogonal projection of `point` onto the
    /// edge. If `point` is within ε of an endpoint, that endpoint is returned
    /// and nothing changes.
    ///
    /// ```text
    ///              top
    ///             / | \
    ///            /  |  \
    ///     left ---- c ---- right
    ///            \  |  /
    ///             \ | /
    ///              bot
    /// ```
    pub(crate) fn split_edge(
        &mut self,
        ctx: &mut OperationContext,
        edge: EdgeKey,
        point: Point,
    ) -> Option<VertexKey> {
        let e_left_right = edge;
        let (p_left, p_right) = self.edge_points(e_left_right)?;
        let (is_real, is_constrained, segments, e_right_left, v_left) = {
            let e = self.edges.get(e_left_right)?;
            (e.is_real, e.is_constrained, e.segments.clone(), e.opposite, e.origin)
        };
        let v_right = self.edges.get(e_right_left)?.origin;

        if point.distance_squared(p_left) <= EPSILON_SQUARED {
            return Some(v_left);
        }
        if point.distance_squared(p_right) <= EPSILON_SQUARED {
            return Some(v_right);
        }

        let e_right_top = self.next_left(e_left_right)?;
        let e_top_left = self.next_left(e_right_top)?;
        let e_left_bot = self.next_left(e_right_left)?;
        let e_bot_right = self.next_left(e_left_bot)?;
        let v_top = self.edges.get(e_top_left)?.origin;
        let v_bot = self.edges.get(e_bot_right)?.origin;
        let f_top = self.edges.get(e_left_right)?.left_face;
        let f_bot = self.edges.get(e_right_left)?.left_face;
        let top_real = self.faces.get(f_top)?.is_real();
        let bot_real = self.faces.get(f_bot)?.is_real();

        let center = project_orthogonally(point, p_left, p_right);
        let v = self.add_vertex(center, true);

        let (e_left_center, e_center_left) =
            self.add_edge_pair(v_left, v, is_real, is_constrained);
        let (e_center_right, e_right_center) =
            self.add_edge_pair(v, v_right, is_real, is_constrained);
        let (e_top_center, e_center_top) = self.add_edge_pair(v_top, v, top_real, false);
        let (e_bot_center, e_center_bot) = self.add_edge_pair(v_bot, v, bot_real, false);

        let f_top_left = self.add_face(e_left_center, top_real);
        let f_top_right = self.add_face(e_center_right, top_real);
        let f_bot_right = self.add_face(e_right_center, bot_real);
        let f_bot_left = self.add_face(e_center_left, bot_real);

        self.link(e_left_center, e_center_top, f_top_left);
        self.link(e_center_top, e_top_left, f_top_left);
        self.link(e_top_left, e_left_center, f_top_left);

        self.link(e_center_right, e_right_top, f_top_right);
        self.link(e_right_top, e_top_center, f_top_right);
        self.link(e_top_center, e_center_right, f_top_right);

        self.link(e_right_center, e_center_bot, f_bot_right);
        self.link(e_center_bot, e_bot_right, f_bot_right);
        self.link(e_bot_right, e_right_center, f_bot_right);

        self.link(e_center_left, e_left_bot, f_bot_left);
        self.link(e_left_bot, e_bot_center, f_bot_left);
        self.link(e_bot_center, e_center_left, f_bot_left);

        if is_constrained {
            for &s in &segments {
                for e in [e_left_center, e_center_left, e_center_right, e_right_center] {
                    if let Some(edge) = self.edges.get_mut(e) {
                        edge.add_segment(s);
                    }
                }
                if let Some(segment) = self.segments.get_mut(s)
                    && !segment.replace_edge(e_left_right, &[e_left_center, e_center_right])
                    && !segment.replace_edge(e_right_left, &[e_right_center, e_center_left])
                {
                    tracing::warn!(?s, ?edge, "split constrained edge missing from its segment");
                }
                if let Some(vertex) = self.vertices.get_mut(v) {
                    vertex.add_segment(s);
                }
            }
        }

        self.set_vertex_edge(v, e_center_right);
        if self.vertices.get(v_left).is_some_and(|v| v.edge == e_left_right) {
            self.set_vertex_edge(v_left, e_left_center);
        }
        if self.vertices.get(v_right).is_some_and(|v| v.edge == e_right_left) {
            self.set_vertex_edge(v_right, e_right_center);
        }

        self.faces.remove(f_top);
        self.faces.remove(f_bot);
        self.remove_edge_pair(e_left_right);

        tracing::trace!(?v, ?edge, is_constrained, "split edge");
        ctx.set_center_vertex(Some(v));
        ctx.extend([e_top_left, e_left_bot, e_bot_right, e_right_top]);
        Some(v)
    }
}
