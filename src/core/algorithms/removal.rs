//! Vertex deletion.
//!
//! Removing a vertex leaves a star-shaped hole bounded by the far edges of
//! its fan. A free vertex's hole is filled in one piece. A vertex sitting in
//! the middle of exactly one constraint (two incident constrained edges) has
//! those two edges merged into one, which cuts the hole into two polygons
//! filled independently.

use crate::core::algorithms::flips::OperationContext;
use crate::core::mesh::{EdgeKey, Mesh, VertexKey};

impl Mesh {
    /// Deletes a real vertex and re-triangulates the hole it leaves.
    ///
    /// Refuses (returns `false`) for stale or border-closing vertices, for
    /// endpoints of a constraint segment, and for vertices where more than
    /// two constrained edges meet.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// let s = mesh
    ///     .insert_constraint_segment(Point::new(10.0, 50.0), Point::new(90.0, 50.0))
    ///     .unwrap();
    /// let middle = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
    /// assert_eq!(mesh.segment(s).unwrap().edges().len(), 2);
    ///
    /// // The two halves of the constraint merge back into one edge.
    /// assert!(mesh.delete_vertex(middle));
    /// assert_eq!(mesh.segment(s).unwrap().edges().len(), 1);
    ///
    /// // Endpoints of a constraint cannot be deleted.
    /// let (first, _) = mesh.edge_points(mesh.segment(s).unwrap().edges()[0]).unwrap();
    /// let endpoint = mesh.vertices().find(|(_, v)| v.point() == first).unwrap().0;
    /// assert!(!mesh.delete_vertex(endpoint));
    /// ```
    pub fn delete_vertex(&mut self, vertex: VertexKey) -> bool {
        let Some(v) = self.vertices.get(vertex) else {
            return false;
        };
        if !v.is_real() {
            tracing::debug!(?vertex, "refusing to delete a border-closing vertex");
            return false;
        }
        let is_endpoint = v.segments.iter().any(|s| {
            self.segments.get(*s).is_some_and(|seg| {
                let first = seg.edges.first().and_then(|e| self.edges.get(*e)).map(|e| e.origin);
                let last = seg.edges.last().and_then(|e| self.destination(*e));
                first == Some(vertex) || last == Some(vertex)
            })
        });
        if is_endpoint {
            tracing::debug!(?vertex, "refusing to delete a constraint endpoint");
            return false;
        }

        let fan: Vec<EdgeKey> = self.all_outgoing_edges(vertex).collect();
        if fan.len() < 3 {
            tracing::warn!(?vertex, degree = fan.len(), "vertex fan is broken");
            return false;
        }
        let constrained: Vec<usize> = fan
            .iter()
            .enumerate()
            .filter(|(_, e)| self.edges.get(**e).is_some_and(|e| e.is_constrained))
            .map(|(i, _)| i)
            .collect();

        let deleted = match constrained.as_slice() {
            [] => self.delete_free_vertex(vertex, &fan),
            &[i, j] => self.delete_constrained_vertex(vertex, &fan, i, j),
            _ => {
                tracing::debug!(
                    ?vertex,
                    constrained = constrained.len(),
                    "refusing to delete a constraint junction"
                );
                false
            }
        };
        if deleted && self.last_inserted == Some(vertex) {
            self.last_inserted = None;
        }
        deleted
    }

    fn delete_free_vertex(&mut self, vertex: VertexKey, fan: &[EdgeKey]) -> bool {
        let Some(bound) = fan.iter().map(|e| self.next_left(*e)).collect::<Option<Vec<_>>>() else {
            return false;
        };
        self.remove_star(vertex, fan);
        self.triangulate(&bound, true);
        self.check_hole_links(&bound);

        let mut ctx = OperationContext::new();
        ctx.extend(bound);
        self.restore_as_delaunay(&mut ctx);
        tracing::trace!(?vertex, "deleted free vertex");
        true
    }

    /// `fan[i]` and `fan[j]` (`i < j`) are the two constrained edges.
    fn delete_constrained_vertex(
        &mut self,
        vertex: VertexKey,
        fan: &[EdgeKey],
        i: usize,
        j: usize,
    ) -> bool {
        let n = fan.len();
        if j - i < 2 || n - (j - i) < 2 {
            tracing::debug!(?vertex, "refusing to merge constrained edges of a sliver triangle");
            return false;
        }

        let (e_a, e_b) = (fan[i], fan[j]);
        let (Some(a), Some(b)) = (self.destination(e_a), self.destination(e_b)) else {
            return false;
        };
        let (Some(a_v), Some(b_v)) = (
            self.edges.get(e_a).map(|e| e.opposite),
            self.edges.get(e_b).map(|e| e.opposite),
        ) else {
            return false;
        };
        let Some(bound) = fan.iter().map(|e| self.next_left(*e)).collect::<Option<Vec<_>>>() else {
            return false;
        };
        let real_a = self.face_is_real(e_a);
        let real_b = self.face_is_real(e_b);
        let segments = self.edges.get(e_a).map(|e| e.segments.clone()).unwrap_or_default();

        let (e_ab, e_ba) = self.add_edge_pair(a, b, true, true);
        for &s in &segments {
            for e in [e_ab, e_ba] {
                if let Some(edge) = self.edges.get_mut(e) {
                    edge.add_segment(s);
                }
            }
            if let Some(segment) = self.segments.get_mut(s) {
                let chain = &segment.edges;
                let found = chain.windows(2).position(|w| {
                    (w[0] == a_v && w[1] == e_b) || (w[0] == b_v && w[1] == e_a)
                });
                match found {
                    Some(k) => {
                        let merged = if chain[k] == a_v { e_ab } else { e_ba };
                        segment.edges.splice(k..k + 2, [merged]);
                    }
                    None => tracing::warn!(?s, ?vertex, "constraint chain does not pass through vertex"),
                }
            }
        }

        // Fan edges i..j bound the polygon from a round to b, the rest from b to a.
        let mut poly_a = Vec::with_capacity(j - i + 1);
        poly_a.push(e_ba);
        poly_a.extend_from_slice(&bound[i..j]);
        let mut poly_b = Vec::with_capacity(n - (j - i) + 1);
        poly_b.push(e_ab);
        poly_b.extend_from_slice(&bound[j..]);
        poly_b.extend_from_slice(&bound[..i]);

        self.remove_star(vertex, fan);
        self.triangulate(&poly_a, real_a);
        self.triangulate(&poly_b, real_b);
        self.check_hole_links(&bound);

        let mut ctx = OperationContext::new();
        ctx.extend(bound);
        self.restore_as_delaunay(&mut ctx);
        tracing::trace!(?vertex, "deleted vertex inside a constraint");
        true
    }

    /// Removes a vertex together with its fan of edges and faces, pointing
    /// each neighbour at its edge on the hole boundary.
    fn remove_star(&mut self, vertex: VertexKey, fan: &[EdgeKey]) {
        for &e in fan {
            let Some(edge) = self.edges.get(e) else {
                continue;
            };
            let (face, next) = (edge.left_face, edge.next_left);
            if let Some(destination) = self.destination(e) {
                self.set_vertex_edge(destination, next);
            }
            self.faces.remove(face);
        }
        for &e in fan {
            self.remove_edge_pair(e);
        }
        self.vertices.remove(vertex);
    }

    fn face_is_real(&self, edge: EdgeKey) -> bool {
        self.edges
            .get(edge)
            .and_then(|e| self.faces.get(e.left_face))
            .is_none_or(|f| f.is_real())
    }

    /// Debug-build check that every hole boundary edge was closed into a
    /// live face.
    fn check_hole_links(&self, bound: &[EdgeKey]) {
        if cfg!(debug_assertions) {
            for &e in bound {
                let linked = self.edges.get(e).is_some_and(|edge| {
                    self.edges.contains_key(edge.next_left) && self.faces.contains_key(edge.left_face)
                });
                if !linked {
                    tracing::warn!(edge = ?e, "hole boundary edge has no next_left after re-triangulation");
                }
            }
        }
    }
}
