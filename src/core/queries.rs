//! Geometric predicates over mesh entities.
//!
//! Thin, read-only wrappers that resolve half-edge handles to positions and
//! hand them to [`crate::geometry`]. A stale handle makes the query report
//! `None` (or the neutral answer for boolean tests).

use std::collections::VecDeque;

use crate::core::algorithms::locate::LocateResult;
use crate::core::collections::FastHashSet;
use crate::core::mesh::{EdgeKey, FaceKey, Mesh, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{
    EPSILON_SQUARED, Side, circumcircle_contains, orient2d, side_of_line,
    side_of_line_with_tolerance,
};
use crate::geometry::util::{
    distance_squared_point_to_segment, segment_intersection, segment_intersects_circle,
};

impl Mesh {
    /// Exact side of `point` relative to the directed edge.
    #[must_use]
    pub fn relative_position(&self, point: Point, edge: EdgeKey) -> Option<Side> {
        let (a, b) = self.edge_points(edge)?;
        Some(side_of_line(point, a, b))
    }

    /// Side of `point` relative to the directed edge, [`Side::ON`] within ε of
    /// its supporting line.
    #[must_use]
    pub fn relative_position2(&self, point: Point, edge: EdgeKey) -> Option<Side> {
        let (a, b) = self.edge_points(edge)?;
        Some(side_of_line_with_tolerance(point, a, b))
    }

    /// Squared distance from a vertex to the segment spanned by an edge.
    #[must_use]
    pub fn distance_squared_vertex_to_edge(&self, vertex: VertexKey, edge: EdgeKey) -> Option<f64> {
        let p = self.vertex_point(vertex)?;
        let (a, b) = self.edge_points(edge)?;
        Some(distance_squared_point_to_segment(p, a, b))
    }

    /// Crossing point of two edges, endpoints included.
    #[must_use]
    pub fn intersections2edges(&self, a: EdgeKey, b: EdgeKey) -> Option<Point> {
        let (a1, a2) = self.edge_points(a)?;
        let (b1, b2) = self.edge_points(b)?;
        segment_intersection(a1, a2, b1, b2)
    }

    /// Crossing point of an edge with the segment `[p, q]`.
    pub(crate) fn edge_segment_intersection(&self, edge: EdgeKey, p: Point, q: Point) -> Option<Point> {
        let (a, b) = self.edge_points(edge)?;
        segment_intersection(a, b, p, q)
    }

    /// Local Delaunay test of the two triangles sharing `edge`.
    ///
    /// The edge passes when the far corner of the right triangle is not
    /// inside the circumcircle of the left triangle by more than ε². Non-real
    /// edges, stale handles and degenerate left triangles always pass.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// for p in [(20.0, 20.0), (80.0, 25.0), (55.0, 70.0), (40.0, 45.0)] {
    ///     mesh.insert_vertex(p.into()).unwrap();
    /// }
    /// assert!(mesh.edges().all(|(e, _)| mesh.is_delaunay(e)));
    /// ```
    #[must_use]
    pub fn is_delaunay(&self, edge: EdgeKey) -> bool {
        let Some(e) = self.edges.get(edge) else {
            return true;
        };
        if !e.is_real() {
            return true;
        }
        self.quad_points(edge)
            .is_none_or(|(left, right, corner, opposite)| {
                !circumcircle_contains(corner, left, right, opposite, EPSILON_SQUARED)
            })
    }

    /// Whether the quadrilateral formed by the two triangles around `edge` is
    /// strictly convex, i.e. whether the edge can be flipped.
    #[must_use]
    pub fn is_convex(&self, edge: EdgeKey) -> bool {
        self.quad_points(edge)
            .is_some_and(|(origin, destination, left, right)| {
                orient2d(origin, destination, left) > 0.0
                    && orient2d(origin, destination, right) < 0.0
                    && orient2d(right, left, origin) > 0.0
                    && orient2d(right, left, destination) < 0.0
            })
    }

    /// Origin, destination, left apex and right apex around an edge.
    fn quad_points(&self, edge: EdgeKey) -> Option<(Point, Point, Point, Point)> {
        let (origin, destination) = self.edge_points(edge)?;
        let left = self.vertex_point(self.destination(self.next_left(edge)?)?)?;
        let right = self.vertex_point(self.destination(self.next_right(edge)?)?)?;
        Some((origin, destination, left, right))
    }

    /// Classifies `point` against a face.
    ///
    /// Returns `None` when the point is strictly outside the face. Otherwise
    /// reports a corner within ε of the point, else the closest edge within ε,
    /// else the face itself.
    #[must_use]
    pub fn is_in_face(&self, point: Point, face: FaceKey) -> Option<LocateResult> {
        let edges = self.face_edges(face)?;
        for e in edges {
            if self.relative_position(point, e)? == Side::RIGHT {
                return None;
            }
        }

        for v in self.face_vertices(face)? {
            if self.vertex_point(v)?.distance_squared(point) <= EPSILON_SQUARED {
                return Some(LocateResult::OnVertex(v));
            }
        }

        let mut closest: Option<(EdgeKey, f64)> = None;
        for e in edges {
            let (a, b) = self.edge_points(e)?;
            let d = distance_squared_point_to_segment(point, a, b);
            if d <= EPSILON_SQUARED && closest.is_none_or(|(_, best)| d < best) {
                closest = Some((e, d));
            }
        }
        Some(closest.map_or(LocateResult::InFace(face), |(e, _)| LocateResult::OnEdge(e)))
    }

    /// Whether a disc touches any constrained edge.
    ///
    /// Flood-fills faces from the centre, crossing only unconstrained edges
    /// that the disc reaches. A centre outside the domain counts as touching
    /// the border.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    /// mesh.insert_constraint_segment(Point::new(20.0, 50.0), Point::new(80.0, 50.0)).unwrap();
    ///
    /// assert!(mesh.is_circle_intersecting_any_constraint(Point::new(50.0, 45.0), 6.0));
    /// assert!(!mesh.is_circle_intersecting_any_constraint(Point::new(50.0, 45.0), 4.0));
    /// assert!(mesh.is_circle_intersecting_any_constraint(Point::new(-1.0, 45.0), 0.5));
    /// ```
    #[must_use]
    pub fn is_circle_intersecting_any_constraint(&self, center: Point, radius: f64) -> bool {
        if !self.contains_point(center) {
            return true;
        }
        let start: Vec<FaceKey> = match self.locate_position(center) {
            Ok(LocateResult::OnVertex(v)) => {
                if self.vertex(v).is_some_and(|v| v.is_constrained()) {
                    return true;
                }
                self.faces_around(v)
            }
            Ok(LocateResult::OnEdge(e)) => {
                if self.edge(e).is_some_and(|e| e.is_constrained()) {
                    return true;
                }
                [self.edge(e).map(|e| e.left_face()), self.right_face(e)]
                    .into_iter()
                    .flatten()
                    .collect()
            }
            Ok(LocateResult::InFace(f)) => vec![f],
            Ok(LocateResult::Outside) => return true,
            Err(err) => {
                tracing::warn!(%err, %center, "circle query could not locate its centre");
                return true;
            }
        };

        let mut visited: FastHashSet<FaceKey> = start.iter().copied().collect();
        let mut queue: VecDeque<FaceKey> = start.into_iter().collect();
        while let Some(face) = queue.pop_front() {
            let Some(edges) = self.face_edges(face) else {
                continue;
            };
            for e in edges {
                let Some((a, b)) = self.edge_points(e) else {
                    continue;
                };
                if !segment_intersects_circle(a, b, center, radius) {
                    continue;
                }
                if self.edge(e).is_some_and(|e| e.is_constrained()) {
                    return true;
                }
                if let Some(next) = self.right_face(e)
                    && self.face(next).is_some_and(|f| f.is_real())
                    && visited.insert(next)
                {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}
