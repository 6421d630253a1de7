//! Carving polygonal holes and filling them again.
//!
//! [`Mesh::untriangulate`] removes the triangles crossed by a chain of
//! half-edges, leaving one polygonal hole. [`Mesh::triangulate`] fills a hole
//! given as a counter-clockwise cycle of half-edges, choosing for its first
//! edge the apex whose circumcircle is empty of the other boundary vertices
//! and recursing on the two sub-polygons that apex splits off.
//!
//! For a hole that every boundary vertex can see across its first edge (the
//! polygons on either side of a new constraint edge, or the star of a removed
//! vertex) the result is the constrained Delaunay triangulation of the hole.
//!
//! # References
//! - M. V. Anglada (1997) - "An Improved Incremental Algorithm for Constructing
//!   Restricted Delaunay Triangulations"

use crate::core::collections::FastHashSet;
use crate::core::mesh::{EdgeKey, Mesh};
use crate::geometry::point::Point;
use crate::geometry::predicates::{EPSILON_SQUARED, Side, circumcenter, side_of_line_with_tolerance};

impl Mesh {
    /// Removes the faces on both sides of a chain of half-edges, then the
    /// half-edges themselves.
    ///
    /// `intersected` must be oriented right to left across a constraint being
    /// inserted, ordered from its start to its end: the left face of each
    /// edge and the right face of the last one are exactly the triangles the
    /// constraint crosses. Each vertex of the chain is re-pointed at an edge
    /// on the hole boundary before anything is removed.
    pub(crate) fn untriangulate(&mut self, intersected: &[EdgeKey]) {
        let Some(&last) = intersected.last() else {
            return;
        };

        let mut cleaned = FastHashSet::default();
        for &e in intersected {
            let Some(edge) = self.edges.get(e) else {
                continue;
            };
            let origin = edge.origin;
            if cleaned.insert(origin)
                && let Some(prev) = self.prev_left(e)
                && let Some(keep) = self.edges.get(prev).map(|p| p.opposite)
            {
                self.set_vertex_edge(origin, keep);
            }
            if let Some(destination) = self.destination(e)
                && cleaned.insert(destination)
                && let Some(keep) = self.next_left(e)
            {
                self.set_vertex_edge(destination, keep);
            }
        }

        let mut faces: Vec<_> = intersected
            .iter()
            .filter_map(|e| self.edges.get(*e).map(|edge| edge.left_face))
            .collect();
        faces.extend(self.right_face(last));
        for f in faces {
            self.faces.remove(f);
        }
        for &e in intersected {
            self.remove_edge_pair(e);
        }
        tracing::trace!(edges = intersected.len(), "untriangulated constraint corridor");
    }

    /// Fills the hole bounded by the counter-clockwise cycle `bound`,
    /// returning the half-edges it created.
    ///
    /// Each boundary half-edge must have the hole on its left; after the call
    /// its `next_left` and `left_face` point into the new triangles.
    pub(crate) fn triangulate(&mut self, bound: &[EdgeKey], is_real: bool) -> Vec<EdgeKey> {
        let mut created = Vec::new();
        self.triangulate_into(bound, is_real, &mut created);
        created
    }

    fn triangulate_into(&mut self, bound: &[EdgeKey], is_real: bool, created: &mut Vec<EdgeKey>) {
        match bound.len() {
            0 | 1 => {
                tracing::warn!(edges = bound.len(), "cannot triangulate a hole with fewer than two edges");
                return;
            }
            2 => {
                tracing::warn!(?bound, "cannot triangulate a hole with exactly two edges");
                return;
            }
            3 => {
                self.make_face(bound[0], bound[1], bound[2], is_real);
                return;
            }
            _ => {}
        }

        let origins: Option<Vec<_>> = bound
            .iter()
            .map(|e| self.edges.get(*e).map(|edge| edge.origin))
            .collect();
        let points: Option<Vec<Point>> = origins
            .as_ref()
            .and_then(|vs| vs.iter().map(|v| self.vertex_point(*v)).collect());
        let (Some(origins), Some(points)) = (origins, points) else {
            tracing::warn!(?bound, "hole boundary references missing entities");
            return;
        };

        let index = delaunay_apex(&points).unwrap_or_else(|| {
            tracing::warn!(
                edges = bound.len(),
                "no Delaunay apex found for hole base, falling back to the first candidate"
            );
            first_left_of_base(&points).unwrap_or(2)
        });
        let n = bound.len();
        let (a, b, c) = (origins[0], origins[1], origins[index]);

        let c_to_a = if index < n - 1 {
            let (a_to_c, c_to_a) = self.add_edge_pair(a, c, is_real, false);
            created.extend([a_to_c, c_to_a]);
            let mut sub = Vec::with_capacity(n - index + 1);
            sub.push(a_to_c);
            sub.extend_from_slice(&bound[index..]);
            self.triangulate_into(&sub, is_real, created);
            c_to_a
        } else {
            bound[n - 1]
        };

        let b_to_c = if index > 2 {
            let (b_to_c, c_to_b) = self.add_edge_pair(b, c, is_real, false);
            created.extend([b_to_c, c_to_b]);
            let mut sub = Vec::with_capacity(index);
            sub.push(c_to_b);
            sub.extend_from_slice(&bound[1..index]);
            self.triangulate_into(&sub, is_real, created);
            b_to_c
        } else {
            bound[1]
        };

        self.make_face(bound[0], b_to_c, c_to_a, is_real);
    }

    /// Closes three half-edges into a new face and points their origins at
    /// them.
    fn make_face(&mut self, e0: EdgeKey, e1: EdgeKey, e2: EdgeKey, is_real: bool) {
        let face = self.add_face(e0, is_real);
        self.link(e0, e1, face);
        self.link(e1, e2, face);
        self.link(e2, e0, face);
        for e in [e0, e1, e2] {
            if let Some(origin) = self.edges.get(e).map(|edge| edge.origin)
                && self
                    .vertices
                    .get(origin)
                    .is_some_and(|v| self.edges.get(v.edge).is_none())
            {
                self.set_vertex_edge(origin, e);
            }
        }
    }
}

/// Index of the first boundary vertex (from 2 on) that lies left of the base
/// `points[0] -> points[1]` and whose circumcircle with the base holds no
/// other boundary vertex.
fn delaunay_apex(points: &[Point]) -> Option<usize> {
    let (a, b) = (points[0], points[1]);
    (2..points.len()).find(|&i| {
        let c = points[i];
        if side_of_line_with_tolerance(c, a, b) != Side::LEFT {
            return false;
        }
        let Some(center) = circumcenter(a, b, c) else {
            return false;
        };
        let radius_squared = center.distance_squared(a);
        (2..points.len())
            .filter(|&j| j != i)
            .all(|j| points[j].distance_squared(center) >= radius_squared - EPSILON_SQUARED)
    })
}

/// Index of the first boundary vertex (from 2 on) strictly left of the base.
fn first_left_of_base(points: &[Point]) -> Option<usize> {
    let (a, b) = (points[0], points[1]);
    (2..points.len()).find(|&i| side_of_line_with_tolerance(points[i], a, b) == Side::LEFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::VertexKey;

    #[test]
    fn apex_is_the_delaunay_choice() {
        // Base along the bottom; (5, 1) is the only apex whose circle is empty.
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 8.0),
            Point::new(5.0, 1.0),
            Point::new(0.0, 8.0),
        ];
        assert_eq!(delaunay_apex(&points), Some(3));
    }

    #[test]
    fn apex_skips_points_right_of_the_base() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, -30.0),
            Point::new(5.0, 4.0),
        ];
        assert_eq!(delaunay_apex(&points), Some(3));
    }

    #[test]
    fn fallback_skips_candidates_right_of_the_base() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(12.0, -3.0),
            Point::new(5.0, 0.0),
            Point::new(6.0, 5.0),
        ];
        assert_eq!(first_left_of_base(&points), Some(4));
        assert_eq!(first_left_of_base(&points[..4]), None);
    }

    #[test]
    fn cocircular_polygon_takes_first_candidate() {
        // Cocircular hexagon: every candidate has the others on its circle,
        // which the ε slack accepts, so the first candidate wins.
        let points: Vec<Point> = (0..6)
            .map(|k| {
                let t = f64::from(k) * std::f64::consts::PI / 3.0;
                Point::new(t.cos() * 5.0, t.sin() * 5.0)
            })
            .collect();
        assert_eq!(delaunay_apex(&points), Some(2));
    }

    #[test]
    fn hole_left_by_vertex_removal_is_refilled() {
        let mut mesh = Mesh::new(20.0, 20.0).unwrap();
        let ring = [
            (10.0, 4.0),
            (15.0, 7.0),
            (16.0, 12.0),
            (11.0, 16.0),
            (5.0, 14.0),
            (4.0, 8.0),
        ];
        for p in ring {
            mesh.insert_vertex(p.into()).unwrap();
        }
        let (faces, edges) = (mesh.number_of_faces(), mesh.number_of_edges());
        let center: VertexKey = mesh.insert_vertex(Point::new(10.0, 10.0)).unwrap();
        let degree = mesh.all_outgoing_edges(center).count();

        assert!(mesh.delete_vertex(center));
        assert_eq!(mesh.number_of_faces(), faces);
        assert_eq!(mesh.number_of_edges(), edges);
        assert!(degree >= 3);
        assert!(mesh.is_valid().is_ok());
        assert!(mesh.validate_delaunay().is_ok());
    }
}
