//! The constrained Delaunay half-edge mesh.
//!
//! [`Mesh`] owns every vertex, half-edge, face, constraint segment and shape
//! of a triangulation covering the rectangle `[0, width] × [0, height]`. All
//! entities live in generational arenas and are addressed by the key types
//! defined here; a key to an entity that has since been deleted resolves to
//! `None` rather than to whatever later reuses its slot.
//!
//! # Border-closing triangle
//!
//! A fresh mesh is not empty: the domain is enclosed in one large triangle
//! whose three corners are *non-real* vertices placed far outside the
//! rectangle. The triangle's interior is a single real face and its exterior
//! is a single non-real face, so every face of the mesh is a triangle and
//! every in-domain point always has an enclosing face. The three edges between
//! the non-real corners are the only non-real edges; they are never flipped.
//!
//! # Invariants
//!
//! After every public operation:
//!
//! | Invariant | Checked by |
//! |---|---|
//! | `next_left` cycles have length three and agree on `left_face` | [`Mesh::is_valid`] |
//! | `opposite` is an involution with reversed endpoints | [`Mesh::is_valid`] |
//! | A vertex's stored edge is live and leaves that vertex | [`Mesh::is_valid`] |
//! | Constraint chains are contiguous and ownership is symmetric | [`Mesh::is_valid`] |
//! | No two vertices lie within ε of each other | [`Mesh::is_valid`] |
//! | Unconstrained real edges are locally Delaunay | [`Mesh::validate_delaunay`] |
//!
//! # Examples
//!
//! ```rust
//! use cdt_mesh::prelude::*;
//!
//! let mut mesh = Mesh::new(100.0, 100.0).unwrap();
//! assert_eq!(mesh.number_of_vertices(), 3);
//! assert_eq!(mesh.number_of_faces(), 2);
//!
//! let v = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
//! assert_eq!(mesh.vertex(v).unwrap().point(), Point::new(50.0, 50.0));
//! assert_eq!(mesh.number_of_vertices(), 4);
//! assert!(mesh.is_valid().is_ok());
//! ```

#![forbid(unsafe_code)]

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::builder::MeshConfig;
use crate::core::collections::StorageMap;
use crate::core::constraint::{ConstraintSegment, ConstraintShape};
use crate::core::edge::Edge;
use crate::core::face::Face;
use crate::core::object::MeshObject;
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;

// =============================================================================
// KEY TYPES
// =============================================================================

new_key_type! {
    /// Handle to a [`Vertex`] stored in a [`Mesh`].
    pub struct VertexKey;
}

new_key_type! {
    /// Handle to a half-edge ([`Edge`]) stored in a [`Mesh`].
    pub struct EdgeKey;
}

new_key_type! {
    /// Handle to a [`Face`] stored in a [`Mesh`].
    pub struct FaceKey;
}

new_key_type! {
    /// Handle to a [`ConstraintSegment`] stored in a [`Mesh`].
    pub struct SegmentKey;
}

new_key_type! {
    /// Handle to a [`ConstraintShape`] stored in a [`Mesh`].
    pub struct ShapeKey;
}

new_key_type! {
    /// Handle to a [`MeshObject`] stored in a [`Mesh`].
    pub struct ObjectKey;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while constructing a [`Mesh`].
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MeshError {
    /// Width or height is not a finite, strictly positive number.
    #[error("Invalid domain {width} x {height}: dimensions must be finite and positive")]
    InvalidDomain {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// The border-closing triangle would not enclose the domain.
    #[error("Invalid border triangle scale {scale}: must be finite and at least 1")]
    InvalidBorderScale {
        /// Requested scale factor.
        scale: f64,
    },
}

// =============================================================================
// MESH
// =============================================================================

/// Half-edge mesh of a constrained Delaunay triangulation over a rectangle.
///
/// The mesh is the sole mutator of its entities. It is `Send` and `Sync` but
/// not internally synchronized; mutation requires `&mut self`.
#[derive(Clone, Debug)]
pub struct Mesh {
    width: f64,
    height: f64,
    pub(crate) vertices: StorageMap<VertexKey, Vertex>,
    pub(crate) edges: StorageMap<EdgeKey, Edge>,
    pub(crate) faces: StorageMap<FaceKey, Face>,
    pub(crate) segments: StorageMap<SegmentKey, ConstraintSegment>,
    pub(crate) shapes: StorageMap<ShapeKey, ConstraintShape>,
    pub(crate) objects: StorageMap<ObjectKey, MeshObject>,
    border_shape: Option<ShapeKey>,
    /// Walk hint for the next point location.
    pub(crate) last_inserted: Option<VertexKey>,
    next_id: u64,
}

impl Mesh {
    /// Creates a mesh covering `[0, width] × [0, height]`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidDomain`] if either dimension is not finite
    /// and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, MeshError> {
        Self::with_config(&MeshConfig::new(width, height))
    }

    /// Creates a mesh from a [`MeshConfig`].
    ///
    /// With [`MeshConfig::bounded`] set, the domain rectangle is inserted as a
    /// constraint shape, available afterwards through [`Mesh::border_shape`].
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if the domain or border scale is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdt_mesh::prelude::*;
    ///
    /// let config = MeshConfigBuilder::default()
    ///     .width(200.0)
    ///     .height(50.0)
    ///     .bounded(true)
    ///     .build()
    ///     .unwrap();
    /// let mesh = Mesh::with_config(&config).unwrap();
    /// let border = mesh.border_shape().unwrap();
    /// assert_eq!(mesh.shape(border).unwrap().segments().len(), 4);
    /// ```
    pub fn with_config(config: &MeshConfig) -> Result<Self, MeshError> {
        let (width, height) = (config.width, config.height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(MeshError::InvalidDomain { width, height });
        }
        let scale = config.border_scale;
        if !(scale.is_finite() && scale >= 1.0) {
            return Err(MeshError::InvalidBorderScale { scale });
        }

        let mut mesh = Self {
            width,
            height,
            vertices: StorageMap::with_key(),
            edges: StorageMap::with_key(),
            faces: StorageMap::with_key(),
            segments: StorageMap::with_key(),
            shapes: StorageMap::with_key(),
            objects: StorageMap::with_key(),
            border_shape: None,
            last_inserted: None,
            next_id: 0,
        };
        mesh.close_domain(scale);

        if config.bounded {
            let corners = [
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
            ];
            mesh.border_shape = mesh.insert_constraint_polygon(&corners);
            tracing::debug!(border = ?mesh.border_shape, "inserted domain border");
        }
        Ok(mesh)
    }

    /// Builds the border-closing triangle around the domain.
    fn close_domain(&mut self, scale: f64) {
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        let r = scale * self.width.max(self.height);

        let a = self.add_vertex(center + Point::new(-2.0 * r, -r), false);
        let b = self.add_vertex(center + Point::new(2.0 * r, -r), false);
        let c = self.add_vertex(center + Point::new(0.0, 2.0 * r), false);

        let (ab, ba) = self.add_edge_pair(a, b, false, false);
        let (bc, cb) = self.add_edge_pair(b, c, false, false);
        let (ca, ac) = self.add_edge_pair(c, a, false, false);

        let inner = self.add_face(ab, true);
        let outer = self.add_face(ba, false);

        self.link(ab, bc, inner);
        self.link(bc, ca, inner);
        self.link(ca, ab, inner);
        self.link(ba, ac, outer);
        self.link(ac, cb, outer);
        self.link(cb, ba, outer);

        self.set_vertex_edge(a, ab);
        self.set_vertex_edge(b, bc);
        self.set_vertex_edge(c, ca);
    }

    // =========================================================================
    // DOMAIN
    // =========================================================================

    /// Width of the domain rectangle.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height of the domain rectangle.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Whether `point` lies in the closed domain rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x()) && (0.0..=self.height).contains(&point.y())
    }

    /// Shape holding the domain border, for meshes built with
    /// [`MeshConfig::bounded`].
    #[must_use]
    pub const fn border_shape(&self) -> Option<ShapeKey> {
        self.border_shape
    }

    pub(crate) const fn clear_border_shape(&mut self) {
        self.border_shape = None;
    }

    // =========================================================================
    // ENTITY ACCESS
    // =========================================================================

    /// Looks up a vertex.
    #[must_use]
    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex> {
        self.vertices.get(key)
    }

    /// Looks up a half-edge.
    #[must_use]
    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    /// Looks up a face.
    #[must_use]
    pub fn face(&self, key: FaceKey) -> Option<&Face> {
        self.faces.get(key)
    }

    /// Looks up a constraint segment.
    #[must_use]
    pub fn segment(&self, key: SegmentKey) -> Option<&ConstraintSegment> {
        self.segments.get(key)
    }

    /// Looks up a constraint shape.
    #[must_use]
    pub fn shape(&self, key: ShapeKey) -> Option<&ConstraintShape> {
        self.shapes.get(key)
    }

    /// Iterates over all vertices, including the three non-real ones.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> {
        self.vertices.iter()
    }

    /// Iterates over all half-edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> {
        self.edges.iter()
    }

    /// Iterates over all faces, including the non-real outer face.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &Face)> {
        self.faces.iter()
    }

    /// Iterates over all constraint segments.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentKey, &ConstraintSegment)> {
        self.segments.iter()
    }

    /// Iterates over all constraint shapes.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeKey, &ConstraintShape)> {
        self.shapes.iter()
    }

    /// Number of vertices, including the three non-real ones.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges (twice the number of undirected edges).
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces, including the non-real outer face.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of constraint segments.
    #[must_use]
    pub fn number_of_segments(&self) -> usize {
        self.segments.len()
    }

    /// Number of constraint shapes.
    #[must_use]
    pub fn number_of_shapes(&self) -> usize {
        self.shapes.len()
    }

    /// Position of a vertex.
    #[must_use]
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point> {
        self.vertices.get(key).map(Vertex::point)
    }

    /// Half-edges of a shape's segments, concatenated in insertion order.
    ///
    /// This is the edge set an overlay graph builds its nodes from.
    #[must_use]
    pub fn get_edges_for_object(&self, shape: ShapeKey) -> Vec<EdgeKey> {
        self.shapes.get(shape).map_or_else(Vec::new, |shape| {
            shape
                .segments
                .iter()
                .filter_map(|s| self.segments.get(*s))
                .flat_map(|s| s.edges.iter().copied())
                .collect()
        })
    }

    // =========================================================================
    // DERIVED HALF-EDGE ACCESSORS
    // =========================================================================

    /// Vertex a half-edge points to.
    #[must_use]
    pub fn destination(&self, edge: EdgeKey) -> Option<VertexKey> {
        let opposite = self.edges.get(edge)?.opposite;
        Some(self.edges.get(opposite)?.origin)
    }

    /// Origin and destination positions of a half-edge.
    #[must_use]
    pub fn edge_points(&self, edge: EdgeKey) -> Option<(Point, Point)> {
        let origin = self.vertex_point(self.edges.get(edge)?.origin)?;
        let destination = self.vertex_point(self.destination(edge)?)?;
        Some((origin, destination))
    }

    /// Next half-edge around the left face.
    #[must_use]
    pub fn next_left(&self, edge: EdgeKey) -> Option<EdgeKey> {
        Some(self.edges.get(edge)?.next_left)
    }

    /// Previous half-edge around the left face.
    #[must_use]
    pub fn prev_left(&self, edge: EdgeKey) -> Option<EdgeKey> {
        self.next_left(self.next_left(edge)?)
    }

    /// Next half-edge around the right face, leaving the destination.
    #[must_use]
    pub fn next_right(&self, edge: EdgeKey) -> Option<EdgeKey> {
        let opposite = self.edges.get(edge)?.opposite;
        let prev = self.prev_left(opposite)?;
        Some(self.edges.get(prev)?.opposite)
    }

    /// Previous half-edge around the right face, entering the origin.
    #[must_use]
    pub fn prev_right(&self, edge: EdgeKey) -> Option<EdgeKey> {
        let opposite = self.edges.get(edge)?.opposite;
        let next = self.next_left(opposite)?;
        Some(self.edges.get(next)?.opposite)
    }

    /// Next outgoing half-edge counter-clockwise around the origin.
    #[must_use]
    pub fn rot_left(&self, edge: EdgeKey) -> Option<EdgeKey> {
        let prev = self.prev_left(edge)?;
        Some(self.edges.get(prev)?.opposite)
    }

    /// Next outgoing half-edge clockwise around the origin.
    #[must_use]
    pub fn rot_right(&self, edge: EdgeKey) -> Option<EdgeKey> {
        let opposite = self.edges.get(edge)?.opposite;
        self.next_left(opposite)
    }

    /// Face on the right of a half-edge.
    #[must_use]
    pub fn right_face(&self, edge: EdgeKey) -> Option<FaceKey> {
        let opposite = self.edges.get(edge)?.opposite;
        Some(self.edges.get(opposite)?.left_face)
    }

    /// The three half-edges bounding a face, starting at its stored edge.
    #[must_use]
    pub fn face_edges(&self, face: FaceKey) -> Option<[EdgeKey; 3]> {
        let e0 = self.faces.get(face)?.edge;
        let e1 = self.next_left(e0)?;
        let e2 = self.next_left(e1)?;
        Some([e0, e1, e2])
    }

    /// The three corners of a face, in counter-clockwise order for real faces.
    #[must_use]
    pub fn face_vertices(&self, face: FaceKey) -> Option<[VertexKey; 3]> {
        let [e0, e1, e2] = self.face_edges(face)?;
        Some([
            self.edges.get(e0)?.origin,
            self.edges.get(e1)?.origin,
            self.edges.get(e2)?.origin,
        ])
    }

    // =========================================================================
    // CRATE-INTERNAL CONSTRUCTION
    // =========================================================================

    pub(crate) const fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn add_vertex(&mut self, point: Point, is_real: bool) -> VertexKey {
        let id = self.allocate_id();
        self.vertices.insert(Vertex::new(id, point, is_real))
    }

    /// Inserts two twin half-edges `origin -> destination` and back.
    pub(crate) fn add_edge_pair(
        &mut self,
        origin: VertexKey,
        destination: VertexKey,
        is_real: bool,
        is_constrained: bool,
    ) -> (EdgeKey, EdgeKey) {
        let id = self.allocate_id();
        let forward = self.edges.insert(Edge::new(id, origin, is_real, is_constrained));
        let id = self.allocate_id();
        let backward = self
            .edges
            .insert(Edge::new(id, destination, is_real, is_constrained));
        self.edges[forward].opposite = backward;
        self.edges[backward].opposite = forward;
        (forward, backward)
    }

    pub(crate) fn add_face(&mut self, edge: EdgeKey, is_real: bool) -> FaceKey {
        let id = self.allocate_id();
        self.faces.insert(Face::new(id, edge, is_real))
    }

    /// Sets the `next_left` and `left_face` links of a half-edge.
    pub(crate) fn link(&mut self, edge: EdgeKey, next_left: EdgeKey, left_face: FaceKey) {
        if let Some(e) = self.edges.get_mut(edge) {
            e.next_left = next_left;
            e.left_face = left_face;
        }
    }

    pub(crate) fn set_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.edge = edge;
        }
    }

    pub(crate) fn set_face_edge(&mut self, face: FaceKey, edge: EdgeKey) {
        if let Some(f) = self.faces.get_mut(face) {
            f.edge = edge;
        }
    }

    /// Removes a half-edge together with its twin.
    pub(crate) fn remove_edge_pair(&mut self, edge: EdgeKey) {
        if let Some(e) = self.edges.remove(edge) {
            self.edges.remove(e.opposite);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_a_closed_border_triangle() {
        let mesh = Mesh::new(100.0, 50.0).unwrap();
        assert_eq!(mesh.number_of_vertices(), 3);
        assert_eq!(mesh.number_of_edges(), 6);
        assert_eq!(mesh.number_of_faces(), 2);
        assert!(mesh.vertices().all(|(_, v)| !v.is_real()));
        assert!(mesh.edges().all(|(_, e)| !e.is_real()));
        assert_eq!(mesh.faces().filter(|(_, f)| f.is_real()).count(), 1);
        assert!(mesh.is_valid().is_ok());
    }

    #[test]
    fn border_triangle_encloses_domain() {
        let mesh = Mesh::new(30.0, 80.0).unwrap();
        let inner = mesh.faces().find(|(_, f)| f.is_real()).map(|(k, _)| k).unwrap();
        let [a, b, c] = mesh.face_vertices(inner).unwrap();
        let (a, b, c) = (
            mesh.vertex_point(a).unwrap(),
            mesh.vertex_point(b).unwrap(),
            mesh.vertex_point(c).unwrap(),
        );
        for corner in [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 80.0),
            Point::new(0.0, 80.0),
        ] {
            assert!((b - a).cross(corner - a) > 0.0);
            assert!((c - b).cross(corner - b) > 0.0);
            assert!((a - c).cross(corner - c) > 0.0);
        }
    }

    #[test]
    fn invalid_domains_are_rejected() {
        assert_eq!(
            Mesh::new(0.0, 10.0).unwrap_err(),
            MeshError::InvalidDomain {
                width: 0.0,
                height: 10.0
            }
        );
        assert!(Mesh::new(10.0, -1.0).is_err());
        assert!(Mesh::new(f64::NAN, 10.0).is_err());
        assert!(Mesh::new(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn derived_accessors_compose() {
        let mesh = Mesh::new(10.0, 10.0).unwrap();
        let inner = mesh.faces().find(|(_, f)| f.is_real()).map(|(k, _)| k).unwrap();
        let [e0, e1, e2] = mesh.face_edges(inner).unwrap();

        assert_eq!(mesh.prev_left(e0), Some(e2));
        assert_eq!(mesh.destination(e0), Some(mesh.edge(e1).unwrap().origin()));
        let twin = mesh.edge(e0).unwrap().opposite();
        assert_eq!(mesh.edge(twin).unwrap().opposite(), e0);
        assert_eq!(mesh.right_face(e0), Some(mesh.edge(twin).unwrap().left_face()));
        assert_eq!(mesh.rot_right(mesh.rot_left(e0).unwrap()), Some(e0));

        let next_right = mesh.next_right(e0).unwrap();
        assert_eq!(mesh.edge(next_right).unwrap().origin(), mesh.destination(e0).unwrap());
        let prev_right = mesh.prev_right(e0).unwrap();
        assert_eq!(mesh.destination(prev_right).unwrap(), mesh.edge(e0).unwrap().origin());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut mesh = Mesh::new(10.0, 10.0).unwrap();
        let before = mesh.vertices().map(|(_, v)| v.id()).max().unwrap();
        let v = mesh.insert_vertex(Point::new(5.0, 5.0)).unwrap();
        assert!(mesh.vertex(v).unwrap().id() > before);

        let mut ids: Vec<u64> = mesh
            .vertices()
            .map(|(_, v)| v.id())
            .chain(mesh.edges().map(|(_, e)| e.id()))
            .chain(mesh.faces().map(|(_, f)| f.id()))
            .collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn contains_point_is_closed_and_rejects_nan() {
        let mesh = Mesh::new(10.0, 20.0).unwrap();
        assert!(mesh.contains_point(Point::new(0.0, 0.0)));
        assert!(mesh.contains_point(Point::new(10.0, 20.0)));
        assert!(!mesh.contains_point(Point::new(10.1, 5.0)));
        assert!(!mesh.contains_point(Point::new(f64::NAN, 5.0)));
    }
}
