//! Transformable obstacles.
//!
//! A [`MeshObject`] is a set of coordinate pairs in its own local frame plus
//! a transform. Each pair becomes one constraint segment, and the whole object
//! is inserted into the mesh as one constraint shape. Moving an object marks
//! it changed; [`Mesh::update_objects`] re-inserts every changed object at
//! its new position.
//!
//! The world position of a local coordinate `p` is
//! `rotation * (scale ⊙ (p - pivot)) + translation`.

use nalgebra::{Rotation2, Vector2};

use crate::core::mesh::{EdgeKey, Mesh, ObjectKey, ShapeKey};
use crate::geometry::point::Point;

/// Obstacle made of constraint segments, placed by a 2D transform.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::prelude::*;
///
/// let square = MeshObject::new(vec![
///     (Point::new(-1.0, -1.0), Point::new(1.0, -1.0)),
///     (Point::new(1.0, -1.0), Point::new(1.0, 1.0)),
///     (Point::new(1.0, 1.0), Point::new(-1.0, 1.0)),
///     (Point::new(-1.0, 1.0), Point::new(-1.0, -1.0)),
/// ])
/// .with_scale(5.0, 5.0)
/// .with_translation(50.0, 50.0);
///
/// let mut mesh = Mesh::new(100.0, 100.0).unwrap();
/// let key = mesh.insert_object(square);
/// assert_eq!(mesh.object_edges(key).len(), 4);
///
/// mesh.object_mut(key).unwrap().set_translation(20.0, 30.0);
/// mesh.update_objects();
/// let (start, _) = mesh.edge_points(mesh.object_edges(key)[0]).unwrap();
/// assert_eq!(start, Point::new(15.0, 25.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MeshObject {
    coordinates: Vec<(Point, Point)>,
    pivot: Point,
    scale: Vector2<f64>,
    rotation: Rotation2<f64>,
    translation: Vector2<f64>,
    changed: bool,
    shape: Option<ShapeKey>,
}

impl MeshObject {
    /// Creates an object with the identity transform.
    #[must_use]
    pub fn new(coordinates: Vec<(Point, Point)>) -> Self {
        Self {
            coordinates,
            pivot: Point::default(),
            scale: Vector2::new(1.0, 1.0),
            rotation: Rotation2::identity(),
            translation: Vector2::zeros(),
            changed: true,
            shape: None,
        }
    }

    /// Sets the pivot that scaling and rotation are applied around.
    #[must_use]
    pub fn with_pivot(mut self, pivot: Point) -> Self {
        self.set_pivot(pivot);
        self
    }

    /// Sets the per-axis scale.
    #[must_use]
    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.set_scale(sx, sy);
        self
    }

    /// Sets the counter-clockwise rotation in radians.
    #[must_use]
    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.set_rotation(angle);
        self
    }

    /// Sets the translation.
    #[must_use]
    pub fn with_translation(mut self, tx: f64, ty: f64) -> Self {
        self.set_translation(tx, ty);
        self
    }

    /// Coordinate pairs in the local frame.
    #[must_use]
    pub fn coordinates(&self) -> &[(Point, Point)] {
        &self.coordinates
    }

    /// Replaces the coordinate pairs.
    pub fn set_coordinates(&mut self, coordinates: Vec<(Point, Point)>) {
        self.coordinates = coordinates;
        self.changed = true;
    }

    /// Pivot in the local frame.
    #[must_use]
    pub const fn pivot(&self) -> Point {
        self.pivot
    }

    /// Moves the pivot.
    pub const fn set_pivot(&mut self, pivot: Point) {
        self.pivot = pivot;
        self.changed = true;
    }

    /// Per-axis scale.
    #[must_use]
    pub fn scale(&self) -> (f64, f64) {
        (self.scale.x, self.scale.y)
    }

    /// Changes the per-axis scale.
    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scale = Vector2::new(sx, sy);
        self.changed = true;
    }

    /// Rotation angle in radians.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation.angle()
    }

    /// Changes the rotation, in radians.
    pub fn set_rotation(&mut self, angle: f64) {
        self.rotation = Rotation2::new(angle);
        self.changed = true;
    }

    /// Translation applied last.
    #[must_use]
    pub fn translation(&self) -> (f64, f64) {
        (self.translation.x, self.translation.y)
    }

    /// Changes the translation.
    pub fn set_translation(&mut self, tx: f64, ty: f64) {
        self.translation = Vector2::new(tx, ty);
        self.changed = true;
    }

    /// Whether the object moved since it was last inserted.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed
    }

    /// Constraint shape currently holding the object, if inserted.
    #[must_use]
    pub const fn shape(&self) -> Option<ShapeKey> {
        self.shape
    }

    /// Maps a local coordinate to the world frame.
    #[must_use]
    pub fn transform(&self, p: Point) -> Point {
        let local = Vector2::new(p.x() - self.pivot.x(), p.y() - self.pivot.y());
        let world = self.rotation * local.component_mul(&self.scale) + self.translation;
        Point::new(world.x, world.y)
    }

    /// Coordinate pairs in the world frame.
    #[must_use]
    pub fn world_coordinates(&self) -> Vec<(Point, Point)> {
        self.coordinates
            .iter()
            .map(|&(p, q)| (self.transform(p), self.transform(q)))
            .collect()
    }
}

impl Mesh {
    /// Inserts an object, placing its segments at their world positions.
    ///
    /// The object is stored even if none of its segments fall inside the
    /// domain; it then holds no shape until a later update moves it in.
    pub fn insert_object(&mut self, mut object: MeshObject) -> ObjectKey {
        object.shape = self.insert_segment_pairs(&object.world_coordinates());
        object.changed = false;
        let key = self.objects.insert(object);
        tracing::debug!(?key, "inserted object");
        key
    }

    /// Removes an object and its constraint shape.
    ///
    /// Returns `false` if the object does not exist.
    pub fn delete_object(&mut self, key: ObjectKey) -> bool {
        let Some(object) = self.objects.remove(key) else {
            return false;
        };
        if let Some(shape) = object.shape {
            self.delete_constraint_shape(shape);
        }
        true
    }

    /// Re-inserts every changed object at its current transform.
    ///
    /// Returns the number of objects updated.
    pub fn update_objects(&mut self) -> usize {
        let changed: Vec<ObjectKey> = self
            .objects
            .iter()
            .filter(|(_, o)| o.changed)
            .map(|(k, _)| k)
            .collect();

        for &key in &changed {
            if let Some(old) = self.objects.get(key).and_then(|o| o.shape) {
                self.delete_constraint_shape(old);
            }
            self.reinsert_object(key);
        }
        if !changed.is_empty() {
            tracing::debug!(objects = changed.len(), "updated moved objects");
        }
        changed.len()
    }

    fn reinsert_object(&mut self, key: ObjectKey) {
        let Some(pairs) = self.objects.get(key).map(MeshObject::world_coordinates) else {
            return;
        };
        let shape = self.insert_segment_pairs(&pairs);
        if let Some(object) = self.objects.get_mut(key) {
            object.shape = shape;
            object.changed = false;
        }
    }

    /// Returns the object for a key, if it exists.
    #[must_use]
    pub fn object(&self, key: ObjectKey) -> Option<&MeshObject> {
        self.objects.get(key)
    }

    /// Mutable access for moving an object; changes apply on the next
    /// [`Mesh::update_objects`].
    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut MeshObject> {
        self.objects.get_mut(key)
    }

    /// Iterates over all stored objects.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &MeshObject)> {
        self.objects.iter()
    }

    /// Edges of the object's constraint shape, in segment order.
    #[must_use]
    pub fn object_edges(&self, key: ObjectKey) -> Vec<EdgeKey> {
        self.objects
            .get(key)
            .and_then(|o| o.shape)
            .map(|shape| self.get_edges_for_object(shape))
            .unwrap_or_default()
    }
}
