//! Serialization round-trips for points and mesh configuration.
//!
//! A mesh itself is not serialized; its vertex positions are, and rebuilding
//! from them must reproduce the same vertex set.

use approx::relative_eq;
use cdt_mesh::prelude::*;
use proptest::prelude::*;

fn points_approx_equal(p1: Point, p2: Point) -> bool {
    relative_eq!(p1.x(), p2.x(), epsilon = 1e-14, max_relative = 1e-14)
        && relative_eq!(p1.y(), p2.y(), epsilon = 1e-14, max_relative = 1e-14)
}

fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-100.0..100.0).prop_filter("must be finite", |x: &f64| x.is_finite())
}

proptest! {
    /// Property: a point survives a JSON round-trip.
    #[test]
    fn prop_point_json_roundtrip(x in finite_coordinate(), y in finite_coordinate()) {
        let p = Point::new(x, y);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        prop_assert!(points_approx_equal(p, back));
    }
}

#[test]
fn config_roundtrip_builds_the_same_mesh() {
    let config = MeshConfigBuilder::default()
        .width(120.0)
        .height(80.0)
        .border_scale(4.0)
        .bounded(true)
        .build()
        .unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let back: MeshConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let a = Mesh::with_config(&config).unwrap();
    let b = Mesh::with_config(&back).unwrap();
    assert_eq!(a.number_of_vertices(), b.number_of_vertices());
    assert_eq!(a.number_of_segments(), b.number_of_segments());
}

#[test]
fn config_defaults_fill_missing_fields() {
    let config: MeshConfig = serde_json::from_str(r#"{"width":10.0,"height":20.0}"#).unwrap();
    assert_eq!(config, MeshConfig::new(10.0, 20.0));
    assert!(serde_json::from_str::<MeshConfig>(r#"{"width":10.0}"#).is_err());
}

#[test]
fn vertex_positions_rebuild_the_mesh() {
    let mut mesh = Mesh::new(50.0, 50.0).unwrap();
    for p in [(5.0, 5.0), (45.0, 8.0), (30.0, 40.0), (12.0, 33.0), (25.0, 20.0)] {
        mesh.insert_vertex(p.into()).unwrap();
    }
    let points: Vec<Point> = mesh
        .vertices()
        .filter(|(_, v)| v.is_real())
        .map(|(_, v)| v.point())
        .collect();
    let json = serde_json::to_string(&points).unwrap();

    let restored: Vec<Point> = serde_json::from_str(&json).unwrap();
    let mut rebuilt = Mesh::new(50.0, 50.0).unwrap();
    for p in &restored {
        rebuilt.insert_vertex(*p).unwrap();
    }
    assert_eq!(rebuilt.number_of_vertices(), mesh.number_of_vertices());
    assert_eq!(rebuilt.number_of_faces(), mesh.number_of_faces());
    assert_eq!(rebuilt.is_valid(), Ok(()));
}
