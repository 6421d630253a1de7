//! End-to-end scenarios on a fresh 100 × 100 mesh.
//!
//! Each test builds a mesh through the public API only and checks counts,
//! constraint chains and the Delaunay property afterwards.

use cdt_mesh::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn chain_endpoints(mesh: &Mesh, segment: SegmentKey) -> (Point, Point) {
    let chain = mesh.segment(segment).unwrap().edges();
    let (start, _) = mesh.edge_points(chain[0]).unwrap();
    let (_, end) = mesh.edge_points(chain[chain.len() - 1]).unwrap();
    (start, end)
}

fn counts(mesh: &Mesh) -> (usize, usize, usize) {
    (
        mesh.number_of_vertices(),
        mesh.number_of_edges(),
        mesh.number_of_faces(),
    )
}

#[test]
fn first_vertex_fans_the_border_triangle() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    assert_eq!(counts(&mesh), (3, 6, 2));

    let v = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
    assert_eq!(counts(&mesh), (4, 12, 4));

    let fan = mesh.faces_around(v);
    assert_eq!(fan.len(), 3);
    assert!(fan.iter().all(|f| mesh.face(*f).unwrap().is_real()));
    for e in mesh.all_outgoing_edges(v) {
        assert!(mesh.is_delaunay(e));
    }
    assert_eq!(mesh.is_valid(), Ok(()));
}

#[test]
fn single_segment_is_a_constrained_chain() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    for p in [(30.0, 70.0), (70.0, 30.0), (20.0, 45.0), (55.0, 80.0)] {
        mesh.insert_vertex(p.into()).unwrap();
    }
    let s = mesh
        .insert_constraint_segment(Point::new(10.0, 10.0), Point::new(90.0, 90.0))
        .unwrap();

    assert_eq!(
        chain_endpoints(&mesh, s),
        (Point::new(10.0, 10.0), Point::new(90.0, 90.0))
    );
    for &e in mesh.segment(s).unwrap().edges() {
        let edge = mesh.edge(e).unwrap();
        assert!(edge.is_constrained());
        assert!(mesh.edge(edge.opposite()).unwrap().is_constrained());
    }
    assert_eq!(mesh.is_valid(), Ok(()));
    assert_eq!(mesh.validate_delaunay(), Ok(()));
}

#[test]
fn crossing_segments_meet_at_a_shared_vertex() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    let first = mesh
        .insert_constraint_segment(Point::new(10.0, 10.0), Point::new(90.0, 90.0))
        .unwrap();
    let second = mesh
        .insert_constraint_segment(Point::new(10.0, 90.0), Point::new(90.0, 10.0))
        .unwrap();

    let (junction, vertex) = mesh
        .vertices()
        .find(|(_, v)| v.constraint_segments().len() == 2)
        .unwrap();
    assert!(vertex.point().distance_squared(Point::new(50.0, 50.0)) <= EPSILON_SQUARED);

    for s in [first, second] {
        let chain = mesh.segment(s).unwrap().edges();
        assert_eq!(chain.len(), 2);
        assert_eq!(mesh.destination(chain[0]), Some(junction));
        assert_eq!(mesh.edge(chain[1]).unwrap().origin(), junction);
    }
    assert_eq!(chain_endpoints(&mesh, second).0, Point::new(10.0, 90.0));

    assert!(!mesh.delete_vertex(junction));
    assert_eq!(mesh.is_valid(), Ok(()));
    assert_eq!(mesh.validate_delaunay(), Ok(()));
}

#[test]
fn vertex_on_a_constraint_splits_it_and_merges_back() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    let s = mesh
        .insert_constraint_segment(Point::new(10.0, 40.0), Point::new(90.0, 40.0))
        .unwrap();
    let before = counts(&mesh);

    let v = mesh.insert_vertex(Point::new(50.0, 40.0)).unwrap();
    assert_eq!(mesh.segment(s).unwrap().edges().len(), 2);
    assert_eq!(mesh.vertex(v).unwrap().constraint_segments(), &[s]);

    assert!(mesh.delete_vertex(v));
    assert_eq!(mesh.segment(s).unwrap().edges().len(), 1);
    assert_eq!(counts(&mesh), before);
    assert_eq!(mesh.is_valid(), Ok(()));
}

#[test]
fn locate_reports_every_kind_of_position() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    let v = mesh.insert_vertex(Point::new(50.0, 50.0)).unwrap();
    mesh.insert_vertex(Point::new(20.0, 20.0)).unwrap();

    assert_eq!(
        mesh.locate_position(Point::new(50.0, 50.0)),
        Ok(LocateResult::OnVertex(v))
    );
    assert!(matches!(
        mesh.locate_position(Point::new(35.0, 35.0)),
        Ok(LocateResult::OnEdge(_))
    ));
    assert!(matches!(
        mesh.locate_position(Point::new(60.0, 20.0)),
        Ok(LocateResult::InFace(_))
    ));
    assert!(mesh.locate_position(Point::new(f64::NAN, 1.0)).is_err());
}

#[test]
fn circle_query_sees_constraints_but_not_free_edges() {
    init_tracing();
    let mut mesh = Mesh::new(100.0, 100.0).unwrap();
    for p in [(20.0, 20.0), (80.0, 20.0), (50.0, 80.0)] {
        mesh.insert_vertex(p.into()).unwrap();
    }
    assert!(!mesh.is_circle_intersecting_any_constraint(Point::new(50.0, 40.0), 5.0));

    mesh.insert_constraint_segment(Point::new(10.0, 60.0), Point::new(90.0, 60.0))
        .unwrap();
    assert!(mesh.is_circle_intersecting_any_constraint(Point::new(50.0, 57.0), 5.0));
    assert!(!mesh.is_circle_intersecting_any_constraint(Point::new(50.0, 40.0), 5.0));
    assert!(mesh.is_circle_intersecting_any_constraint(Point::new(150.0, 40.0), 1.0));
}
