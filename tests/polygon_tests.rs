mod support;

use approx::assert_relative_eq;
use brushcsg::errors::ValidationError;
use brushcsg::model::bsp::IntersectionType;
use brushcsg::model::polygon::CoEdgeMode;
use brushcsg::{Plane, Polygon, Vertex};
use nalgebra::{Point2, Point3, Vector3};

use crate::support::{rect, total_area};

fn verts(points: &[[f64; 3]]) -> Vec<Vertex> {
    points.iter().map(|p| Vertex::new(Point3::from(*p))).collect()
}

#[test]
fn try_new_rejects_bad_input() {
    assert_eq!(
        Polygon::try_new(verts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])).unwrap_err(),
        ValidationError::TooFewPoints(2)
    );
    assert!(matches!(
        Polygon::try_new(verts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0, 0.0]])),
        Err(ValidationError::RepeatedPoint(_))
    ));
    assert!(matches!(
        Polygon::try_new(verts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]])),
        Err(ValidationError::DegeneratePlane)
    ));
    // Vertex::new would sanitise the NaN away
    let mut with_nan = verts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
    with_nan[1] = Vertex {
        pos: Point3::new(f64::NAN, 0.0, 0.0),
        uv: Point2::origin(),
        id: None,
    };
    assert!(matches!(
        Polygon::try_new(with_nan),
        Err(ValidationError::InvalidCoordinate(_))
    ));
    assert!(matches!(
        Polygon::try_new(verts(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, -1.0]
        ])),
        Err(ValidationError::NonPlanar { .. })
    ));

    let ok = Polygon::try_new(verts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])).expect("valid triangle");
    assert!(ok.plane().normal.z > 0.99, "counter-clockwise from +z faces +z");
}

#[test]
fn union_of_overlapping_squares() {
    let mut a = rect(0.0, 0.0, 2.0, 2.0, 0.0);
    let id = a.id();
    assert!(a.union(&rect(1.0, 1.0, 3.0, 3.0, 0.0)));
    assert_relative_eq!(a.area(), 7.0, epsilon = 1e-9);
    assert_eq!(a.id(), id, "Booleans keep the receiver's id");
    assert_eq!(a.loops().len(), 1);
}

#[test]
fn union_refuses_other_planes() {
    let mut a = rect(0.0, 0.0, 1.0, 1.0, 0.0);
    assert!(!a.union(&rect(0.0, 0.0, 1.0, 1.0, 1.0)));
    assert_relative_eq!(a.area(), 1.0, epsilon = 1e-9);
}

#[test]
fn subtract_punches_a_hole() {
    let mut frame = rect(0.0, 0.0, 3.0, 3.0, 0.0);
    assert!(frame.subtract(&rect(1.0, 1.0, 2.0, 2.0, 0.0)));
    assert!(frame.has_holes());
    assert_eq!(frame.outer_loops().len(), 1);
    assert_eq!(frame.hole_loops().len(), 1);
    assert_relative_eq!(frame.area(), 8.0, epsilon = 1e-9);
    assert!(!frame.include_point(&Point3::new(1.5, 1.5, 0.0)));
    assert!(frame.include_point(&Point3::new(0.5, 1.5, 0.0)));

    frame.remove_all_holes();
    assert!(!frame.has_holes());
    assert_relative_eq!(frame.area(), 9.0, epsilon = 1e-9);
}

#[test]
fn subtract_splits_into_islands() {
    let mut bar = rect(0.0, 0.0, 3.0, 1.0, 0.0);
    assert!(bar.subtract(&rect(1.0, -1.0, 2.0, 2.0, 0.0)));
    let islands = bar.islands();
    assert_eq!(islands.len(), 2);
    assert_eq!(islands[0].id(), bar.id());
    assert_ne!(islands[1].id(), bar.id());
    assert_relative_eq!(total_area(&islands), 2.0, epsilon = 1e-9);
}

#[test]
fn subtracting_a_cover_empties() {
    let mut small = rect(1.0, 1.0, 2.0, 2.0, 0.0);
    assert!(small.subtract(&rect(0.0, 0.0, 3.0, 3.0, 0.0)));
    assert_eq!(small.edge_count(), 0);
}

#[test]
fn intersect_and_xor() {
    let mut both = rect(0.0, 0.0, 2.0, 2.0, 0.0);
    assert!(both.intersect(&rect(1.0, 1.0, 3.0, 3.0, 0.0), CoEdgeMode::Exclude));
    assert_relative_eq!(both.area(), 1.0, epsilon = 1e-9);

    let mut either = rect(0.0, 0.0, 2.0, 2.0, 0.0);
    assert!(either.exclusive_or(&rect(1.0, 1.0, 3.0, 3.0, 0.0)));
    assert_relative_eq!(either.area(), 6.0, epsilon = 1e-9);
}

#[test]
fn touching_at_a_vertex_is_not_an_intersection() {
    let a = rect(0.0, 0.0, 1.0, 1.0, 0.0);
    assert_eq!(a.has_intersection(&rect(1.0, 1.0, 2.0, 2.0, 0.0)), IntersectionType::None);
    assert_eq!(a.has_intersection(&rect(1.0, 0.0, 2.0, 1.0, 0.0)), IntersectionType::JustTouch);
    assert_eq!(a.has_intersection(&rect(0.5, 0.5, 2.0, 2.0, 0.0)), IntersectionType::Cross);
    assert_eq!(a.has_intersection(&rect(0.0, 0.0, 1.0, 1.0, 1.0)), IntersectionType::None);
}

#[test]
fn scale_shrinks_and_refuses_collapse() {
    let mut square = rect(0.0, 0.0, 2.0, 2.0, 0.0);
    assert!(square.scale(0.5));
    assert_relative_eq!(square.area(), 1.0, epsilon = 1e-9);

    let mut grow = rect(0.0, 0.0, 2.0, 2.0, 0.0);
    assert!(grow.scale(-0.5));
    assert_relative_eq!(grow.area(), 9.0, epsilon = 1e-9);

    let mut tiny = rect(0.0, 0.0, 1.0, 1.0, 0.0);
    assert!(!tiny.scale(0.6));
    assert_relative_eq!(tiny.area(), 1.0, epsilon = 1e-9);
}

#[test]
fn clip_by_plane_splits_area() {
    let square = rect(0.0, 0.0, 1.0, 1.0, 0.0);
    let cut = square.clip_by_plane(&Plane::from_normal(Vector3::x(), 0.25));
    assert_relative_eq!(total_area(&cut.front), 0.75, epsilon = 1e-9);
    assert_relative_eq!(total_area(&cut.back), 0.25, epsilon = 1e-9);
    assert!(!cut.boundary_edges.is_empty());
    assert!(cut.boundary_edges.iter().all(|e| (e.v[0].x - 0.25).abs() < 1e-9 && (e.v[1].x - 0.25).abs() < 1e-9));

    let coplanar = square.clip_by_plane(&Plane::from_normal(Vector3::z(), 0.0));
    assert_eq!(coplanar.front.len(), 1);
    assert!(coplanar.back.is_empty());
}

/// Unit square whose texture coordinates are offset from its positions.
fn textured_square() -> Polygon {
    Polygon::new(
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
            .iter()
            .map(|&[x, y]| Vertex::with_uv(Point3::new(x, y, 0.0), Point2::new(10.0 + x, 20.0 + y)))
            .collect(),
    )
}

#[test]
fn clip_keeps_corner_uvs_and_interpolates_cut_uvs() {
    let cut = textured_square().clip_by_plane(&Plane::from_normal(Vector3::x(), 0.5));
    assert_eq!(cut.front.len(), 1);
    assert_eq!(cut.back.len(), 1);
    for piece in cut.front.iter().chain(&cut.back) {
        assert_eq!(piece.vertex_count(), 4);
        for v in piece.vertices() {
            assert_relative_eq!(v.uv.x, 10.0 + v.pos.x, epsilon = 1e-12);
            assert_relative_eq!(v.uv.y, 20.0 + v.pos.y, epsilon = 1e-12);
        }
    }
    let corners = cut.front[0].vertices().iter().filter(|v| v.pos.x == 1.0).count();
    assert_eq!(corners, 2, "source corners come back bit-exact");
}

#[test]
fn boolean_keeps_receiver_uvs() {
    let mut face = textured_square();
    assert!(face.subtract(&rect(0.5, 0.5, 2.0, 2.0, 0.0)));
    assert_eq!(face.vertex_count(), 6);
    for v in face.vertices() {
        assert_relative_eq!(v.uv.x, 10.0 + v.pos.x, epsilon = 1e-12);
        assert_relative_eq!(v.uv.y, 20.0 + v.pos.y, epsilon = 1e-12);
    }
}

#[test]
fn clipped_edges_land_exactly_on_the_cut() {
    let square = rect(0.0, 0.0, 1.0, 1.0, 0.0);
    for offset in [0.1, 0.25, 0.3, 0.7] {
        let cut = square.clip_by_plane(&Plane::from_normal(Vector3::x(), offset));
        for v in cut.front.iter().chain(&cut.back).flat_map(|p| p.vertices()) {
            let on_grid = [0.0, offset, 1.0].iter().any(|x| (v.pos.x - x).abs() < 1e-12);
            assert!(on_grid, "x = {} drifted off the cut at {offset}", v.pos.x);
            assert!(v.pos.y == 0.0 || v.pos.y == 1.0);
            assert_eq!(v.pos.z, 0.0);
        }
    }
}

#[test]
fn flip_reverses_facing_and_keeps_area() {
    let square = rect(0.0, 0.0, 1.0, 1.0, 2.0);
    let flipped = square.flipped();
    assert!(flipped.plane().is_equivalent(&square.plane().flipped()));
    assert_relative_eq!(flipped.area(), 1.0, epsilon = 1e-9);
    assert!(flipped.flipped().is_equivalent(&square));
}

#[test]
fn open_chain_is_clipped_edge_by_edge() {
    let mut chain = Polygon::open_chain(
        &[Point3::new(-1.0, 0.5, 0.0), Point3::new(2.0, 0.5, 0.0)],
        Plane::from_normal(Vector3::z(), 0.0),
    );
    assert!(chain.is_open());
    assert!(chain.clip_outside(&rect(0.0, 0.0, 1.0, 1.0, 0.0)));
    let length: f64 = chain.edges().map(|e| e.length()).sum();
    assert_relative_eq!(length, 1.0, epsilon = 1e-9);
}
