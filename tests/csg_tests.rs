mod support;

use approx::assert_relative_eq;
use brushcsg::{CSGOps, Model, Plane, Polygon};
use nalgebra::{Point3, Vector3};

use crate::support::{box_model, total_area, unit_cube, volume};

fn all_closed(model: &Model) -> bool {
    model.polygons().iter().all(|p| !p.is_open())
}

#[test]
fn disjoint_union_keeps_every_face() {
    let mut a = unit_cube();
    let b = box_model([10.0; 3], [11.0; 3]);
    a.union(&b);

    assert_eq!(a.polygon_count(), 12);
    assert!(a.is_inside(&Point3::new(0.5, 0.5, 0.5)));
    assert!(a.is_inside(&Point3::new(10.5, 10.5, 10.5)));
    assert!(!a.is_inside(&Point3::new(5.0, 5.0, 5.0)));
    assert_relative_eq!(volume(&a), 2.0, epsilon = 1e-6);
}

#[test]
fn coincident_faces_cancel_in_union() {
    let mut a = unit_cube();
    let b = box_model([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
    a.union(&b);

    assert_eq!(a.polygon_count(), 10, "shared x = 1 faces must disappear");
    assert!(all_closed(&a));
    assert_relative_eq!(volume(&a), 2.0, epsilon = 1e-6);
    assert!(
        a.polygons()
            .iter()
            .all(|p| (p.plane().normal.x.abs() - 1.0).abs() > 1e-6 || (p.plane().w.abs() - 1.0).abs() > 1e-6),
        "no face left on x = 1"
    );
}

#[test]
fn box_minus_box() {
    let mut a = unit_cube();
    let b = box_model([0.5; 3], [1.5; 3]);
    a.subtract(&b);

    assert!(all_closed(&a), "result must not contain open polygons");
    assert_relative_eq!(volume(&a), 0.875, epsilon = 1e-6);
    assert!(a.is_inside(&Point3::new(0.25, 0.25, 0.25)));
    assert!(!a.is_inside(&Point3::new(0.75, 0.75, 0.75)));

    // cavity walls face into the removed corner
    let cavity: Vec<Polygon> = a
        .polygons()
        .iter()
        .filter(|p| p.plane().distance(&Point3::new(0.5, 0.5, 0.5)).abs() < 1e-9)
        .filter(|p| p.plane().normal.dot(&Vector3::new(1.0, 1.0, 1.0)) > 0.0)
        .cloned()
        .collect();
    assert_relative_eq!(total_area(&cavity), 0.75, epsilon = 1e-6);
}

#[test]
fn intersect_overlapping_boxes() {
    let mut a = unit_cube();
    let b = box_model([0.5; 3], [1.5; 3]);
    a.intersect(&b);

    assert!(all_closed(&a));
    assert_relative_eq!(volume(&a), 0.125, epsilon = 1e-6);
    let aabb = a.bounding_box();
    assert_relative_eq!(aabb.mins.x, 0.5, epsilon = 1e-9);
    assert_relative_eq!(aabb.maxs.z, 1.0, epsilon = 1e-9);
}

#[test]
fn self_union_is_idempotent() {
    let mut a = unit_cube();
    let copy = a.clone();
    a.union(&copy);
    assert_eq!(a.polygon_count(), 6);
    assert_relative_eq!(volume(&a), 1.0, epsilon = 1e-6);
}

#[test]
fn union_then_subtract_restores_volume() {
    let mut a = unit_cube();
    let b = box_model([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]);
    a.union(&b);
    a.subtract(&b);
    assert_relative_eq!(volume(&a), 1.0, epsilon = 1e-6);
    assert!(!a.is_inside(&Point3::new(2.5, 0.5, 0.5)));
}

#[test]
fn empty_operand_is_a_no_op() {
    let mut a = unit_cube();
    let before = a.clone();
    let ops: [fn(&mut Model, &Model); 5] = [
        Model::union,
        Model::subtract,
        Model::intersect,
        Model::clip_inside,
        Model::clip_outside,
    ];
    for op in ops {
        op(&mut a, &Model::new());
        assert_eq!(a, before);
    }
    let ids: Vec<_> = a.polygons().iter().map(Polygon::id).collect();
    let before_ids: Vec<_> = before.polygons().iter().map(Polygon::id).collect();
    assert_eq!(ids, before_ids);
}

#[test]
fn clip_inside_and_outside_partition_the_skin() {
    let b = box_model([0.5; 3], [1.5; 3]);

    let mut outside = unit_cube();
    outside.clip_outside(&b);
    assert_relative_eq!(total_area(outside.polygons()), 0.75, epsilon = 1e-6);

    let mut inside = unit_cube();
    inside.clip_inside(&b);
    assert_relative_eq!(total_area(inside.polygons()), 5.25, epsilon = 1e-6);
}

#[test]
fn transforms_keep_faces_outward() {
    let mut a = unit_cube();
    a.translate(Vector3::new(2.0, 0.0, 0.0));
    assert_relative_eq!(a.bounding_box().mins.x, 2.0, epsilon = 1e-9);

    a.mirror(&Plane::from_normal(Vector3::x(), 0.0));
    assert_relative_eq!(a.bounding_box().maxs.x, -2.0, epsilon = 1e-9);
    assert_relative_eq!(volume(&a), 1.0, epsilon = 1e-6);

    a.center();
    let aabb = a.bounding_box();
    assert_relative_eq!(aabb.center().coords.norm(), 0.0, epsilon = 1e-9);

    a.scale(2.0, 1.0, 1.0);
    assert_relative_eq!(volume(&a), 2.0, epsilon = 1e-6);

    a.rotate(0.0, 0.0, 90.0);
    assert_relative_eq!(volume(&a), 2.0, epsilon = 1e-6);
}

#[test]
fn chained_booleans_stay_on_the_input_grid() {
    let mut model = unit_cube();
    model.subtract(&box_model([0.5, 0.5, 0.5], [1.5, 1.5, 1.5]));
    model.union(&box_model([0.25, 0.25, -0.5], [0.75, 0.75, 0.25]));
    model.intersect(&box_model([-1.0, -1.0, -0.25], [0.875, 0.875, 2.0]));
    model.subtract(&box_model([0.125, -1.0, 0.125], [0.375, 2.0, 0.375]));

    assert!(all_closed(&model));
    assert!(model.polygon_count() > 6);
    // every input coordinate is a multiple of 1/8
    for polygon in model.polygons() {
        for v in polygon.vertices() {
            for c in v.pos.coords.iter() {
                let step = c * 8.0;
                assert!((step - step.round()).abs() < 1e-9, "{c} drifted off the grid in {:?}", v.pos);
            }
        }
    }
}
