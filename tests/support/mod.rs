//! Test support library
//! Provides various helper functions & utilities for tests.

#![allow(dead_code)]

use brushcsg::{Model, Polygon, float_types::Real};
use nalgebra::Point3;

/// Axis-aligned box with outward-facing quads.
pub fn box_polygons(min: [Real; 3], max: [Real; 3]) -> Vec<Polygon> {
    let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
    let ([x0, y0, z0], [x1, y1, z1]) = (min, max);
    vec![
        Polygon::from_points(&[p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)]),
        Polygon::from_points(&[p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)]),
        Polygon::from_points(&[p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)]),
        Polygon::from_points(&[p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)]),
        Polygon::from_points(&[p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)]),
        Polygon::from_points(&[p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)]),
    ]
}

pub fn box_model(min: [Real; 3], max: [Real; 3]) -> Model {
    Model::from_polygons(box_polygons(min, max))
}

pub fn unit_cube() -> Model {
    box_model([0.0; 3], [1.0; 3])
}

/// Axis-aligned rectangle on z = `z`, facing +z.
pub fn rect(x0: Real, y0: Real, x1: Real, y1: Real, z: Real) -> Polygon {
    Polygon::from_points(&[
        Point3::new(x0, y0, z),
        Point3::new(x1, y0, z),
        Point3::new(x1, y1, z),
        Point3::new(x0, y1, z),
    ])
}

/// Enclosed volume by the divergence theorem: `V = 1/3 Σ area · (n · p)`.
/// For a plane `n · p = w`, so each face contributes `area · w`.
pub fn volume(model: &Model) -> Real {
    model
        .polygons()
        .iter()
        .filter(|p| !p.is_open())
        .map(|p| p.area() * p.plane().w)
        .sum::<Real>()
        / 3.0
}

pub fn total_area(polygons: &[Polygon]) -> Real {
    polygons.iter().map(Polygon::area).sum()
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}
