//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::{Real, tolerance};
use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

/// A polygon vertex: position, texture coordinate and an optional tag used
/// to pair mirrored vertices with their sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub uv: Point2<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

impl Vertex {
    /// Create a new [`Vertex`] with a zero texture coordinate.
    ///
    /// Non-finite coordinates are replaced with `0.0`.
    #[inline]
    pub fn new(pos: Point3<Real>) -> Self {
        Self::with_uv(pos, Point2::origin())
    }

    #[inline]
    pub fn with_uv(mut pos: Point3<Real>, mut uv: Point2<Real>) -> Self {
        // Sanitise position
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        for c in uv.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        Vertex { pos, uv, id: None }
    }

    /// Linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// The UV is interpolated with the same weight; the id is kept only when
    /// both ends agree.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        Vertex {
            pos: self.pos + (other.pos - self.pos) * t,
            uv: self.uv + (other.uv - self.uv) * t,
            id: if self.id == other.id { self.id } else { None },
        }
    }

    /// Positions coincide within tolerance.
    #[inline]
    pub fn is_equivalent(&self, other: &Vertex) -> bool {
        is_equivalent_point(&self.pos, &other.pos)
    }
}

/// Positions coincide within the crate tolerance.
#[inline]
pub fn is_equivalent_point(a: &Point3<Real>, b: &Point3<Real>) -> bool {
    (a - b).norm_squared() < tolerance() * tolerance()
}

/// Quantised position used as a hash key when welding vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey(i64, i64, i64);

impl PositionKey {
    pub fn new(pos: &Point3<Real>) -> Self {
        let q = 1.0 / tolerance();
        PositionKey(
            (pos.x * q).round() as i64,
            (pos.y * q).round() as i64,
            (pos.z * q).round() as i64,
        )
    }

    /// This cell and its 26 neighbours.
    pub fn neighbourhood(self) -> impl Iterator<Item = PositionKey> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                (-1..=1).map(move |dz| PositionKey(self.0 + dx, self.1 + dy, self.2 + dz))
            })
        })
    }
}

/// Texture mapping parameters of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexInfo {
    pub shift: Vector2<Real>,
    pub scale: Vector2<Real>,
    /// Rotation in degrees.
    pub rotate: Real,
}

impl Default for TexInfo {
    fn default() -> Self {
        TexInfo {
            shift: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
            rotate: 0.0,
        }
    }
}

impl TexInfo {
    /// Apply shift, scale and rotation to a plane-local coordinate.
    pub fn apply(&self, local: &Point2<Real>) -> Point2<Real> {
        let (s, c) = self.rotate.to_radians().sin_cos();
        let sx = if self.scale.x.abs() < Real::EPSILON { 1.0 } else { self.scale.x };
        let sy = if self.scale.y.abs() < Real::EPSILON { 1.0 } else { self.scale.y };
        let x = local.x * c - local.y * s;
        let y = local.x * s + local.y * c;
        Point2::new(x / sx + self.shift.x, y / sy + self.shift.y)
    }
}
