//! Supporting planes and 2D splitting lines.
//!
//! A [`Plane`] is stored as a unit normal and an offset (`n · p = w`). Every
//! polygon carries one and uses it to move between world space and a
//! plane-local 2D frame, which is where all coplanar Boolean work happens.

use crate::float_types::parry3d::query::Ray;
use crate::float_types::{Real, tolerance};
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// Plane classification constants
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane: unit normal plus signed distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Distance from origin along normal (plane equation: n·p = w)
    pub w: Real,
}

impl Default for Plane {
    fn default() -> Self {
        Plane {
            normal: Vector3::z(),
            w: 0.0,
        }
    }
}

impl Plane {
    /// Create a new plane from a normal vector and distance.
    /// A zero normal degrades to the XY plane.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        let len = normal.norm();
        if len < Real::EPSILON {
            return Plane::default();
        }
        Plane {
            normal: normal / len,
            w: w / len,
        }
    }

    /// Plane through `point` facing `normal`.
    pub fn from_point_normal(point: &Point3<Real>, normal: &Vector3<Real>) -> Self {
        let n = normal.normalize();
        Plane {
            normal: n,
            w: n.dot(&point.coords),
        }
    }

    /// Create a plane from three points, normal following the right-hand rule
    /// `(b - a) × (c - a)`. Returns `None` for collinear input.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        if n.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        Some(Self::from_point_normal(a, &n))
    }

    /// Best-fit plane of a closed loop using Newell's method.
    ///
    /// The normal follows the loop's winding, so a counter-clockwise loop seen
    /// from the front yields a normal pointing at the viewer.
    pub fn from_loop(points: &[Point3<Real>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut normal = Vector3::zeros();
        let mut centroid = Vector3::zeros();
        for (i, curr) in points.iter().enumerate() {
            let next = &points[(i + 1) % points.len()];
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
            centroid += curr.coords;
        }
        if normal.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        let centroid = Point3::from(centroid / points.len() as Real);
        Some(Self::from_point_normal(&centroid, &normal))
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Signed distance of `point`; positive on the normal side.
    #[inline]
    pub fn distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Flip the plane (reverse normal and distance)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Return a flipped copy of this plane
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] using the crate tolerance.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let d = self.distance(point);
        if d > tolerance() {
            FRONT
        } else if d < -tolerance() {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Bitwise OR of [`orient_point`](Self::orient_point) over `points`.
    pub fn classify_points<'a>(&self, points: impl IntoIterator<Item = &'a Point3<Real>>) -> i8 {
        points
            .into_iter()
            .fold(COPLANAR, |acc, p| acc | self.orient_point(p))
    }

    /// Same normal and distance within tolerance.
    pub fn is_equivalent(&self, other: &Plane) -> bool {
        (self.normal - other.normal).norm() < tolerance() && (self.w - other.w).abs() < tolerance()
    }

    /// Normals point into the same half-space.
    pub fn is_same_facing(&self, other: &Plane) -> bool {
        self.normal.dot(&other.normal) > 0.0
    }

    /// Orthonormal in-plane axes `(u, v)` with `u × v = n`.
    ///
    /// Counter-clockwise winding in plane-local 2D therefore means the loop
    /// faces along the normal.
    pub fn basis(&self) -> (Vector3<Real>, Vector3<Real>) {
        let n = self.normal;
        let other = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let v = n.cross(&other).normalize();
        let u = v.cross(&n).normalize();
        (u, v)
    }

    /// World point to plane-local 2D.
    pub fn w2p(&self, point: &Point3<Real>) -> Point2<Real> {
        let (u, v) = self.basis();
        Point2::new(point.coords.dot(&u), point.coords.dot(&v))
    }

    /// Plane-local 2D back to the world point on the plane.
    pub fn p2w(&self, point: &Point2<Real>) -> Point3<Real> {
        let (u, v) = self.basis();
        Point3::from(self.normal * self.w + u * point.x + v * point.y)
    }

    /// Orthogonal projection of `point` onto the plane.
    pub fn project(&self, point: &Point3<Real>) -> Point3<Real> {
        point - self.normal * self.distance(point)
    }

    /// Ray parameter where `ray` meets the plane. The parameter may be negative;
    /// `None` when the ray is parallel to the plane.
    pub fn hit_test(&self, ray: &Ray) -> Option<Real> {
        let denom = self.normal.dot(&ray.dir);
        if denom.abs() < Real::EPSILON {
            return None;
        }
        Some((self.w - self.normal.dot(&ray.origin.coords)) / denom)
    }

    /// Hit point of `ray` when it meets the plane ahead of its origin.
    pub fn hit_point(&self, ray: &Ray) -> Option<Point3<Real>> {
        self.hit_test(ray)
            .filter(|t| *t >= 0.0)
            .map(|t| ray.origin + ray.dir * t)
    }

    pub fn mirror_point(&self, point: &Point3<Real>) -> Point3<Real> {
        point - self.normal * (2.0 * self.distance(point))
    }

    pub fn mirror_vector(&self, dir: &Vector3<Real>) -> Vector3<Real> {
        dir - self.normal * (2.0 * self.normal.dot(dir))
    }

    /// Reflect `other` across this plane.
    pub fn mirror_plane(&self, other: &Plane) -> Plane {
        let on_plane = Point3::from(other.normal * other.w);
        Plane::from_point_normal(&self.mirror_point(&on_plane), &self.mirror_vector(&other.normal))
    }

    /// Plane carried by an affine transform. Normals use the inverse transpose,
    /// so the result stays the geometric image of the plane even for
    /// reflections. `None` when the linear part is singular.
    pub fn transformed(&self, matrix: &Matrix4<Real>) -> Option<Plane> {
        let linear: Matrix3<Real> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal = linear.try_inverse()?.transpose() * self.normal;
        if normal.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        let point = matrix.transform_point(&Point3::from(self.normal * self.w));
        Some(Plane::from_point_normal(&point, &normal))
    }

    /// Trace of `other` inside this plane's 2D frame, oriented so that its
    /// positive side is `other`'s front. `None` when the planes are parallel.
    pub fn intersection_line(&self, other: &Plane) -> Option<Line2D> {
        let (u, v) = self.basis();
        let a = Vector2::new(other.normal.dot(&u), other.normal.dot(&v));
        let len = a.norm();
        if len < tolerance() {
            return None;
        }
        // distance(p2w(q)) = a·q + (n_o · origin - w_o)
        let c = other.normal.dot(&(self.normal * self.w)) - other.w;
        Some(Line2D {
            normal: a / len,
            distance: -c / len,
        })
    }
}

/// An oriented 2D line in a plane-local frame. Points on the right-hand side
/// of the direction it was built from are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2D {
    pub normal: Vector2<Real>,
    pub distance: Real,
}

impl Line2D {
    /// Line through `a` and `b`. `None` when the points coincide.
    pub fn from_points(a: &Point2<Real>, b: &Point2<Real>) -> Option<Self> {
        let d = b - a;
        let len = d.norm();
        if len < Real::EPSILON {
            return None;
        }
        let normal = Vector2::new(d.y, -d.x) / len;
        Some(Line2D {
            normal,
            distance: normal.dot(&a.coords),
        })
    }

    #[inline]
    pub fn distance(&self, point: &Point2<Real>) -> Real {
        self.normal.dot(&point.coords) - self.distance
    }

    /// Direction along the line (the positive side is on its right).
    pub fn direction(&self) -> Vector2<Real> {
        Vector2::new(-self.normal.y, self.normal.x)
    }

    pub fn inverted(&self) -> Self {
        Line2D {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    pub fn is_equivalent(&self, other: &Line2D) -> bool {
        (self.normal - other.normal).norm() < tolerance()
            && (self.distance - other.distance).abs() < tolerance()
    }

    /// Parameter along `a → b` where the segment crosses the line.
    pub fn intersect_param(&self, a: &Point2<Real>, b: &Point2<Real>) -> Option<Real> {
        let da = self.distance(a);
        let db = self.distance(b);
        let denom = da - db;
        if denom.abs() < Real::EPSILON {
            return None;
        }
        Some(da / denom)
    }
}
