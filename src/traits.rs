use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::Real;
use crate::model::plane::Plane;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Translation3, Vector3};

/// Boolean operations + transformations, applied in place.
///
/// Booleans replace the receiver's solid with the result. An empty `other`
/// leaves the receiver untouched.
pub trait CSGOps: Sized + Clone {
    fn new() -> Self;
    fn union(&mut self, other: &Self);
    fn subtract(&mut self, other: &Self);
    fn intersect(&mut self, other: &Self);
    /// Remove the part of `self` inside `other`.
    fn clip_inside(&mut self, other: &Self);
    /// Keep only the part of `self` inside `other`.
    fn clip_outside(&mut self, other: &Self);
    fn is_inside(&self, point: &Point3<Real>) -> bool;
    fn transform(&mut self, matrix: &Matrix4<Real>);
    fn bounding_box(&self) -> Aabb;
    fn invalidate_bounding_box(&mut self);

    /// Translate by a vector.
    fn translate(&mut self, offset: Vector3<Real>) {
        self.transform(&Translation3::from(offset).to_homogeneous());
    }

    /// Move the bounding-box center to the origin.
    fn center(&mut self) {
        let aabb = self.bounding_box();
        if aabb.mins.x > aabb.maxs.x {
            return;
        }
        self.translate(-aabb.center().coords);
    }

    /// Rotates by x_degrees, y_degrees, z_degrees
    fn rotate(&mut self, x_deg: Real, y_deg: Real, z_deg: Real) {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x_deg.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y_deg.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z_deg.to_radians());

        // Compose them in the desired order
        let rot = rz * ry * rx;
        self.transform(&rot.to_homogeneous())
    }

    /// Scales by scale_x, scale_y, scale_z
    fn scale(&mut self, sx: Real, sy: Real, sz: Real) {
        let mat4 = Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz));
        self.transform(&mat4)
    }

    /// Reflect about `plane`.
    ///
    /// Polygons reverse their winding under the reflection, so the result
    /// stays outward facing.
    fn mirror(&mut self, plane: &Plane) {
        let n = plane.normal;
        let offset = n * plane.w;
        let t1 = Translation3::from(-offset).to_homogeneous();

        // R = I - 2 n n^T
        let mut reflect_4 = Matrix4::identity();
        let reflect_3 = Matrix3::identity() - 2.0 * n * n.transpose();
        reflect_4.fixed_view_mut::<3, 3>(0, 0).copy_from(&reflect_3);

        let t2 = Translation3::from(offset).to_homogeneous();
        self.transform(&(t2 * reflect_4 * t1));
    }
}
