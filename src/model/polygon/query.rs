//! Containment, overlap and proximity queries on a single polygon.

use super::Polygon;
use crate::float_types::parry3d::query::{Ray, RayCast};
use crate::float_types::parry3d::shape::Triangle;
use crate::float_types::{Real, tolerance};
use crate::model::bsp::{IntersectionType, PointPos};
use crate::model::edge::{Edge3D, EdgeOverlap, intersect_edge_3d};
use crate::model::vertex::is_equivalent_point;
use geo::{Area, BooleanOps, TriangulateEarcut};
use nalgebra::{Isometry3, Point2, Point3, Vector3};

impl Polygon {
    /// How `self` and `other` overlap, tested both ways.
    ///
    /// `Cross` means a shared area, `JustTouch` a shared boundary segment.
    /// Polygons meeting at a single vertex do not touch.
    pub fn has_intersection(&self, other: &Polygon) -> IntersectionType {
        self.intersection_one_way(other)
            .max(other.intersection_one_way(self))
    }

    fn intersection_one_way(&self, other: &Polygon) -> IntersectionType {
        if !self.plane.is_equivalent(&other.plane) {
            return IntersectionType::None;
        }
        if self.is_equivalent(other) {
            return IntersectionType::Cross;
        }
        if self.is_open() {
            return IntersectionType::None;
        }

        let tree = self.bsp();
        let mut touched = false;
        for v in &other.vertices {
            match tree.is_vertex_in(&v.pos) {
                PointPos::Inside => return IntersectionType::Cross,
                PointPos::Border => touched = true,
                PointPos::Outside => {},
            }
        }
        for edge in other.edges() {
            match tree.has_intersection(&edge) {
                IntersectionType::Cross => return IntersectionType::Cross,
                IntersectionType::JustTouch => touched = true,
                IntersectionType::None => {},
            }
        }
        if !touched {
            return IntersectionType::None;
        }

        // boundaries agree everywhere, so the regions may still coincide
        if !other.is_open() {
            let overlap = self
                .to_geo(&self.plane)
                .intersection(&other.to_geo(&self.plane));
            if overlap.unsigned_area() > tolerance() * tolerance() {
                return IntersectionType::Cross;
            }
        }

        let shared = other
            .vertices
            .iter()
            .filter(|v| self.has_vertex(&v.pos))
            .count();
        if shared == 1 {
            let contained = self
                .edges()
                .any(|a| other.edges().any(|b| a.contains_edge(&b) || b.contains_edge(&a)));
            if !contained {
                return IntersectionType::None;
            }
        }
        IntersectionType::JustTouch
    }

    /// Every edge of `other` lies inside or on the boundary of `self`.
    pub fn include_all_edges(&self, other: &Polygon) -> bool {
        if self.is_open() || other.edges.is_empty() {
            return false;
        }
        let tree = self.bsp();
        other.edges().all(|edge| tree.is_inside(&edge))
    }

    /// `point` lies on the plane, inside the region or on its boundary.
    pub fn include_point(&self, point: &Point3<Real>) -> bool {
        if self.plane.distance(point).abs() > tolerance() || self.is_open() {
            return false;
        }
        self.bsp().is_vertex_in(point) != PointPos::Outside
    }

    /// Same counts, flags and plane, and every directed edge of `other`
    /// appears in `self`.
    pub fn is_equivalent(&self, other: &Polygon) -> bool {
        self.vertices.len() == other.vertices.len()
            && self.edges.len() == other.edges.len()
            && self.flags == other.flags
            && self.plane.is_equivalent(&other.plane)
            && other.edges().all(|e| self.has_edge(&e, true))
    }

    /// Some edge matches `edge`, directed when `apply_direction`.
    pub fn has_edge(&self, edge: &Edge3D, apply_direction: bool) -> bool {
        self.edges().any(|own| {
            if apply_direction {
                own.is_equivalent(edge)
            } else {
                own.is_equivalent_undirected(edge)
            }
        })
    }

    /// Some edge overlaps `edge` along a segment of positive length.
    pub fn is_edge_overlapped_by_boundary(&self, edge: &Edge3D) -> bool {
        self.edges()
            .any(|own| matches!(intersect_edge_3d(&own, edge), EdgeOverlap::One(_)))
    }

    /// The closest edge to `point` and the closest point on it.
    pub fn query_nearest_edge(&self, point: &Point3<Real>) -> Option<(Edge3D, Point3<Real>)> {
        self.edges()
            .map(|e| {
                let on_edge = e.nearest_point(point);
                (e, on_edge, (on_edge - point).norm_squared())
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(e, p, _)| (e, p))
    }

    /// Closest point of the polygon to `point`: its projection when that
    /// falls inside, otherwise the nearest boundary point.
    pub fn query_nearest_pos(&self, point: &Point3<Real>) -> Option<Point3<Real>> {
        let projected = self.plane.project(point);
        if !self.is_open() && self.include_point(&projected) {
            return Some(projected);
        }
        self.query_nearest_edge(point).map(|(_, p)| p)
    }

    /// Ear-cut triangles covering the region (holes excluded).
    pub fn triangulate(&self) -> Vec<[Point3<Real>; 3]> {
        let mut result = Vec::new();
        for polygon in self.to_geo(&self.plane).iter() {
            let triangulation = polygon.earcut_triangles_raw();
            let vertices = triangulation.vertices;
            for tri in triangulation.triangle_indices.chunks_exact(3) {
                let corner = |k: usize| {
                    self.plane
                        .p2w(&Point2::new(vertices[2 * tri[k]], vertices[2 * tri[k] + 1]))
                };
                result.push([corner(0), corner(1), corner(2)]);
            }
        }
        result
    }

    /// Ray parameter of the nearest hit of `ray` on the region, if any.
    pub fn is_passed(&self, ray: &Ray) -> Option<Real> {
        let iso = Isometry3::identity();
        self.triangulate()
            .into_iter()
            .filter_map(|[a, b, c]| {
                Triangle::new(a, b, c)
                    .cast_ray_and_get_normal(&iso, ray, Real::MAX, true)
                    .map(|hit| hit.time_of_impact)
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Smallest distance travelled along `direction` by a vertex of `other`
    /// before it reaches this polygon's plane.
    pub fn nearest_distance(&self, other: &Polygon, direction: &Vector3<Real>) -> Option<Real> {
        let dir = direction.try_normalize(Real::EPSILON)?;
        other
            .vertices
            .iter()
            .filter_map(|v| self.plane.hit_test(&Ray::new(v.pos, dir)))
            .filter(|t| *t >= -tolerance())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// A vertex of `other` coincides with one of ours.
    pub fn shares_vertex_with(&self, other: &Polygon) -> bool {
        self.vertices
            .iter()
            .any(|a| other.vertices.iter().any(|b| is_equivalent_point(&a.pos, &b.pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: Real, y0: Real, x1: Real, y1: Real) -> Polygon {
        Polygon::from_points(&[
            Point3::new(x0, y0, 0.0),
            Point3::new(x1, y0, 0.0),
            Point3::new(x1, y1, 0.0),
            Point3::new(x0, y1, 0.0),
        ])
    }

    #[test]
    fn overlap_touch_and_corner() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(a.has_intersection(&rect(0.5, 0.5, 2.0, 2.0)), IntersectionType::Cross);
        assert_eq!(a.has_intersection(&rect(1.0, 0.0, 2.0, 1.0)), IntersectionType::JustTouch);
        assert_eq!(a.has_intersection(&rect(1.0, 1.0, 2.0, 2.0)), IntersectionType::None);
        assert_eq!(a.has_intersection(&rect(3.0, 3.0, 4.0, 4.0)), IntersectionType::None);
        assert_eq!(a.has_intersection(&rect(-1.0, -1.0, 2.0, 2.0)), IntersectionType::Cross);
    }

    #[test]
    fn containment_queries() {
        let big = rect(0.0, 0.0, 4.0, 4.0);
        let small = rect(1.0, 1.0, 2.0, 2.0);
        assert!(big.include_all_edges(&small));
        assert!(!small.include_all_edges(&big));
        assert!(big.include_point(&Point3::new(2.0, 2.0, 0.0)));
        assert!(big.include_point(&Point3::new(0.0, 2.0, 0.0)));
        assert!(!big.include_point(&Point3::new(5.0, 2.0, 0.0)));
    }

    #[test]
    fn ray_hits_inside_only() {
        let sq = rect(0.0, 0.0, 1.0, 1.0);
        let down = Vector3::new(0.0, 0.0, -1.0);
        let hit = sq.is_passed(&Ray::new(Point3::new(0.5, 0.5, 2.0), down));
        assert!(hit.is_some_and(|t| (t - 2.0).abs() < 1e-9));
        assert!(sq.is_passed(&Ray::new(Point3::new(1.5, 0.5, 2.0), down)).is_none());
    }

    #[test]
    fn nearest_pos_projects_or_snaps() {
        let sq = rect(0.0, 0.0, 1.0, 1.0);
        let inside = sq.query_nearest_pos(&Point3::new(0.25, 0.5, 3.0)).expect("has edges");
        assert!((inside - Point3::new(0.25, 0.5, 0.0)).norm() < 1e-9);
        let outside = sq.query_nearest_pos(&Point3::new(2.0, 0.5, 0.0)).expect("has edges");
        assert!((outside - Point3::new(1.0, 0.5, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn equivalence_needs_matching_edges() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(0.0, 0.0, 1.0, 1.0);
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&b.flipped()));
    }
}
