//! Read-only lookups over the current shelf: ray picking, proximity,
//! adjacency and opposite-face search.

use super::Model;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::parry3d::query::{Ray, RayCast};
use crate::float_types::{ENOUGH_BIG_NUMBER, Real, loose_tolerance, tolerance};
use crate::model::bsp::IntersectionType;
use crate::model::edge::Edge3D;
use crate::model::plane::Plane;
use crate::model::polygon::{CoEdgeMode, Polygon, PolygonFlags, PolygonId};
use crate::model::vertex::{Vertex, is_equivalent_point};
use nalgebra::{Point2, Point3, Vector3};

/// Margin used when picking open chains with a ray.
const OPEN_PICK_MARGIN: Real = 0.01;

/// Gap left in front of a slanted opposite face.
const SLANTED_GAP: Real = 0.01;

/// How a polygon sits among its coplanar neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurroundType {
    /// No coplanar neighbour touches it.
    None,
    /// It fills a hole of its neighbours.
    SurroundedByOthers,
    /// Its outline encloses all its neighbours.
    SurroundsOthers,
    SurroundedPartly,
}

/// Direction of a push/pull for [`Model::query_opposite_polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOppositeFlag {
    /// Moving against the face normal.
    Push,
    /// Moving along the face normal.
    Pull,
}

/// Result of an opposite-face search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OppositePolygon {
    None,
    /// The opposite face already touches the query face.
    ZeroDistance { index: usize },
    Intersection { index: usize, distance: Real },
}

/// A point where an edge crosses a polygon boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    pub polygon: usize,
    pub position: Point3<Real>,
    /// Parameter along the query edge, `0` at its start.
    pub param: Real,
}

impl Model {
    /// Nearest visible polygon hit by `ray`. Hits within tolerance of each
    /// other prefer a polygon whose front faces the ray origin.
    pub fn query_polygon(&self, ray: &Ray) -> Option<usize> {
        let mut best: Option<(usize, Real)> = None;
        for (i, polygon) in self.polygons().iter().enumerate() {
            if !polygon.is_valid() || polygon.check_flags(PolygonFlags::HIDDEN) {
                continue;
            }
            let Some(t) = polygon.is_passed(ray) else {
                continue;
            };
            best = match best {
                None => Some((i, t)),
                Some((_, bt)) if t < bt - tolerance() => Some((i, t)),
                Some((bi, bt)) if (t - bt).abs() <= tolerance() => {
                    let faces = |p: &Polygon| p.plane().distance(&ray.origin) > 0.0;
                    if faces(polygon) && !faces(&self.polygons()[bi]) {
                        Some((i, t))
                    } else {
                        best
                    }
                },
                _ => best,
            };
        }
        best.map(|(i, _)| i)
    }

    /// Nearest polygon on `plane` (either facing) hit by `ray`. Open chains
    /// count as hit near their edges and win ties.
    pub fn query_polygon_on_plane(&self, plane: &Plane, ray: &Ray) -> Option<usize> {
        let flipped = plane.flipped();
        let mut best: Option<(usize, Real, bool)> = None;
        for (i, polygon) in self.polygons().iter().enumerate() {
            if polygon.check_flags(PolygonFlags::HIDDEN)
                || !(polygon.plane().is_equivalent(plane) || polygon.plane().is_equivalent(&flipped))
            {
                continue;
            }
            let hit = if polygon.is_open() {
                polygon.plane().hit_point(ray).and_then(|p| {
                    let near = polygon
                        .edges()
                        .any(|e| e.distance_to_point(&p) <= loose_tolerance());
                    near.then(|| (p - ray.origin).dot(&ray.dir) / ray.dir.norm_squared())
                })
            } else {
                polygon.is_passed(ray)
            };
            let Some(t) = hit else {
                continue;
            };
            let open = polygon.is_open();
            best = match best {
                None => Some((i, t, open)),
                Some((_, bt, _)) if t < bt - tolerance() => Some((i, t, open)),
                Some((_, bt, false)) if open && (t - bt).abs() <= tolerance() => Some((i, t, open)),
                _ => best,
            };
        }
        best.map(|(i, _, _)| i)
    }

    /// Indices of polygons on a plane equivalent to `plane`.
    pub fn query_polygons(&self, plane: &Plane) -> Vec<usize> {
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.plane().is_equivalent(plane))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn query_polygon_by_id(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons().iter().find(|p| p.id() == id)
    }

    pub fn query_intersected_polygons_by_aabb(&self, aabb: &Aabb) -> Vec<usize> {
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.expanded_bounding_box().intersects(aabb))
            .map(|(i, _)| i)
            .collect()
    }

    /// Bounding box center of the polygon picked by `ray`.
    pub fn query_center_of_polygon(&self, ray: &Ray) -> Option<Point3<Real>> {
        self.query_polygon(ray).map(|i| self.polygons()[i].center())
    }

    /// Closest point of any polygon to `point`.
    pub fn query_nearest_pos(&self, point: &Point3<Real>) -> Option<Point3<Real>> {
        let mut best = ENOUGH_BIG_NUMBER;
        let mut found = None;
        for polygon in self.polygons() {
            if let Some(pos) = polygon.query_nearest_pos(point) {
                let d = (pos - point).norm_squared();
                if d < best {
                    best = d;
                    found = Some(pos);
                }
            }
        }
        found
    }

    /// Every edge of the polygons on `plane` that ties for the smallest
    /// distance to `point`.
    pub fn query_nearest_edges(&self, plane: &Plane, point: &Point3<Real>) -> Vec<(usize, Edge3D)> {
        let candidates: Vec<(usize, Edge3D, Real)> = self
            .query_polygons(plane)
            .into_iter()
            .flat_map(|i| {
                self.polygons()[i]
                    .edges()
                    .map(move |e| (i, e, e.distance_to_point(point)))
            })
            .collect();
        let Some(min) = candidates.iter().map(|c| c.2).min_by(|a, b| a.total_cmp(b)) else {
            return Vec::new();
        };
        candidates
            .into_iter()
            .filter(|c| c.2 <= min + tolerance())
            .map(|(i, e, _)| (i, e))
            .collect()
    }

    /// Nearest edges around the point where `ray` meets the first polygon.
    pub fn query_nearest_edges_by_ray(&self, ray: &Ray) -> Vec<(usize, Edge3D)> {
        let Some(index) = self.query_polygon(ray) else {
            return Vec::new();
        };
        let plane = *self.polygons()[index].plane();
        match plane.hit_point(ray) {
            Some(hit) => self.query_nearest_edges(&plane, &hit),
            None => Vec::new(),
        }
    }

    /// Polygons standing at right angles to `polygon` along one of its edges.
    pub fn query_adjacent_perpendicular_polygons(&self, polygon: &Polygon) -> Vec<usize> {
        let normal = polygon.plane().normal;
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.id() != polygon.id()
                    && !p.is_open()
                    && p.plane().normal.dot(&normal).abs() <= tolerance()
                    && p.edges().any(|e| polygon.is_edge_overlapped_by_boundary(&e))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Closed polygons perpendicular to `normal` (the polygon's own normal
    /// by default) whose plane passes through a vertex of `polygon`.
    pub fn query_perpendicular_polygons(&self, polygon: &Polygon, normal: Option<&Vector3<Real>>) -> Vec<usize> {
        let reference = normal.copied().unwrap_or(polygon.plane().normal);
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                !p.is_open()
                    && p.id() != polygon.id()
                    && p.plane().normal.dot(&reference).abs() <= loose_tolerance()
                    && polygon
                        .vertices()
                        .iter()
                        .any(|v| p.plane().distance(&v.pos).abs() <= loose_tolerance())
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Find the face that `polygon` would meet first when pushed or pulled
    /// along its normal.
    ///
    /// With a zero `scale` only faces turned towards the motion count. With
    /// a non-zero `scale` only parallel, same-facing faces count and their
    /// footprint is grown by `scale` before the overlap test.
    pub fn query_opposite_polygon(&self, polygon: &Polygon, flag: FindOppositeFlag, scale: Real) -> OppositePolygon {
        let plane = polygon.plane();
        let normal = plane.normal;
        let flipped = plane.flipped();
        let mut best: Option<(usize, Real, bool)> = None;

        for (i, candidate) in self.polygons().iter().enumerate() {
            let cp = candidate.plane();
            if candidate.is_open()
                || !candidate.is_valid()
                || cp.is_equivalent(plane)
                || cp.is_equivalent(&flipped)
            {
                continue;
            }
            let Some(first) = candidate.vertices().first() else {
                continue;
            };
            let Some(dist) = plane.hit_test(&Ray::new(first.pos, cp.normal)) else {
                continue;
            };
            let facing = cp.normal.dot(&normal);
            let accepted = if scale.abs() < tolerance() {
                facing <= -tolerance()
                    && match flag {
                        FindOppositeFlag::Push => dist <= 0.0,
                        FindOppositeFlag::Pull => dist >= 0.0,
                    }
            } else {
                facing >= 1.0 - tolerance()
                    && match flag {
                        FindOppositeFlag::Push => dist >= 0.0,
                        FindOppositeFlag::Pull => dist <= 0.0,
                    }
            };
            if !accepted {
                continue;
            }

            let target = if facing > 0.0 { *plane } else { flipped };
            let vertices: Vec<Vertex> = candidate
                .vertices()
                .iter()
                .map(|v| Vertex {
                    pos: target.project(&v.pos),
                    ..*v
                })
                .collect();
            let mut footprint = candidate.with_geometry(target, vertices, candidate.edge_indices().to_vec());
            if scale.abs() > tolerance() && !footprint.scale(-scale) {
                continue;
            }
            if !footprint.intersect(polygon, CoEdgeMode::IncludeCoSame) || !footprint.is_valid() {
                continue;
            }

            let vertices: Vec<Vertex> = footprint
                .vertices()
                .iter()
                .map(|v| Vertex {
                    pos: cp.project(&v.pos),
                    ..*v
                })
                .collect();
            let on_candidate = footprint.with_geometry(*cp, vertices, footprint.edge_indices().to_vec());
            let towards = match flag {
                FindOppositeFlag::Push => normal,
                FindOppositeFlag::Pull => -normal,
            };
            let Some(distance) = polygon.nearest_distance(&on_candidate, &towards) else {
                continue;
            };
            let distance = distance.max(0.0);
            if best.is_none_or(|(_, d, _)| distance < d) {
                best = Some((i, distance, facing.abs() >= 1.0 - tolerance()));
            }
        }

        match best {
            None => OppositePolygon::None,
            Some((index, distance, _)) if distance.abs() < 10.0 * tolerance() => {
                OppositePolygon::ZeroDistance { index }
            },
            Some((index, distance, parallel)) => OppositePolygon::Intersection {
                index,
                distance: if parallel { distance } else { distance - SLANTED_GAP },
            },
        }
    }

    /// Non-mirrored polygons sharing area with `polygon`.
    pub fn query_intersection_by_polygon(&self, polygon: &Polygon) -> Vec<usize> {
        let aabb = polygon.expanded_bounding_box();
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                !p.check_flags(PolygonFlags::MIRRORED)
                    && aabb.intersects(&p.expanded_bounding_box())
                    && p.plane().is_equivalent(polygon.plane())
                    && p.has_intersection(polygon) == IntersectionType::Cross
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Points where `edge` crosses the boundaries of non-mirrored polygons
    /// whose plane contains it, ordered along the edge without duplicates.
    pub fn query_intersection_by_edge(&self, edge: &Edge3D) -> Vec<EdgeHit> {
        let mut hits = Vec::new();
        for (i, polygon) in self.polygons().iter().enumerate() {
            let plane = polygon.plane();
            if polygon.check_flags(PolygonFlags::MIRRORED)
                || plane.distance(&edge.v[0]).abs() > tolerance()
                || plane.distance(&edge.v[1]).abs() > tolerance()
            {
                continue;
            }
            let a = plane.w2p(&edge.v[0]);
            let b = plane.w2p(&edge.v[1]);
            for boundary in polygon.edges() {
                let c = plane.w2p(&boundary.v[0]);
                let d = plane.w2p(&boundary.v[1]);
                if let Some((s, _)) = segment_intersection(&a, &b, &c, &d) {
                    hits.push(EdgeHit {
                        polygon: i,
                        position: edge.interpolate(s).0,
                        param: s,
                    });
                }
            }
        }
        hits.sort_by(|x, y| x.param.total_cmp(&y.param));
        let mut unique: Vec<EdgeHit> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !unique.iter().any(|u| is_equivalent_point(&u.position, &hit.position)) {
                unique.push(hit);
            }
        }
        unique
    }

    /// Closed polygons with `edge` on their boundary, in either direction.
    pub fn query_polygons_sharing_edge(&self, edge: &Edge3D) -> Vec<usize> {
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_open() && p.has_edge(edge, false))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn query_equivalent_polygon(&self, polygon: &Polygon) -> Option<usize> {
        self.polygons().iter().position(|p| p.is_equivalent(polygon))
    }

    /// Open chains whose slightly grown bounding box `ray` passes through.
    pub fn query_open_polygons(&self, ray: &Ray) -> Vec<usize> {
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.is_open()
                    && p.bounding_box()
                        .loosened(OPEN_PICK_MARGIN)
                        .intersects_local_ray(ray, Real::MAX)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Some stored polygon overlaps `polygon`: sharing area when `strong`,
    /// sharing area or boundary otherwise.
    pub fn has_intersection(&self, polygon: &Polygon, strong: bool) -> bool {
        self.polygons().iter().any(|p| match p.has_intersection(polygon) {
            IntersectionType::Cross => true,
            IntersectionType::JustTouch => !strong,
            IntersectionType::None => false,
        })
    }

    pub fn has_touched(&self, polygon: &Polygon) -> bool {
        self.polygons()
            .iter()
            .any(|p| p.has_intersection(polygon) == IntersectionType::JustTouch)
    }

    pub fn has_edge(&self, edge: &Edge3D) -> bool {
        self.polygons().iter().any(|p| p.has_edge(edge, false))
    }

    /// Classify `polygon` against the union of the coplanar polygons that
    /// touch it.
    pub fn query_surround_type(&self, polygon: &Polygon) -> SurroundType {
        let mut neighbours = Polygon::empty(*polygon.plane());
        for p in self.polygons() {
            if p.id() == polygon.id()
                || p.is_open()
                || !p.plane().is_equivalent(polygon.plane())
                || p.has_intersection(polygon) != IntersectionType::JustTouch
            {
                continue;
            }
            neighbours.union(p);
        }
        if !neighbours.is_valid() {
            return SurroundType::None;
        }
        neighbours.remove_all_holes();
        if neighbours.include_all_edges(polygon) {
            return SurroundType::SurroundedByOthers;
        }
        let mut outline = polygon.clone();
        outline.remove_all_holes();
        if outline.include_all_edges(&neighbours) {
            SurroundType::SurroundsOthers
        } else {
            SurroundType::SurroundedPartly
        }
    }
}

/// Proper or endpoint crossing of segments `ab` and `cd`, as parameters on
/// each. Parallel segments never cross.
fn segment_intersection(
    a: &Point2<Real>,
    b: &Point2<Real>,
    c: &Point2<Real>,
    d: &Point2<Real>,
) -> Option<(Real, Real)> {
    let r = b - a;
    let s = d - c;
    let denom = r.perp(&s);
    if denom.abs() < Real::EPSILON {
        return None;
    }
    let q = c - a;
    let t = q.perp(&s) / denom;
    let u = q.perp(&r) / denom;
    let slack_t = tolerance() / r.norm().max(Real::EPSILON);
    let slack_u = tolerance() / s.norm().max(Real::EPSILON);
    let inside = |x: Real, slack: Real| x >= -slack && x <= 1.0 + slack;
    (inside(t, slack_t) && inside(u, slack_u)).then_some((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn rect(x0: Real, y0: Real, x1: Real, y1: Real, z: Real) -> Polygon {
        Polygon::from_points(&[
            Point3::new(x0, y0, z),
            Point3::new(x1, y0, z),
            Point3::new(x1, y1, z),
            Point3::new(x0, y1, z),
        ])
    }

    #[test]
    fn ray_picks_nearest_polygon() {
        let model = Model::from_polygons([rect(0.0, 0.0, 1.0, 1.0, 0.0), rect(0.0, 0.0, 1.0, 1.0, 2.0)]);
        let ray = Ray::new(Point3::new(0.5, 0.5, 5.0), -Vector3::z());
        assert_eq!(model.query_polygon(&ray), Some(1));
        let miss = Ray::new(Point3::new(3.0, 0.5, 5.0), -Vector3::z());
        assert_eq!(model.query_polygon(&miss), None);
        let center = model.query_center_of_polygon(&ray).expect("hit");
        assert!((center - Point3::new(0.5, 0.5, 2.0)).norm() < 1e-9);
    }

    #[test]
    fn surround_type_of_hole_filler() {
        let mut model = Model::new();
        let mut frame = rect(0.0, 0.0, 3.0, 3.0, 0.0);
        frame.subtract(&rect(1.0, 1.0, 2.0, 2.0, 0.0));
        model.add_polygon(frame, true);
        let inner = rect(1.0, 1.0, 2.0, 2.0, 0.0);
        assert_eq!(model.query_surround_type(&inner), SurroundType::SurroundedByOthers);
        let lone = rect(10.0, 10.0, 11.0, 11.0, 0.0);
        assert_eq!(model.query_surround_type(&lone), SurroundType::None);
        let side = rect(3.0, 0.0, 4.0, 1.0, 0.0);
        assert_eq!(model.query_surround_type(&side), SurroundType::SurroundedPartly);
    }

    #[test]
    fn nearest_edges_report_ties() {
        let model = Model::from_polygons([rect(0.0, 0.0, 2.0, 2.0, 0.0)]);
        let plane = *model.polygons()[0].plane();
        let edges = model.query_nearest_edges(&plane, &Point3::new(0.0, 0.0, 0.0));
        assert_eq!(edges.len(), 2, "corner touches two edges");
        let edges = model.query_nearest_edges(&plane, &Point3::new(1.0, 0.2, 0.0));
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn edge_crossings_are_sorted() {
        let model = Model::from_polygons([rect(0.0, 0.0, 1.0, 1.0, 0.0), rect(2.0, 0.0, 3.0, 1.0, 0.0)]);
        let edge = Edge3D::new(Point3::new(-1.0, 0.5, 0.0), Point3::new(4.0, 0.5, 0.0));
        let hits = model.query_intersection_by_edge(&edge);
        let xs: Vec<Real> = hits.iter().map(|h| h.position.x).collect();
        assert_eq!(xs.len(), 4, "{xs:?}");
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn opposite_face_is_found_when_pulling() {
        let bottom = rect(0.0, 0.0, 1.0, 1.0, 0.0);
        let top = rect(0.0, 0.0, 1.0, 1.0, 3.0).flipped();
        let model = Model::from_polygons([top]);
        match model.query_opposite_polygon(&bottom, FindOppositeFlag::Pull, 0.0) {
            OppositePolygon::Intersection { index, distance } => {
                assert_eq!(index, 0);
                assert!((distance - 3.0).abs() < 1e-6, "distance {distance}");
            },
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            model.query_opposite_polygon(&bottom, FindOppositeFlag::Push, 0.0),
            OppositePolygon::None
        );
    }
}
