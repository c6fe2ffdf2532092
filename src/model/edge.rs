//! Directed 3D edges and the edge-level split/overlap primitives.

use crate::float_types::{Real, tolerance};
use crate::model::plane::{Line2D, Plane};
use crate::model::vertex::is_equivalent_point;
use nalgebra::{Point2, Point3, Vector3};

/// A directed segment with per-endpoint texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge3D {
    pub v: [Point3<Real>; 2],
    pub data: [Point2<Real>; 2],
}

/// Result of [`split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeSplit {
    /// The edge straddles the line: `(positive piece, negative piece)`.
    Cross(Edge3D, Edge3D),
    Positive,
    Negative,
    /// Both endpoints lie on the line.
    Coincidence,
}

/// Result of [`intersect_edge_3d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOverlap {
    /// The edges are not colinear.
    Invalid,
    /// Colinear, but the overlap is empty or shorter than the tolerance.
    Zero,
    One(Edge3D),
}

/// Result of [`subtract_edge_3d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeRemainder {
    /// The edges are not colinear.
    Invalid,
    /// Fully covered.
    Zero,
    One(Edge3D),
    Two(Edge3D, Edge3D),
}

impl Edge3D {
    pub fn new(a: Point3<Real>, b: Point3<Real>) -> Self {
        Edge3D {
            v: [a, b],
            data: [Point2::origin(); 2],
        }
    }

    pub fn with_data(a: Point3<Real>, b: Point3<Real>, da: Point2<Real>, db: Point2<Real>) -> Self {
        Edge3D {
            v: [a, b],
            data: [da, db],
        }
    }

    pub fn inverted(&self) -> Self {
        Edge3D {
            v: [self.v[1], self.v[0]],
            data: [self.data[1], self.data[0]],
        }
    }

    pub fn invert(&mut self) {
        *self = self.inverted();
    }

    pub fn direction(&self) -> Vector3<Real> {
        self.v[1] - self.v[0]
    }

    pub fn length(&self) -> Real {
        self.direction().norm()
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() <= tolerance()
    }

    pub fn center(&self) -> Point3<Real> {
        nalgebra::center(&self.v[0], &self.v[1])
    }

    /// Point and interpolated data at parameter `t` along the edge.
    pub fn interpolate(&self, t: Real) -> (Point3<Real>, Point2<Real>) {
        (
            self.v[0] + self.direction() * t,
            self.data[0] + (self.data[1] - self.data[0]) * t,
        )
    }

    /// Same endpoints in the same order, within tolerance.
    pub fn is_equivalent(&self, other: &Edge3D) -> bool {
        is_equivalent_point(&self.v[0], &other.v[0]) && is_equivalent_point(&self.v[1], &other.v[1])
    }

    /// Same endpoints in either order.
    pub fn is_equivalent_undirected(&self, other: &Edge3D) -> bool {
        self.is_equivalent(other) || self.is_equivalent(&other.inverted())
    }

    /// Parameter of the orthogonal projection of `point` on the edge's line.
    pub fn param_of(&self, point: &Point3<Real>) -> Real {
        let d = self.direction();
        let len2 = d.norm_squared();
        if len2 < Real::EPSILON {
            return 0.0;
        }
        (point - self.v[0]).dot(&d) / len2
    }

    /// Closest point on the segment.
    pub fn nearest_point(&self, point: &Point3<Real>) -> Point3<Real> {
        let t = self.param_of(point).clamp(0.0, 1.0);
        self.v[0] + self.direction() * t
    }

    pub fn distance_to_point(&self, point: &Point3<Real>) -> Real {
        (self.nearest_point(point) - point).norm()
    }

    /// Distance from `point` to the infinite line through the edge.
    pub fn distance_to_line(&self, point: &Point3<Real>) -> Real {
        let t = self.param_of(point);
        (self.v[0] + self.direction() * t - point).norm()
    }

    /// `point` lies on the segment within tolerance.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        self.distance_to_point(point) < tolerance()
    }

    /// Both of `other`'s endpoints lie on this edge's line.
    pub fn is_colinear(&self, other: &Edge3D) -> bool {
        !self.is_degenerate()
            && self.distance_to_line(&other.v[0]) < tolerance()
            && self.distance_to_line(&other.v[1]) < tolerance()
    }

    /// `other` lies entirely on this segment.
    pub fn contains_edge(&self, other: &Edge3D) -> bool {
        self.contains_point(&other.v[0]) && self.contains_point(&other.v[1])
    }

    /// Sub-edge between two parameters, data interpolated.
    fn sub_edge(&self, t0: Real, t1: Real) -> Edge3D {
        let (a, da) = self.interpolate(t0);
        let (b, db) = self.interpolate(t1);
        Edge3D::with_data(a, b, da, db)
    }
}

/// Parameter interval of `b` projected on `a`, sorted.
fn covered_interval(a: &Edge3D, b: &Edge3D) -> (Real, Real) {
    let t0 = a.param_of(&b.v[0]);
    let t1 = a.param_of(&b.v[1]);
    if t0 <= t1 { (t0, t1) } else { (t1, t0) }
}

/// Colinear overlap of `a` and `b`, oriented like `a`.
pub fn intersect_edge_3d(a: &Edge3D, b: &Edge3D) -> EdgeOverlap {
    if !a.is_colinear(b) {
        return EdgeOverlap::Invalid;
    }
    let (lo, hi) = covered_interval(a, b);
    let lo = lo.max(0.0);
    let hi = hi.min(1.0);
    if (hi - lo) * a.length() <= tolerance() {
        return EdgeOverlap::Zero;
    }
    EdgeOverlap::One(a.sub_edge(lo, hi))
}

/// The part(s) of `a` not covered by `b`.
pub fn subtract_edge_3d(a: &Edge3D, b: &Edge3D) -> EdgeRemainder {
    if !a.is_colinear(b) {
        return EdgeRemainder::Invalid;
    }
    let len = a.length();
    let (lo, hi) = covered_interval(a, b);
    if hi <= 0.0 || lo >= 1.0 || (hi - lo) * len <= tolerance() {
        return EdgeRemainder::One(*a);
    }
    let head = (lo * len > tolerance()).then(|| a.sub_edge(0.0, lo));
    let tail = ((1.0 - hi) * len > tolerance()).then(|| a.sub_edge(hi, 1.0));
    match (head, tail) {
        (Some(h), Some(t)) => EdgeRemainder::Two(h, t),
        (Some(e), None) | (None, Some(e)) => EdgeRemainder::One(e),
        (None, None) => EdgeRemainder::Zero,
    }
}

/// Classify `edge` (lying in `plane`) against a 2D `line` of that plane and
/// cut it when it straddles the line.
///
/// The cut point is snapped to any endpoint of `helpers` closer than the
/// tolerance so repeated splits along the same line agree on positions.
pub fn split(plane: &Plane, line: &Line2D, helpers: &[Edge3D], edge: &Edge3D) -> EdgeSplit {
    let eps = tolerance();
    let d0 = line.distance(&plane.w2p(&edge.v[0]));
    let d1 = line.distance(&plane.w2p(&edge.v[1]));

    if d0.abs() <= eps && d1.abs() <= eps {
        return EdgeSplit::Coincidence;
    }
    if d0 >= -eps && d1 >= -eps {
        return EdgeSplit::Positive;
    }
    if d0 <= eps && d1 <= eps {
        return EdgeSplit::Negative;
    }

    let t = d0 / (d0 - d1);
    let (mut cut, cut_data) = edge.interpolate(t);
    if let Some(snap) = helpers
        .iter()
        .flat_map(|h| h.v.iter())
        .find(|p| is_equivalent_point(p, &cut))
    {
        cut = *snap;
    }

    let first = Edge3D::with_data(edge.v[0], cut, edge.data[0], cut_data);
    let second = Edge3D::with_data(cut, edge.v[1], cut_data, edge.data[1]);
    if d0 > 0.0 {
        EdgeSplit::Cross(first, second)
    } else {
        EdgeSplit::Cross(second, first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(a: [Real; 3], b: [Real; 3]) -> Edge3D {
        Edge3D::new(Point3::from(a), Point3::from(b))
    }

    #[test]
    fn subtract_middle_leaves_two() {
        let a = e([0.0, 0.0, 0.0], [3.0, 0.0, 0.0]);
        let b = e([2.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        match subtract_edge_3d(&a, &b) {
            EdgeRemainder::Two(h, t) => {
                assert!(h.is_equivalent(&e([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])));
                assert!(t.is_equivalent(&e([2.0, 0.0, 0.0], [3.0, 0.0, 0.0])));
            },
            other => panic!("expected two pieces, got {other:?}"),
        }
    }

    #[test]
    fn non_colinear_is_invalid() {
        let a = e([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = e([0.0, 1.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!(intersect_edge_3d(&a, &b), EdgeOverlap::Invalid);
        assert_eq!(subtract_edge_3d(&a, &b), EdgeRemainder::Invalid);
    }

    #[test]
    fn split_interpolates_data() {
        let plane = Plane::default();
        let line = Line2D::from_points(&Point2::new(0.5, -1.0), &Point2::new(0.5, 1.0))
            .expect("distinct points");
        let edge = Edge3D::with_data(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        );
        match split(&plane, &line, &[], &edge) {
            EdgeSplit::Cross(pos, neg) => {
                assert!((pos.v[0].x - 1.0).abs() < 1e-9 || (pos.v[1].x - 1.0).abs() < 1e-9);
                assert!((neg.data[0].x - 0.0).abs() < 1e-9);
                assert!((neg.data[1].x - 0.5).abs() < 1e-9);
            },
            other => panic!("expected a cross, got {other:?}"),
        }
    }

    #[test]
    fn split_snaps_cut_to_nearby_helper_endpoint() {
        let plane = Plane::default();
        let line = Line2D::from_points(&Point2::new(0.5, -1.0), &Point2::new(0.5, 1.0))
            .expect("distinct points");
        let edge = e([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let helper = e([0.5 + 1e-6, 0.0, 0.0], [0.5, 2.0, 0.0]);
        match split(&plane, &line, &[helper], &edge) {
            EdgeSplit::Cross(pos, neg) => {
                assert_eq!(pos.v[0], helper.v[0]);
                assert_eq!(neg.v[1], helper.v[0]);
            },
            other => panic!("expected a cross, got {other:?}"),
        }

        let far = e([0.6, 0.0, 0.0], [0.6, 2.0, 0.0]);
        match split(&plane, &line, &[far], &edge) {
            EdgeSplit::Cross(pos, _) => assert!((pos.v[0].x - 0.5).abs() < 1e-12),
            other => panic!("expected a cross, got {other:?}"),
        }
    }
}
