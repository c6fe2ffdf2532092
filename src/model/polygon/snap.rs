//! Exact positions for points coming back from the `geo` overlay.
//!
//! The overlay rounds its coordinates, so its output drifts off the inputs by
//! a few nanometres and carries no texture coordinates. Every vertex it
//! returns is either a source vertex or the crossing of a source edge with
//! another edge or a cutting line. [`SnapTargets`] collects those exact
//! points, UVs included, and maps each overlay point back onto one of them.

use super::Polygon;
use crate::float_types::{Real, tolerance};
use crate::model::edge::{Edge3D, EdgeSplit, split};
use crate::model::plane::{Line2D, Plane};
use crate::model::vertex::Vertex;
use nalgebra::{Matrix2, Point2, Point3};

pub(crate) struct SnapTargets {
    frame: Plane,
    points: Vec<(Point2<Real>, Vertex)>,
    edges: Vec<Edge3D>,
}

impl SnapTargets {
    pub(crate) fn new(frame: Plane) -> Self {
        SnapTargets {
            frame,
            points: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Targets for a Boolean of `a` and `b`: both vertex sets and every
    /// crossing between their edges. Points from `b` take their texture
    /// coordinates from `a`'s mapping, since the result belongs to `a`.
    pub(crate) fn overlay(frame: Plane, a: &Polygon, b: &Polygon) -> Self {
        let mut targets = Self::new(frame).with_polygon(a);
        let uv_map = UvMap::fit(&frame, a);
        let retexture = |pos: &Point3<Real>| {
            let local = frame.w2p(pos);
            match &uv_map {
                Some(map) => map.at(&local),
                None => a.tex_info.apply(&local),
            }
        };
        targets.extend(
            b.vertices
                .iter()
                .map(|v| Vertex::with_uv(v.pos, retexture(&v.pos)))
                .collect(),
        );
        targets.edges.extend(
            b.edges()
                .filter(|edge| !edge.is_degenerate())
                .map(|edge| Edge3D::with_data(edge.v[0], edge.v[1], retexture(&edge.v[0]), retexture(&edge.v[1]))),
        );
        let crossings = targets.crossings(a, b);
        targets.extend(crossings);
        targets
    }

    /// Add the points where the gathered edges cross `line`.
    pub(crate) fn with_cut(mut self, line: &Line2D) -> Self {
        let cuts = self
            .edges
            .iter()
            .filter_map(|edge| self.cut(line, edge))
            .collect();
        self.extend(cuts);
        self
    }

    fn extend(&mut self, vertices: Vec<Vertex>) {
        let frame = self.frame;
        self.points
            .extend(vertices.into_iter().map(|v| (frame.w2p(&v.pos), v)));
    }

    /// Cut point of `edge` on `line`, UV interpolated along the edge.
    fn cut(&self, line: &Line2D, edge: &Edge3D) -> Option<Vertex> {
        match split(&self.frame, line, &self.edges, edge) {
            EdgeSplit::Cross(pos, _) => {
                // the positive piece starts at edge.v[0] exactly when v[0] is in front
                let end = usize::from(pos.v[0] == edge.v[0]);
                Some(Vertex::with_uv(pos.v[end], pos.data[end]))
            },
            _ => None,
        }
    }

    fn crossings(&self, a: &Polygon, b: &Polygon) -> Vec<Vertex> {
        let mut out = Vec::new();
        for cutter in b.edges().filter(|edge| !edge.is_degenerate()) {
            let Some(line) = Line2D::from_points(
                &self.frame.w2p(&cutter.v[0]),
                &self.frame.w2p(&cutter.v[1]),
            ) else {
                continue;
            };
            out.extend(
                a.edges()
                    .filter_map(|edge| self.cut(&line, &edge))
                    .filter(|v| cutter.contains_point(&v.pos)),
            );
        }
        out
    }

    /// The exact vertex `point` stands for: the nearest target within
    /// tolerance, else its projection on a source edge. `None` when the
    /// point is on neither.
    pub(crate) fn snap(&self, point: &Point2<Real>) -> Option<Vertex> {
        let nearest = self
            .points
            .iter()
            .map(|(local, v)| ((local - point).norm(), v))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, v)) = nearest.filter(|(d, _)| *d < tolerance()) {
            return Some(*v);
        }
        let world: Point3<Real> = self.frame.p2w(point);
        self.edges
            .iter()
            .find(|edge| edge.contains_point(&world))
            .map(|edge| {
                let (pos, uv) = edge.interpolate(edge.param_of(&world).clamp(0.0, 1.0));
                Vertex::with_uv(pos, uv)
            })
    }
}

/// Affine texture mapping of a polygon in a plane frame, fitted to three
/// well spread vertices.
struct UvMap {
    origin: Point2<Real>,
    uv: Point2<Real>,
    linear: Matrix2<Real>,
}

impl UvMap {
    fn fit(frame: &Plane, polygon: &Polygon) -> Option<Self> {
        let first = polygon.vertices.first()?;
        let origin = frame.w2p(&first.pos);
        let offset = |v: &Vertex| frame.w2p(&v.pos) - origin;
        let far = polygon
            .vertices
            .iter()
            .max_by(|a, b| offset(a).norm_squared().total_cmp(&offset(b).norm_squared()))?;
        let d1 = offset(far);
        let spread = |v: &Vertex| d1.perp(&offset(v)).abs();
        let wide = polygon
            .vertices
            .iter()
            .max_by(|a, b| spread(a).total_cmp(&spread(b)))?;
        let d2 = offset(wide);
        if d1.perp(&d2).abs() < tolerance() * tolerance() {
            return None;
        }
        let inverse = Matrix2::from_columns(&[d1, d2]).try_inverse()?;
        let texture = Matrix2::from_columns(&[far.uv - first.uv, wide.uv - first.uv]);
        Some(UvMap {
            origin,
            uv: first.uv,
            linear: texture * inverse,
        })
    }

    fn at(&self, local: &Point2<Real>) -> Point2<Real> {
        self.uv + self.linear * (local - self.origin)
    }
}
