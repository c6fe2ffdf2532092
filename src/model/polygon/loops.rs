//! Loop tracing, islands and conversion to and from `geo` shapes.

use super::snap::SnapTargets;
use super::{Polygon, signed_area_2d};
use crate::float_types::{Real, tolerance};
use crate::model::plane::Plane;
use crate::model::vertex::Vertex;
use geo::{Contains, Coord, LineString, MultiPolygon, Point as GeoPoint, Polygon as GeoPolygon};
use nalgebra::Point2;

/// An outer loop and the holes it contains, as vertex index rings.
pub(crate) struct LoopGroup {
    pub outer: Vec<usize>,
    pub holes: Vec<Vec<usize>>,
}

impl Polygon {
    /// Closed loops as vertex index rings, in edge order. Dangling chains are
    /// not reported.
    pub fn loops(&self) -> Vec<Vec<usize>> {
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for (i, &[a, _]) in self.edges.iter().enumerate() {
            outgoing[a].push(i);
        }
        let mut used = vec![false; self.edges.len()];
        let mut loops = Vec::new();

        for first in 0..self.edges.len() {
            if used[first] {
                continue;
            }
            used[first] = true;
            let [start, mut cursor] = self.edges[first];
            let mut ring = vec![start];
            let mut closed = false;
            // each step consumes an edge, so this terminates
            loop {
                if cursor == start {
                    closed = true;
                    break;
                }
                let Some(&next) = outgoing[cursor].iter().find(|&&e| !used[e]) else {
                    break;
                };
                used[next] = true;
                ring.push(cursor);
                cursor = self.edges[next][1];
            }
            if closed && ring.len() >= 3 {
                loops.push(ring);
            }
        }
        loops
    }

    fn ring_points(&self, ring: &[usize], frame: &Plane) -> Vec<Point2<Real>> {
        ring.iter()
            .map(|&i| frame.w2p(&self.vertices[i].pos))
            .collect()
    }

    /// Signed area of a loop in the polygon's own frame: positive for outer
    /// loops, negative for holes.
    pub(crate) fn loop_signed_area(&self, ring: &[usize]) -> Real {
        signed_area_2d(&self.ring_points(ring, &self.plane))
    }

    pub fn outer_loops(&self) -> Vec<Vec<usize>> {
        self.loops()
            .into_iter()
            .filter(|ring| self.loop_signed_area(ring) > 0.0)
            .collect()
    }

    pub fn hole_loops(&self) -> Vec<Vec<usize>> {
        self.loops()
            .into_iter()
            .filter(|ring| self.loop_signed_area(ring) < 0.0)
            .collect()
    }

    pub fn has_holes(&self) -> bool {
        !self.hole_loops().is_empty()
    }

    /// Pair each hole with the outer loop that contains it. Holes outside
    /// every outer loop are dropped.
    pub(crate) fn loop_groups(&self) -> Vec<LoopGroup> {
        let mut groups: Vec<LoopGroup> = Vec::new();
        let mut shapes: Vec<GeoPolygon<Real>> = Vec::new();
        let mut holes = Vec::new();
        for ring in self.loops() {
            let area = self.loop_signed_area(&ring);
            if area > 0.0 {
                shapes.push(GeoPolygon::new(
                    to_line_string(&self.ring_points(&ring, &self.plane)),
                    Vec::new(),
                ));
                groups.push(LoopGroup {
                    outer: ring,
                    holes: Vec::new(),
                });
            } else if area < 0.0 {
                holes.push(ring);
            }
        }
        for hole in holes {
            let sample = self.plane.w2p(&self.vertices[hole[0]].pos);
            let sample = GeoPoint::new(sample.x, sample.y);
            // the smallest containing outer loop owns the hole
            let owner = shapes
                .iter()
                .enumerate()
                .filter(|(_, shape)| shape.contains(&sample) || touches_ring(shape, &sample))
                .min_by(|a, b| {
                    let aa = geo::Area::unsigned_area(a.1);
                    let bb = geo::Area::unsigned_area(b.1);
                    aa.total_cmp(&bb)
                })
                .map(|(i, _)| i);
            if let Some(i) = owner {
                groups[i].holes.push(hole);
            }
        }
        groups
    }

    /// Build a polygon (same metadata) from index rings of this polygon.
    fn polygon_from_rings(&self, rings: &[&Vec<usize>]) -> Polygon {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for ring in rings {
            let base = vertices.len();
            let n = ring.len();
            vertices.extend(ring.iter().map(|&i| self.vertices[i]));
            edges.extend((0..n).map(|k| [base + k, base + (k + 1) % n]));
        }
        self.with_geometry(self.plane, vertices, edges)
    }

    /// Split into one polygon per outer loop (with its holes). The first
    /// island keeps this polygon's id.
    pub fn islands(&self) -> Vec<Polygon> {
        if self.is_open() {
            return vec![self.clone()];
        }
        let groups = self.loop_groups();
        if groups.len() <= 1 {
            return vec![self.clone()];
        }
        groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let mut rings = vec![&group.outer];
                rings.extend(group.holes.iter());
                let mut island = self.polygon_from_rings(&rings);
                if i > 0 {
                    island.new_id();
                }
                island
            })
            .collect()
    }

    /// Drop every hole loop.
    pub fn remove_all_holes(&mut self) {
        if self.is_open() {
            return;
        }
        let outers = self.outer_loops();
        let rings: Vec<&Vec<usize>> = outers.iter().collect();
        let rebuilt = self.polygon_from_rings(&rings);
        self.assign_geometry(rebuilt);
    }

    /// Closed region as a `geo` multipolygon in `frame`'s 2D coordinates.
    ///
    /// Loops are classified as outer or hole in the polygon's own frame, so
    /// `frame` may face either way.
    pub(crate) fn to_geo(&self, frame: &Plane) -> MultiPolygon<Real> {
        if self.is_open() {
            return MultiPolygon::new(Vec::new());
        }
        let polygons = self
            .loop_groups()
            .into_iter()
            .map(|group| {
                let exterior = to_line_string(&self.ring_points(&group.outer, frame));
                let interiors = group
                    .holes
                    .iter()
                    .map(|hole| to_line_string(&self.ring_points(hole, frame)))
                    .collect();
                GeoPolygon::new(exterior, interiors)
            })
            .collect();
        MultiPolygon::new(polygons)
    }

    /// Polygons on `plane` for each island of `shape`, carrying this
    /// polygon's metadata. Outer rings are wound counter-clockwise in the
    /// plane frame and holes clockwise; slivers are dropped.
    ///
    /// Each overlay point is replaced by the exact vertex of `targets` it
    /// stands for, texture coordinate included. Points matching no target
    /// are mapped through this polygon's [`TexInfo`](crate::model::vertex::TexInfo).
    pub(crate) fn from_geo(&self, plane: &Plane, shape: &MultiPolygon<Real>, targets: &SnapTargets) -> Vec<Polygon> {
        let mut out = Vec::new();
        for geo_polygon in shape.iter() {
            let Some(exterior) = clean_ring(geo_polygon.exterior(), true) else {
                continue;
            };
            let mut rings = vec![exterior];
            rings.extend(
                geo_polygon
                    .interiors()
                    .iter()
                    .filter_map(|ring| clean_ring(ring, false)),
            );
            let loops: Vec<Vec<Vertex>> = rings
                .iter()
                .map(|ring| self.snap_ring(plane, ring, targets))
                .filter(|ring| ring.len() >= 3)
                .collect();
            if loops.is_empty() {
                continue;
            }
            let built = Polygon::from_loops(*plane, loops);
            out.push(self.with_geometry(*plane, built.vertices, built.edges));
        }
        out
    }

    fn snap_ring(&self, plane: &Plane, ring: &[Point2<Real>], targets: &SnapTargets) -> Vec<Vertex> {
        let mut snapped: Vec<Vertex> = Vec::with_capacity(ring.len());
        for q in ring {
            let v = targets.snap(q).unwrap_or_else(|| {
                let pos = plane.p2w(q);
                Vertex::with_uv(pos, self.tex_info.apply(&plane.w2p(&pos)))
            });
            if snapped.last().is_none_or(|last| !last.is_equivalent(&v)) {
                snapped.push(v);
            }
        }
        while snapped.len() > 1 && snapped[0].is_equivalent(&snapped[snapped.len() - 1]) {
            snapped.pop();
        }
        snapped
    }

    /// Combine several coplanar pieces into a single polygon with many loops.
    pub(crate) fn merge_pieces(&self, plane: &Plane, pieces: Vec<Polygon>) -> Polygon {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for piece in pieces {
            let base = vertices.len();
            vertices.extend(piece.vertices);
            edges.extend(piece.edges.iter().map(|&[a, b]| [a + base, b + base]));
        }
        self.with_geometry(*plane, vertices, edges)
    }
}

fn to_line_string(points: &[Point2<Real>]) -> LineString<Real> {
    LineString::new(points.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

fn touches_ring(shape: &GeoPolygon<Real>, sample: &GeoPoint<Real>) -> bool {
    shape.exterior().lines().any(|line| {
        let a = Point2::new(line.start.x, line.start.y);
        let b = Point2::new(line.end.x, line.end.y);
        let p = Point2::new(sample.x(), sample.y());
        let d = b - a;
        let len2 = d.norm_squared();
        if len2 < Real::EPSILON {
            return (p - a).norm() < tolerance();
        }
        let t = ((p - a).dot(&d) / len2).clamp(0.0, 1.0);
        (a + d * t - p).norm() < tolerance()
    })
}

/// Strip the closing coordinate and near-duplicate points, orient the ring
/// (counter-clockwise when `outer`), and reject rings without area.
fn clean_ring(ring: &LineString<Real>, outer: bool) -> Option<Vec<Point2<Real>>> {
    let mut points: Vec<Point2<Real>> = Vec::with_capacity(ring.0.len());
    for c in ring.coords() {
        let p = Point2::new(c.x, c.y);
        if points
            .last()
            .is_none_or(|last: &Point2<Real>| (last - p).norm() > tolerance() * 0.1)
        {
            points.push(p);
        }
    }
    while points.len() > 1 {
        let first = points[0];
        let last = points[points.len() - 1];
        if (first - last).norm() <= tolerance() * 0.1 {
            points.pop();
        } else {
            break;
        }
    }
    if points.len() < 3 {
        return None;
    }
    let area = signed_area_2d(&points);
    if area.abs() <= tolerance() * tolerance() {
        return None;
    }
    if (area > 0.0) != outer {
        points.reverse();
    }
    Some(points)
}
