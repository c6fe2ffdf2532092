//! Planar edge graphs and the face cycles they bound.
//!
//! Used to cut polygons along open chains and to cap the cross-section left
//! by a plane clip. Vertices are welded by position, and turn order at a
//! vertex is decided with exact orientation predicates on the plane-local
//! coordinates.

use crate::float_types::{Real, tolerance};
use crate::model::plane::Plane;
use crate::model::polygon::signed_area_2d;
use crate::model::vertex::{PositionKey, is_equivalent_point};
use geo::{Contains, Coord as GeoCoord, LineString, Point as GeoPoint, Polygon as GeoPolygon};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point2, Point3};
use robust::{Coord, orient2d};
use std::cmp::Ordering;

/// Directed edges between welded points of one plane.
#[derive(Debug, Clone)]
pub(crate) struct EdgeGraph {
    plane: Plane,
    points: Vec<Point3<Real>>,
    local: Vec<Point2<Real>>,
    cells: HashMap<PositionKey, Vec<usize>>,
    outgoing: HashMap<usize, Vec<usize>>,
    edges: HashSet<(usize, usize)>,
}

impl EdgeGraph {
    pub(crate) fn new(plane: Plane) -> Self {
        EdgeGraph {
            plane,
            points: Vec::new(),
            local: Vec::new(),
            cells: HashMap::new(),
            outgoing: HashMap::new(),
            edges: HashSet::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn vertex(&mut self, pos: &Point3<Real>) -> usize {
        let key = PositionKey::new(pos);
        for cell in key.neighbourhood() {
            if let Some(found) = self.cells.get(&cell).and_then(|list| {
                list.iter()
                    .copied()
                    .find(|&i| is_equivalent_point(&self.points[i], pos))
            }) {
                return found;
            }
        }
        let index = self.points.len();
        self.points.push(*pos);
        self.local.push(self.plane.w2p(pos));
        self.cells.entry(key).or_default().push(index);
        index
    }

    /// Add `a -> b`. Returns `false` for degenerate or repeated edges.
    pub(crate) fn add_edge(&mut self, a: &Point3<Real>, b: &Point3<Real>) -> bool {
        let (i, j) = (self.vertex(a), self.vertex(b));
        if i == j || !self.edges.insert((i, j)) {
            return false;
        }
        self.outgoing.entry(i).or_default().push(j);
        true
    }

    pub(crate) fn add_undirected(&mut self, a: &Point3<Real>, b: &Point3<Real>) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    /// Every vertex has as many incoming as outgoing edges.
    pub(crate) fn is_balanced(&self) -> bool {
        let mut balance: HashMap<usize, i64> = HashMap::new();
        for &(a, b) in &self.edges {
            *balance.entry(a).or_default() += 1;
            *balance.entry(b).or_default() -= 1;
        }
        balance.values().all(|&b| b == 0)
    }

    /// Signed area of a cycle in the plane frame, positive when it winds
    /// counter-clockwise around the plane normal.
    pub(crate) fn cycle_area(&self, cycle: &[usize]) -> Real {
        let pts: Vec<Point2<Real>> = cycle.iter().map(|&i| self.local[i]).collect();
        signed_area_2d(&pts)
    }

    pub(crate) fn cycle_points(&self, cycle: &[usize]) -> Vec<Point3<Real>> {
        cycle.iter().map(|&i| self.points[i]).collect()
    }

    /// Walk every directed edge once, always taking the sharpest clockwise
    /// turn, so each traced cycle keeps its face on the left. Spurs are
    /// folded away and cycles without area are dropped.
    pub(crate) fn cycles(&self) -> Vec<Vec<usize>> {
        let mut starts: Vec<(usize, usize)> = self.edges.iter().copied().collect();
        starts.sort_unstable();

        let mut used: HashSet<(usize, usize)> = HashSet::with_capacity(starts.len());
        let mut cycles = Vec::new();
        for start in starts {
            if !used.insert(start) {
                continue;
            }
            let mut cycle = vec![start.0];
            let mut current = start;
            let closed = loop {
                let Some(next) = self.next_edge(current) else {
                    break false;
                };
                if next == start {
                    break true;
                }
                if !used.insert(next) {
                    break false;
                }
                cycle.push(next.0);
                current = next;
            };
            if !closed {
                continue;
            }
            let cycle = remove_spurs(cycle);
            if cycle.len() >= 3 && self.cycle_area(&cycle).abs() > tolerance() * tolerance() {
                cycles.push(cycle);
            }
        }
        cycles
    }

    fn next_edge(&self, (u, v): (usize, usize)) -> Option<(usize, usize)> {
        let candidates = self.outgoing.get(&v)?;
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.turn_order(u, v, a, b))
            .map(|w| (v, w))
    }

    fn coord(&self, i: usize) -> Coord<Real> {
        Coord {
            x: self.local[i].x,
            y: self.local[i].y,
        }
    }

    /// 0: clockwise of `v -> u`, 1: straight on, 2: counter-clockwise,
    /// 3: straight back along `v -> u`.
    fn half(&self, u: usize, v: usize, w: usize) -> u8 {
        if w == u {
            return 3;
        }
        let o = orient2d(self.coord(v), self.coord(u), self.coord(w));
        if o < 0.0 {
            0
        } else if o > 0.0 {
            2
        } else if (self.local[u] - self.local[v]).dot(&(self.local[w] - self.local[v])) < 0.0 {
            1
        } else {
            3
        }
    }

    /// Order `v -> a` and `v -> b` by clockwise angle from `v -> u`.
    fn turn_order(&self, u: usize, v: usize, a: usize, b: usize) -> Ordering {
        let (ha, hb) = (self.half(u, v, a), self.half(u, v, b));
        if ha != hb {
            return ha.cmp(&hb);
        }
        let o = orient2d(self.coord(v), self.coord(a), self.coord(b));
        if o < 0.0 {
            Ordering::Less
        } else if o > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Fold `a -> b -> a` excursions out of a cyclic vertex list.
fn remove_spurs(mut cycle: Vec<usize>) -> Vec<usize> {
    'scan: while cycle.len() >= 3 {
        let n = cycle.len();
        for i in 0..n {
            if cycle[(i + n - 1) % n] == cycle[(i + 1) % n] {
                let (tip, base) = (i, (i + 1) % n);
                let (hi, lo) = if tip > base { (tip, base) } else { (base, tip) };
                cycle.remove(hi);
                cycle.remove(lo);
                continue 'scan;
            }
        }
        break;
    }
    cycle
}

/// Group loops into regions: each hole joins the smallest outer loop that
/// contains it. Holes contained by no outer loop are dropped.
pub(crate) fn assemble_regions(
    plane: &Plane,
    outers: Vec<Vec<Point3<Real>>>,
    holes: Vec<Vec<Point3<Real>>>,
) -> Vec<Vec<Vec<Point3<Real>>>> {
    let shapes: Vec<GeoPolygon<Real>> = outers.iter().map(|ring| to_geo(plane, ring)).collect();
    let mut regions: Vec<Vec<Vec<Point3<Real>>>> = outers.into_iter().map(|ring| vec![ring]).collect();
    for hole in holes {
        let sample = interior_sample(plane, &hole);
        let owner = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| shape.contains(&sample))
            .min_by(|a, b| ring_area(a.1).total_cmp(&ring_area(b.1)))
            .map(|(i, _)| i);
        if let Some(i) = owner {
            regions[i].push(hole);
        }
    }
    regions
}

/// How many of `others` contain `ring`.
pub(crate) fn nesting_depth(plane: &Plane, ring: &[Point3<Real>], others: &[Vec<Point3<Real>>]) -> usize {
    let sample = interior_sample(plane, ring);
    let own = ring_area(&to_geo(plane, ring));
    others
        .iter()
        .map(|other| to_geo(plane, other))
        .filter(|shape| ring_area(shape) > own + tolerance() * tolerance() && shape.contains(&sample))
        .count()
}

fn to_geo(plane: &Plane, ring: &[Point3<Real>]) -> GeoPolygon<Real> {
    let coords = ring
        .iter()
        .map(|p| {
            let q = plane.w2p(p);
            GeoCoord { x: q.x, y: q.y }
        })
        .collect::<Vec<_>>();
    GeoPolygon::new(LineString::new(coords), Vec::new())
}

fn ring_area(shape: &GeoPolygon<Real>) -> Real {
    use geo::Area;
    shape.unsigned_area()
}

/// A point just inside the ring next to the middle of its longest edge,
/// on whichever side the ring's area lies.
fn interior_sample(plane: &Plane, ring: &[Point3<Real>]) -> GeoPoint<Real> {
    let pts: Vec<Point2<Real>> = ring.iter().map(|p| plane.w2p(p)).collect();
    let n = pts.len();
    let ccw = signed_area_2d(&pts) >= 0.0;
    let (i, _) = (0..n)
        .map(|i| (i, (pts[(i + 1) % n] - pts[i]).norm_squared()))
        .fold((0, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    let a = pts[i];
    let b = pts[(i + 1) % n];
    let d = (b - a).try_normalize(Real::EPSILON).unwrap_or_default();
    let left = nalgebra::Vector2::new(-d.y, d.x);
    let inward = if ccw { left } else { -left };
    let mid = a + (b - a) * 0.5 + inward * tolerance() * 2.0;
    GeoPoint::new(mid.x, mid.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_plane() -> Plane {
        Plane::from_normal(nalgebra::Vector3::z(), 0.0)
    }

    fn p(x: Real, y: Real) -> Point3<Real> {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn square_with_diagonal_traces_two_triangles() {
        let mut graph = EdgeGraph::new(xy_plane());
        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        for i in 0..4 {
            graph.add_edge(&square[i], &square[(i + 1) % 4]);
        }
        graph.add_undirected(&p(0.0, 0.0), &p(1.0, 1.0));
        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 2, "cycles: {cycles:?}");
        for cycle in &cycles {
            assert_eq!(cycle.len(), 3);
            assert!((graph.cycle_area(cycle) - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn undirected_square_traces_both_windings() {
        let mut graph = EdgeGraph::new(xy_plane());
        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        for i in 0..4 {
            graph.add_undirected(&square[i], &square[(i + 1) % 4]);
        }
        assert!(graph.is_balanced());
        let mut areas: Vec<Real> = graph.cycles().iter().map(|c| graph.cycle_area(c)).collect();
        areas.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(areas.len(), 2);
        assert!((areas[0] + 1.0).abs() < 1e-9 && (areas[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dangling_edge_is_folded_away() {
        let mut graph = EdgeGraph::new(xy_plane());
        let ring = [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 1.0), p(2.0, 2.0), p(0.0, 2.0)];
        for i in 0..5 {
            graph.add_edge(&ring[i], &ring[(i + 1) % 5]);
        }
        graph.add_undirected(&p(2.0, 1.0), &p(1.0, 1.0));
        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 1);
        assert!((graph.cycle_area(&cycles[0]) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn holes_join_their_container() {
        let plane = xy_plane();
        let outer = vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)];
        let hole = vec![p(1.0, 1.0), p(1.0, 2.0), p(2.0, 2.0), p(2.0, 1.0)];
        let stray = vec![p(9.0, 9.0), p(9.0, 10.0), p(10.0, 10.0), p(10.0, 9.0)];
        let regions = assemble_regions(&plane, vec![outer.clone()], vec![hole.clone(), stray]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 2);
        assert_eq!(nesting_depth(&plane, &hole, &[outer]), 1);
    }
}
