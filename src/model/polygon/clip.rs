//! Cutting a polygon with a plane.

use super::Polygon;
use super::snap::SnapTargets;
use crate::float_types::{Real, tolerance};
use crate::model::bsp::{ClipObjective, ClipType};
use crate::model::edge::Edge3D;
use crate::model::plane::{BACK, COPLANAR, FRONT, Line2D, Plane};
use crate::model::trace::{EdgeGraph, assemble_regions};
use crate::model::vertex::{Vertex, is_equivalent_point};
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon as GeoPolygon};
use nalgebra::{Point2, Point3};

/// Pieces of a polygon on either side of a cutting plane.
#[derive(Debug, Clone, Default)]
pub struct PlaneClip {
    pub front: Vec<Polygon>,
    pub back: Vec<Polygon>,
    /// Segments along the cut, taken from the front pieces.
    pub boundary_edges: Vec<Edge3D>,
}

impl Polygon {
    /// [`FRONT`], [`BACK`], [`COPLANAR`] or `SPANNING` relative to `plane`.
    pub fn classify(&self, plane: &Plane) -> i8 {
        plane.classify_points(self.vertices.iter().map(|v| &v.pos))
    }

    /// Split against `plane`.
    ///
    /// A polygon lying on an equivalent plane goes whole to the front, one on
    /// the inverted plane whole to the back. Closed polygons are cut in their
    /// own 2D frame so every island and hole survives; open chains are cut
    /// edge by edge.
    pub fn clip_by_plane(&self, plane: &Plane) -> PlaneClip {
        let mut out = PlaneClip::default();
        if self.plane.is_equivalent(plane) {
            out.front.push(self.clone());
            return out;
        }
        if self.plane.is_equivalent(&plane.flipped()) {
            out.back.push(self.clone());
            return out;
        }
        match self.classify(plane) {
            FRONT => out.front.push(self.clone()),
            BACK => out.back.push(self.clone()),
            COPLANAR => {
                if self.plane.is_same_facing(plane) {
                    out.front.push(self.clone());
                } else {
                    out.back.push(self.clone());
                }
            },
            _ if self.is_open() => self.clip_open_by_plane(plane, &mut out),
            _ => self.clip_closed_by_plane(plane, &mut out),
        }
        out
    }

    fn clip_open_by_plane(&self, plane: &Plane, out: &mut PlaneClip) {
        let mut front = Polygon::empty(self.plane);
        let mut back = Polygon::empty(self.plane);
        for edge in self.edges() {
            let d0 = plane.distance(&edge.v[0]);
            let d1 = plane.distance(&edge.v[1]);
            if d0 >= -tolerance() && d1 >= -tolerance() {
                front.add_edge(&edge);
            } else if d0 <= tolerance() && d1 <= tolerance() {
                back.add_edge(&edge);
            } else {
                let t = d0 / (d0 - d1);
                let (cut, data) = edge.interpolate(t);
                let first = Edge3D::with_data(edge.v[0], cut, edge.data[0], data);
                let second = Edge3D::with_data(cut, edge.v[1], data, edge.data[1]);
                if d0 > 0.0 {
                    front.add_edge(&first);
                    back.add_edge(&second);
                } else {
                    back.add_edge(&first);
                    front.add_edge(&second);
                }
            }
        }
        for (mut piece, list) in [(front, &mut out.front), (back, &mut out.back)] {
            if piece.edge_count() > 0 {
                piece.tex_info = self.tex_info;
                piece.sub_mat_id = self.sub_mat_id;
                piece.flags = self.flags;
                piece.id = self.id;
                list.push(piece);
            }
        }
    }

    fn clip_closed_by_plane(&self, plane: &Plane, out: &mut PlaneClip) {
        let Some(line) = self.plane.intersection_line(plane) else {
            // parallel but not coincident; decided by the centroid
            if plane.distance(&self.average_position()) >= 0.0 {
                out.front.push(self.clone());
            } else {
                out.back.push(self.clone());
            }
            return;
        };

        let shape = self.to_geo(&self.plane);
        let half = half_plane(&shape, &line);
        let front_shape = shape.intersection(&half);
        let back_shape = shape.difference(&half);

        let targets = SnapTargets::new(self.plane).with_polygon(self).with_cut(&line);
        out.front = self.from_geo(&self.plane, &front_shape, &targets);
        out.back = self.from_geo(&self.plane, &back_shape, &targets);

        for piece in &out.front {
            for edge in piece.edges() {
                if plane.distance(&edge.v[0]).abs() < tolerance()
                    && plane.distance(&edge.v[1]).abs() < tolerance()
                    && !edge.is_degenerate()
                {
                    out.boundary_edges.push(edge);
                }
            }
        }
    }
}

impl Polygon {
    /// Cut a closed polygon along the parts of an open `chain` that run
    /// through its interior.
    ///
    /// Returns one polygon per resulting region; the first keeps this
    /// polygon's id. A chain that separates nothing yields a single copy.
    pub fn split_by_chain(&self, chain: &Polygon) -> Vec<Polygon> {
        if self.is_open() || !chain.is_open() || !self.plane.is_equivalent(&chain.plane) {
            return vec![self.clone()];
        }
        let inside = chain.clip_edges_by(self, ClipType::Positive, ClipObjective::Intersection0);
        let cuts: Vec<Edge3D> = inside.edges().collect();
        if cuts.is_empty() {
            return vec![self.clone()];
        }

        let stops: Vec<Point3<Real>> = cuts.iter().flat_map(|e| e.v).collect();
        let mut graph = EdgeGraph::new(self.plane);
        for edge in self.edges() {
            let mut params = vec![0.0, 1.0];
            params.extend(
                stops
                    .iter()
                    .filter(|p| {
                        edge.contains_point(p)
                            && !is_equivalent_point(p, &edge.v[0])
                            && !is_equivalent_point(p, &edge.v[1])
                    })
                    .map(|p| edge.param_of(p)),
            );
            params.sort_by(|a, b| a.total_cmp(b));
            for pair in params.windows(2) {
                graph.add_edge(&edge.interpolate(pair[0]).0, &edge.interpolate(pair[1]).0);
            }
        }
        for cut in &cuts {
            graph.add_undirected(&cut.v[0], &cut.v[1]);
        }

        let mut outers = Vec::new();
        let mut holes = Vec::new();
        for cycle in graph.cycles() {
            let ring = graph.cycle_points(&cycle);
            if graph.cycle_area(&cycle) > 0.0 {
                outers.push(ring);
            } else {
                holes.push(ring);
            }
        }
        if outers.len() <= 1 {
            return vec![self.clone()];
        }

        assemble_regions(&self.plane, outers, holes)
            .into_iter()
            .enumerate()
            .map(|(i, rings)| {
                let loops = rings
                    .into_iter()
                    .map(|ring| ring.into_iter().map(Vertex::new).collect())
                    .collect();
                let built = Polygon::from_loops(self.plane, loops);
                let mut piece = self.with_geometry(self.plane, built.vertices, built.edges);
                if i > 0 {
                    piece.new_id();
                }
                piece.reset_uvs();
                piece
            })
            .filter(Polygon::is_valid)
            .collect()
    }
}

/// The positive side of `line`, bounded to a box comfortably larger than `shape`.
fn half_plane(shape: &MultiPolygon<Real>, line: &Line2D) -> MultiPolygon<Real> {
    let mut min = Point2::new(Real::MAX, Real::MAX);
    let mut max = Point2::new(-Real::MAX, -Real::MAX);
    for polygon in shape.iter() {
        for c in polygon.exterior().coords() {
            min = min.inf(&Point2::new(c.x, c.y));
            max = max.sup(&Point2::new(c.x, c.y));
        }
    }
    if min.x > max.x {
        return MultiPolygon::new(Vec::new());
    }
    let margin = (max - min).norm() + 1.0;
    let corners = [
        Point2::new(min.x - margin, min.y - margin),
        Point2::new(max.x + margin, min.y - margin),
        Point2::new(max.x + margin, max.y + margin),
        Point2::new(min.x - margin, max.y + margin),
    ];

    // Sutherland-Hodgman against a single line keeps the box convex.
    let mut kept: Vec<Point2<Real>> = Vec::with_capacity(6);
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        let da = line.distance(&a);
        let db = line.distance(&b);
        if da >= 0.0 {
            kept.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            let t = da / (da - db);
            kept.push(a + (b - a) * t);
        }
    }
    if kept.len() < 3 {
        return MultiPolygon::new(Vec::new());
    }
    let ring = LineString::new(kept.iter().map(|p| Coord { x: p.x, y: p.y }).collect());
    MultiPolygon::new(vec![GeoPolygon::new(ring, Vec::new())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn square() -> Polygon {
        Polygon::from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn spanning_square_splits_in_two() {
        let cut = Plane::from_normal(Vector3::x(), 0.25);
        let clip = square().clip_by_plane(&cut);
        assert_eq!(clip.front.len(), 1);
        assert_eq!(clip.back.len(), 1);
        assert!((clip.front[0].area() - 0.75).abs() < 1e-6);
        assert!((clip.back[0].area() - 0.25).abs() < 1e-6);
        assert!(!clip.front[0].is_open() && !clip.back[0].is_open());
        let cut_len: Real = clip.boundary_edges.iter().map(|e| e.length()).sum();
        assert!((cut_len - 1.0).abs() < 1e-6, "cut length {cut_len}");
    }

    #[test]
    fn coincident_plane_goes_front() {
        let sq = square();
        let clip = sq.clip_by_plane(&sq.plane().clone());
        assert_eq!(clip.front.len(), 1);
        assert!(clip.back.is_empty());
        let clip = sq.clip_by_plane(&sq.plane().flipped());
        assert_eq!(clip.back.len(), 1);
    }

    #[test]
    fn chain_across_square_splits_it() {
        let chain = Polygon::open_chain(
            &[
                Point3::new(0.5, -1.0, 0.0),
                Point3::new(0.5, 0.5, 0.0),
                Point3::new(0.5, 2.0, 0.0),
            ],
            *square().plane(),
        );
        let pieces = square().split_by_chain(&chain);
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert!(!piece.is_open());
            assert!((piece.area() - 0.5).abs() < 1e-6, "area {}", piece.area());
        }
        assert_ne!(pieces[0].id(), pieces[1].id());
    }

    #[test]
    fn chain_ending_inside_does_not_split() {
        let sq = square();
        let chain = Polygon::open_chain(
            &[Point3::new(0.5, -1.0, 0.0), Point3::new(0.5, 0.5, 0.0)],
            *sq.plane(),
        );
        let pieces = sq.split_by_chain(&chain);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].id(), sq.id());
    }

    #[test]
    fn open_chain_is_cut_per_edge() {
        let chain = Polygon::open_chain(
            &[Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            Plane::default(),
        );
        let clip = chain.clip_by_plane(&Plane::from_normal(Vector3::x(), 0.0));
        assert_eq!(clip.front.len(), 1);
        assert_eq!(clip.back.len(), 1);
        assert!((clip.front[0].edge(0).length() - 1.0).abs() < 1e-9);
    }
}
