//! Edge BSP of a single polygon, built in the polygon's plane frame.

use super::{IntersectionType, PointPos};
use crate::float_types::{Real, tolerance};
use crate::model::edge::{
    Edge3D, EdgeOverlap, EdgeRemainder, EdgeSplit, intersect_edge_3d, split, subtract_edge_3d,
};
use crate::model::plane::{Line2D, Plane};
use nalgebra::{Point2, Point3};

/// Fragments of an edge classified against a [`BspTree2D`].
#[derive(Debug, Clone, Default)]
pub struct EdgePartitions {
    /// Outside the region.
    pub pos: Vec<Edge3D>,
    /// Inside the region.
    pub neg: Vec<Edge3D>,
    /// On the boundary, running along it.
    pub co_same: Vec<Edge3D>,
    /// On the boundary, running against it.
    pub co_diff: Vec<Edge3D>,
}

#[derive(Debug, Clone)]
struct Node2D {
    line: Line2D,
    /// Edges lying on `line`
    edges: Vec<Edge3D>,
    front: Option<Box<Node2D>>,
    back: Option<Box<Node2D>>,
}

/// Binary partition of a polygon's directed edges. The left of every edge
/// (back of its line) is inside.
#[derive(Debug, Clone)]
pub struct BspTree2D {
    plane: Plane,
    root: Option<Box<Node2D>>,
}

impl BspTree2D {
    pub fn build(plane: &Plane, edges: &[Edge3D]) -> Self {
        let edges = edges.iter().filter(|e| !e.is_degenerate()).copied().collect();
        BspTree2D {
            plane: *plane,
            root: Self::build_node(plane, edges),
        }
    }

    fn build_node(plane: &Plane, mut edges: Vec<Edge3D>) -> Option<Box<Node2D>> {
        let line = loop {
            let splitter = edges.first()?;
            match Line2D::from_points(&plane.w2p(&splitter.v[0]), &plane.w2p(&splitter.v[1])) {
                Some(line) => break line,
                None => {
                    edges.remove(0);
                },
            }
        };

        let mut node = Node2D {
            line,
            edges: Vec::new(),
            front: None,
            back: None,
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        for edge in edges {
            match split(plane, &line, &node.edges, &edge) {
                EdgeSplit::Coincidence => node.edges.push(edge),
                EdgeSplit::Positive => front.push(edge),
                EdgeSplit::Negative => back.push(edge),
                EdgeSplit::Cross(pos, neg) => {
                    front.push(pos);
                    back.push(neg);
                },
            }
        }
        front.retain(|e| !e.is_degenerate());
        back.retain(|e| !e.is_degenerate());
        node.front = Self::build_node(plane, front);
        node.back = Self::build_node(plane, back);
        Some(Box::new(node))
    }

    pub fn is_valid(&self) -> bool {
        self.root.is_some()
    }

    /// Classify a point of the polygon's plane.
    pub fn is_vertex_in(&self, point: &Point3<Real>) -> PointPos {
        let Some(root) = &self.root else {
            return PointPos::Outside;
        };
        let on_plane = self.plane.project(point);
        Self::vertex_in(root, &self.plane.w2p(&on_plane), &on_plane)
    }

    fn vertex_in(node: &Node2D, q: &Point2<Real>, p: &Point3<Real>) -> PointPos {
        let d = node.line.distance(q);
        let front = || match &node.front {
            Some(f) => Self::vertex_in(f, q, p),
            None => PointPos::Outside,
        };
        let back = || match &node.back {
            Some(b) => Self::vertex_in(b, q, p),
            None => PointPos::Inside,
        };
        if d > tolerance() {
            front()
        } else if d < -tolerance() {
            back()
        } else if node.edges.iter().any(|e| e.contains_point(p)) {
            PointPos::Border
        } else {
            let f = front();
            if f == back() { f } else { PointPos::Border }
        }
    }

    /// Split `edge` into outside, inside and on-boundary fragments.
    pub fn get_partitions(&self, edge: &Edge3D) -> EdgePartitions {
        let mut out = EdgePartitions::default();
        match &self.root {
            Some(root) => self.partition(root, *edge, &mut out),
            None => out.pos.push(*edge),
        }
        out
    }

    fn partition(&self, node: &Node2D, edge: Edge3D, out: &mut EdgePartitions) {
        match split(&self.plane, &node.line, &node.edges, &edge) {
            EdgeSplit::Positive => self.send_front(node, edge, out),
            EdgeSplit::Negative => self.send_back(node, edge, out),
            EdgeSplit::Cross(pos, neg) => {
                self.send_front(node, pos, out);
                self.send_back(node, neg, out);
            },
            EdgeSplit::Coincidence => {
                let mut rest = vec![edge];
                for on_line in &node.edges {
                    let mut next = Vec::with_capacity(rest.len());
                    for piece in rest {
                        let EdgeOverlap::One(overlap) = intersect_edge_3d(&piece, on_line) else {
                            next.push(piece);
                            continue;
                        };
                        if overlap.direction().dot(&on_line.direction()) > 0.0 {
                            out.co_same.push(overlap);
                        } else {
                            out.co_diff.push(overlap);
                        }
                        match subtract_edge_3d(&piece, on_line) {
                            EdgeRemainder::One(a) => next.push(a),
                            EdgeRemainder::Two(a, b) => {
                                next.push(a);
                                next.push(b);
                            },
                            EdgeRemainder::Zero | EdgeRemainder::Invalid => {},
                        }
                    }
                    rest = next;
                }
                let along = node.line.direction();
                for piece in rest {
                    let d = self.plane.w2p(&piece.v[1]) - self.plane.w2p(&piece.v[0]);
                    if d.dot(&along) >= 0.0 {
                        self.send_front(node, piece, out);
                    } else {
                        self.send_back(node, piece, out);
                    }
                }
            },
        }
    }

    fn send_front(&self, node: &Node2D, edge: Edge3D, out: &mut EdgePartitions) {
        if edge.is_degenerate() {
            return;
        }
        match &node.front {
            Some(front) => self.partition(front, edge, out),
            None => out.pos.push(edge),
        }
    }

    fn send_back(&self, node: &Node2D, edge: Edge3D, out: &mut EdgePartitions) {
        if edge.is_degenerate() {
            return;
        }
        match &node.back {
            Some(back) => self.partition(back, edge, out),
            None => out.neg.push(edge),
        }
    }

    /// `Cross` when part of `edge` runs through the interior, `JustTouch`
    /// when it only runs along the boundary.
    pub fn has_intersection(&self, edge: &Edge3D) -> IntersectionType {
        let parts = self.get_partitions(edge);
        if parts.neg.iter().any(|e| !e.is_degenerate()) {
            IntersectionType::Cross
        } else if !parts.co_same.is_empty() || !parts.co_diff.is_empty() {
            IntersectionType::JustTouch
        } else {
            IntersectionType::None
        }
    }

    /// No part of `edge` lies outside the region.
    pub fn is_inside(&self, edge: &Edge3D) -> bool {
        let outside: Real = self.get_partitions(edge).pos.iter().map(|e| e.length()).sum();
        outside <= tolerance()
    }
}
