//! Polygon BSP over a closed polygon set.

use super::traits::{BalancedSplittingStrategy, SplittingPolygonStrategy};
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::float_types::{Real, tolerance};
use crate::model::plane::{BACK, COPLANAR, FRONT, Plane};
use crate::model::polygon::Polygon;
use nalgebra::Point3;
use tracing::trace;

/// Fragments of a polygon classified against a [`BspTree3D`].
#[derive(Debug, Clone, Default)]
pub struct OutputPolygons {
    /// Outside the solid.
    pub pos_list: Vec<Polygon>,
    /// Inside the solid.
    pub neg_list: Vec<Polygon>,
    /// On a face of the solid, facing the same way.
    pub co_same_list: Vec<Polygon>,
    /// On a face of the solid, facing the other way.
    pub co_diff_list: Vec<Polygon>,
}

impl OutputPolygons {
    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
            && self.neg_list.is_empty()
            && self.co_same_list.is_empty()
            && self.co_diff_list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pos_list.len() + self.neg_list.len() + self.co_same_list.len() + self.co_diff_list.len()
    }

    /// Every fragment, bucket order: pos, neg, co-same, co-diff.
    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.pos_list
            .iter()
            .chain(&self.neg_list)
            .chain(&self.co_same_list)
            .chain(&self.co_diff_list)
    }
}

/// A BSP tree node: splitting plane, the polygons lying on it (either
/// facing) and the two half-space subtrees.
#[derive(Debug, Clone)]
struct Node3D {
    plane: Plane,
    polygons: Vec<Polygon>,
    front: Option<Box<Node3D>>,
    back: Option<Box<Node3D>>,
}

/// Binary space partition of a closed polygon set. The tree owns copies of
/// the fragments it was built from, so it stays usable while the source
/// list changes but does not follow those changes.
#[derive(Debug, Clone, Default)]
pub struct BspTree3D {
    root: Option<Box<Node3D>>,
}

impl BspTree3D {
    /// Build with [`BalancedSplittingStrategy`].
    pub fn build(polygons: &[Polygon]) -> Self {
        Self::build_with(polygons, &BalancedSplittingStrategy::default())
    }

    /// Build from the closed, non-degenerate members of `polygons`.
    /// An empty selection yields an invalid tree.
    pub fn build_with(polygons: &[Polygon], strategy: &dyn SplittingPolygonStrategy) -> Self {
        let input: Vec<Polygon> = polygons
            .iter()
            .filter(|p| !p.is_open() && p.is_valid())
            .cloned()
            .collect();
        let input_count = input.len();
        let tree = BspTree3D {
            root: Self::build_node(input, strategy),
        };
        trace!(
            input = input_count,
            nodes = tree.node_count(),
            fragments = tree.polygon_count(),
            "built 3D BSP tree"
        );
        tree
    }

    fn build_node(polygons: Vec<Polygon>, strategy: &dyn SplittingPolygonStrategy) -> Option<Box<Node3D>> {
        if polygons.is_empty() {
            return None;
        }
        let splitter = strategy.choose_splitting_polygon(&polygons).min(polygons.len() - 1);
        let plane = *polygons[splitter].plane();

        let mut node = Node3D {
            plane,
            polygons: Vec::new(),
            front: None,
            back: None,
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        for (i, polygon) in polygons.into_iter().enumerate() {
            if i == splitter {
                node.polygons.push(polygon);
                continue;
            }
            match polygon.classify(&plane) {
                COPLANAR => node.polygons.push(polygon),
                FRONT => front.push(polygon),
                BACK => back.push(polygon),
                _ => {
                    let clip = polygon.clip_by_plane(&plane);
                    front.extend(clip.front.into_iter().filter(Polygon::is_valid));
                    back.extend(clip.back.into_iter().filter(Polygon::is_valid));
                },
            }
        }
        node.front = Self::build_node(front, strategy);
        node.back = Self::build_node(back, strategy);
        Some(Box::new(node))
    }

    pub fn is_valid_tree(&self) -> bool {
        self.root.is_some()
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Node3D> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
        }
        count
    }

    /// Number of polygon fragments stored on splitting planes.
    pub fn polygon_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Node3D> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += node.polygons.len();
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
        }
        count
    }

    /// Classify every fragment of `polygon`. An invalid tree returns nothing.
    pub fn get_partitions(&self, polygon: &Polygon) -> OutputPolygons {
        let mut out = OutputPolygons::default();
        if let Some(root) = &self.root {
            self.partition(root, polygon.clone(), &mut out);
        }
        out
    }

    fn partition(&self, node: &Node3D, polygon: Polygon, out: &mut OutputPolygons) {
        match polygon.classify(&node.plane) {
            FRONT => self.send_front(node, polygon, out),
            BACK => self.send_back(node, polygon, out),
            COPLANAR => self.partition_coplanar(node, polygon, out),
            _ => {
                let clip = polygon.clip_by_plane(&node.plane);
                for piece in clip.front {
                    self.send_front(node, piece, out);
                }
                for piece in clip.back {
                    self.send_back(node, piece, out);
                }
            },
        }
    }

    /// Overlaps with the node's polygons become co-same/co-diff; what is
    /// left continues down the side the fragment faces.
    fn partition_coplanar(&self, node: &Node3D, polygon: Polygon, out: &mut OutputPolygons) {
        let same_facing = node.plane.is_same_facing(polygon.plane());
        let mut rest = vec![polygon];
        for on_plane in &node.polygons {
            let mut next = Vec::with_capacity(rest.len());
            for piece in rest {
                if !piece
                    .expanded_bounding_box()
                    .intersects(&on_plane.expanded_bounding_box())
                {
                    next.push(piece);
                    continue;
                }
                let overlap = piece.intersection_parts(on_plane);
                let overlap_area: Real = overlap.iter().map(Polygon::area).sum();
                if overlap_area <= tolerance() * tolerance() {
                    next.push(piece);
                    continue;
                }
                if on_plane.plane().is_same_facing(piece.plane()) {
                    out.co_same_list.extend(overlap);
                } else {
                    out.co_diff_list.extend(overlap);
                }
                next.extend(piece.difference_parts(on_plane));
            }
            rest = next;
        }
        for piece in rest {
            if same_facing {
                self.send_front(node, piece, out);
            } else {
                self.send_back(node, piece, out);
            }
        }
    }

    fn send_front(&self, node: &Node3D, polygon: Polygon, out: &mut OutputPolygons) {
        if !polygon.is_valid() {
            return;
        }
        match &node.front {
            Some(front) => self.partition(front, polygon, out),
            None => out.pos_list.push(polygon),
        }
    }

    fn send_back(&self, node: &Node3D, polygon: Polygon, out: &mut OutputPolygons) {
        if !polygon.is_valid() {
            return;
        }
        match &node.back {
            Some(back) => self.partition(back, polygon, out),
            None => out.neg_list.push(polygon),
        }
    }

    /// Point-in-solid test. Points on a splitting plane are inside when
    /// either side says so. An invalid tree contains nothing.
    pub fn is_inside(&self, point: &Point3<Real>) -> bool {
        self.root
            .as_deref()
            .is_some_and(|root| Self::point_inside(root, point))
    }

    fn point_inside(node: &Node3D, point: &Point3<Real>) -> bool {
        let d = node.plane.distance(point);
        let front = || {
            node.front
                .as_deref()
                .is_some_and(|f| Self::point_inside(f, point))
        };
        let back = || {
            node.back
                .as_deref()
                .is_none_or(|b| Self::point_inside(b, point))
        };
        if d > tolerance() {
            front()
        } else if d < -tolerance() {
            back()
        } else {
            front() || back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bsp::FirstPolygonStrategy;
    use nalgebra::Vector3;

    fn cube(min: Real, max: Real) -> Vec<Polygon> {
        let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
        let (a, b) = (min, max);
        vec![
            Polygon::from_points(&[p(a, a, a), p(a, b, a), p(b, b, a), p(b, a, a)]),
            Polygon::from_points(&[p(a, a, b), p(b, a, b), p(b, b, b), p(a, b, b)]),
            Polygon::from_points(&[p(a, a, a), p(b, a, a), p(b, a, b), p(a, a, b)]),
            Polygon::from_points(&[p(a, b, a), p(a, b, b), p(b, b, b), p(b, b, a)]),
            Polygon::from_points(&[p(a, a, a), p(a, a, b), p(a, b, b), p(a, b, a)]),
            Polygon::from_points(&[p(b, a, a), p(b, b, a), p(b, b, b), p(b, a, b)]),
        ]
    }

    #[test]
    fn empty_tree_is_invalid_and_inert() {
        let tree = BspTree3D::build(&[]);
        assert!(!tree.is_valid_tree());
        assert!(!tree.is_inside(&Point3::origin()));
        assert!(tree.get_partitions(&cube(0.0, 1.0)[0]).is_empty());
    }

    #[test]
    fn cube_contains_its_center() {
        for tree in [
            BspTree3D::build(&cube(0.0, 1.0)),
            BspTree3D::build_with(&cube(0.0, 1.0), &FirstPolygonStrategy),
        ] {
            assert!(tree.is_valid_tree());
            assert!(tree.is_inside(&Point3::new(0.5, 0.5, 0.5)));
            assert!(!tree.is_inside(&Point3::new(1.5, 0.5, 0.5)));
            assert!(!tree.is_inside(&Point3::new(0.5, -3.0, 0.5)));
        }
    }

    #[test]
    fn face_of_same_cube_is_co_same() {
        let faces = cube(0.0, 1.0);
        let tree = BspTree3D::build(&faces);
        let out = tree.get_partitions(&faces[5]);
        let area: Real = out.co_same_list.iter().map(Polygon::area).sum();
        assert!((area - 1.0).abs() < 1e-6, "co-same area {area}");
        assert!(out.pos_list.is_empty() && out.neg_list.is_empty());
    }

    #[test]
    fn crossing_quad_is_split_inside_and_outside() {
        let tree = BspTree3D::build(&cube(0.0, 1.0));
        let quad = Polygon::from_points(&[
            Point3::new(-1.0, 0.5, -1.0),
            Point3::new(2.0, 0.5, -1.0),
            Point3::new(2.0, 0.5, 2.0),
            Point3::new(-1.0, 0.5, 2.0),
        ]);
        assert!(quad.plane().normal.dot(&Vector3::y()).abs() > 0.99);
        let out = tree.get_partitions(&quad);
        let inside: Real = out.neg_list.iter().map(Polygon::area).sum();
        let outside: Real = out.pos_list.iter().map(Polygon::area).sum();
        assert!((inside - 1.0).abs() < 1e-6, "inside {inside}");
        assert!((outside - 8.0).abs() < 1e-6, "outside {outside}");
    }
}
