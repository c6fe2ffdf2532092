//! Coplanar 2D Booleans between polygons.
//!
//! Closed operands are combined as regions in the receiver's plane frame with
//! `geo`'s overlay. Open operands (chains) are clipped edge by edge through
//! the other polygon's [`BspTree2D`](crate::model::bsp::BspTree2D), routed by
//! the same table the 3D engine uses.

use super::Polygon;
use super::snap::SnapTargets;
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::model::bsp::{ClipObjective, ClipType};
use geo::BooleanOps;

/// Which coincident edges an open intersection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoEdgeMode {
    #[default]
    Exclude,
    IncludeCoSame,
    IncludeCoDiff,
}

impl Polygon {
    fn coplanar_with(&self, other: &Polygon) -> bool {
        self.plane.is_equivalent(&other.plane) || self.plane.is_equivalent(&other.plane.flipped())
    }

    fn expanded_boxes_overlap(&self, other: &Polygon) -> bool {
        self.expanded_bounding_box()
            .intersects(&other.expanded_bounding_box())
    }

    /// Replace our geometry with `pieces`, keeping metadata and id.
    fn take_pieces(&mut self, pieces: Vec<Polygon>) {
        let plane = self.plane;
        let merged = self.merge_pieces(&plane, pieces);
        self.assign_geometry(merged);
    }

    /// Keep the edges of this open chain that `other`'s edge tree routes to
    /// the kept buckets.
    pub(crate) fn clip_edges_by(&self, other: &Polygon, clip_type: ClipType, objective: ClipObjective) -> Polygon {
        let routing = objective.routing(clip_type);
        let mut kept = Polygon::empty(self.plane);
        let tree = other.bsp();
        for edge in self.edges() {
            let parts = tree.get_partitions(&edge);
            let buckets = [
                (routing.pos, &parts.pos),
                (routing.neg, &parts.neg),
                (routing.co_same, &parts.co_same),
                (routing.co_diff, &parts.co_diff),
            ];
            for (keep, list) in buckets {
                if keep {
                    for piece in list {
                        kept.add_edge(&if routing.flip { piece.inverted() } else { *piece });
                    }
                }
            }
        }
        self.with_geometry(kept.plane, kept.vertices, kept.edges)
    }

    fn replace_with_clipped_edges(&mut self, other: &Polygon, clip_type: ClipType, objective: ClipObjective) {
        let clipped = self.clip_edges_by(other, clip_type, objective);
        self.assign_geometry(clipped);
    }

    /// Region union. Two open chains are concatenated; an empty receiver
    /// takes `other`'s shape. Returns `false` when the operands cannot be
    /// combined (open with closed, or not coplanar).
    pub fn union(&mut self, other: &Polygon) -> bool {
        if self.edges.is_empty() {
            let plane = other.plane;
            let copy = self.with_geometry(plane, other.vertices.clone(), other.edges.clone());
            self.assign_geometry(copy);
            return true;
        }
        match (self.is_open(), other.is_open()) {
            (true, true) => {
                for edge in other.edges() {
                    self.add_edge(&edge);
                }
                return true;
            },
            (false, false) => {},
            _ => return false,
        }
        if !self.coplanar_with(other) {
            return false;
        }
        let shape = self.to_geo(&self.plane).union(&other.to_geo(&self.plane));
        let pieces = self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other));
        self.take_pieces(pieces);
        true
    }

    /// Region difference. An open receiver keeps the edges lying outside
    /// `other`.
    pub fn subtract(&mut self, other: &Polygon) -> bool {
        if other.is_open() || !self.coplanar_with(other) {
            return false;
        }
        if self.is_open() {
            self.replace_with_clipped_edges(other, ClipType::Negative, ClipObjective::Subtract);
            return true;
        }
        if other.include_all_edges(self) {
            self.take_pieces(Vec::new());
            return true;
        }
        if !self.expanded_boxes_overlap(other) {
            return true;
        }
        let shape = self.to_geo(&self.plane).difference(&other.to_geo(&self.plane));
        let pieces = self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other));
        self.take_pieces(pieces);
        true
    }

    /// Region intersection. For an open receiver, `mode` selects which
    /// coincident edges survive.
    pub fn intersect(&mut self, other: &Polygon, mode: CoEdgeMode) -> bool {
        if other.is_open() || !self.coplanar_with(other) {
            return false;
        }
        if self.is_open() {
            let objective = match mode {
                CoEdgeMode::Exclude => ClipObjective::Intersection0,
                CoEdgeMode::IncludeCoSame => ClipObjective::Intersection0IncludingCoSame,
                CoEdgeMode::IncludeCoDiff => ClipObjective::Intersection1IncludingCoDiff,
            };
            self.replace_with_clipped_edges(other, ClipType::Positive, objective);
            return true;
        }
        let shape = self.to_geo(&self.plane).intersection(&other.to_geo(&self.plane));
        let pieces = self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other));
        self.take_pieces(pieces);
        true
    }

    /// Symmetric difference of two closed regions.
    pub fn exclusive_or(&mut self, other: &Polygon) -> bool {
        if self.is_open() || other.is_open() || !self.coplanar_with(other) {
            return false;
        }
        let shape = self.to_geo(&self.plane).xor(&other.to_geo(&self.plane));
        let pieces = self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other));
        self.take_pieces(pieces);
        true
    }

    /// Remove the part inside `other`.
    pub fn clip_inside(&mut self, other: &Polygon) -> bool {
        if other.is_open() || !self.coplanar_with(other) {
            return false;
        }
        if self.is_open() {
            self.replace_with_clipped_edges(other, ClipType::Negative, ClipObjective::JustClip);
            return true;
        }
        self.subtract(other)
    }

    /// Keep only the part inside `other`.
    pub fn clip_outside(&mut self, other: &Polygon) -> bool {
        if other.is_open() || !self.coplanar_with(other) {
            return false;
        }
        if self.is_open() {
            self.replace_with_clipped_edges(other, ClipType::Positive, ClipObjective::JustClip);
            return true;
        }
        self.intersect(other, CoEdgeMode::Exclude)
    }

    /// Islands of `self ∩ other` on this polygon's plane, metadata from `self`.
    pub fn intersection_parts(&self, other: &Polygon) -> Vec<Polygon> {
        if self.is_open() || other.is_open() || !self.expanded_boxes_overlap(other) {
            return Vec::new();
        }
        let shape = self.to_geo(&self.plane).intersection(&other.to_geo(&self.plane));
        self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other))
    }

    /// Islands of `self \ other` on this polygon's plane, metadata from `self`.
    pub fn difference_parts(&self, other: &Polygon) -> Vec<Polygon> {
        if self.is_open() || other.is_open() || !self.expanded_boxes_overlap(other) {
            return self.islands();
        }
        let shape = self.to_geo(&self.plane).difference(&other.to_geo(&self.plane));
        self.from_geo(&self.plane, &shape, &SnapTargets::overlay(self.plane, self, other))
    }
}
