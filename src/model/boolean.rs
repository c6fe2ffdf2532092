//! Solid Booleans between models.
//!
//! Each operand is snapshotted as its closed, non-mirrored polygons plus a
//! [`BspTree3D`] over them. Every polygon of one operand is partitioned by the
//! other operand's tree and the [`ClipObjective`] routing decides which
//! fragments survive.

use super::{Model, ModelFlags};
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::Real;
use crate::model::bsp::{BspTree3D, ClipObjective, ClipType};
use crate::model::polygon::{Polygon, PolygonFlags};
use crate::traits::CSGOps;
use hashbrown::HashSet;
use nalgebra::{Matrix4, Point3};
use tracing::debug;

/// Snapshot of one Boolean operand.
struct BooleanStruct {
    polygons: Vec<Polygon>,
    tree: BspTree3D,
}

impl BooleanStruct {
    fn of(model: &Model) -> Self {
        let polygons: Vec<Polygon> = model
            .polygons()
            .iter()
            .filter(|p| !p.is_open() && p.is_valid() && !p.check_flags(PolygonFlags::MIRRORED))
            .cloned()
            .collect();
        let tree = BspTree3D::build(&polygons);
        BooleanStruct { polygons, tree }
    }

    fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Partition `polygons` by this operand's tree and append the fragments
    /// `objective` keeps for `clip_type`. Open and degenerate fragments are
    /// dropped.
    fn clip(&self, polygons: &[Polygon], clip_type: ClipType, objective: ClipObjective, out: &mut Vec<Polygon>) {
        if !self.tree.is_valid_tree() {
            debug!(?objective, "clip skipped, operand tree is invalid");
            return;
        }
        let routing = objective.routing(clip_type);
        for polygon in polygons {
            let parts = self.tree.get_partitions(polygon);
            let buckets = [
                (routing.pos, parts.pos_list),
                (routing.neg, parts.neg_list),
                (routing.co_same, parts.co_same_list),
                (routing.co_diff, parts.co_diff_list),
            ];
            for (keep, list) in buckets {
                if !keep {
                    continue;
                }
                for mut piece in list {
                    if piece.is_open() || !piece.is_valid() {
                        debug!(id = %piece.id(), "dropping open or degenerate fragment");
                        continue;
                    }
                    if routing.flip {
                        piece.flip();
                    }
                    out.push(piece);
                }
            }
        }
    }
}

impl Model {
    /// Replace the current shelf with a Boolean result. Fragments of one
    /// source polygon share its id, so repeats get fresh ids.
    fn set_boolean_result(&mut self, mut polygons: Vec<Polygon>) {
        let mut seen = HashSet::with_capacity(polygons.len());
        for polygon in &mut polygons {
            if !seen.insert(polygon.id()) {
                polygon.new_id();
                seen.insert(polygon.id());
            }
        }
        debug!(polygons = polygons.len(), "boolean result");
        *self.polygons_mut() = polygons;
        if self.check_flags(ModelFlags::MIRROR) {
            self.update_mirrored_part();
        }
    }

    /// The part of `polygon` lying inside this model's solid.
    pub fn get_intersected_parts(&self, polygon: &Polygon) -> Vec<Polygon> {
        let operand = BooleanStruct::of(self);
        if !operand.tree.is_valid_tree() {
            return Vec::new();
        }
        operand.tree.get_partitions(polygon).neg_list
    }
}

impl CSGOps for Model {
    fn new() -> Self {
        Model::new()
    }

    fn union(&mut self, other: &Model) {
        let b = BooleanStruct::of(other);
        if b.is_empty() {
            return;
        }
        let a = BooleanStruct::of(self);
        if a.is_empty() {
            self.set_boolean_result(b.polygons);
            return;
        }
        let mut out = Vec::new();
        b.clip(&a.polygons, ClipType::Negative, ClipObjective::Union0, &mut out);
        a.clip(&b.polygons, ClipType::Negative, ClipObjective::Union1, &mut out);
        self.set_boolean_result(out);
    }

    fn subtract(&mut self, other: &Model) {
        let b = BooleanStruct::of(other);
        let a = BooleanStruct::of(self);
        if a.is_empty() || b.is_empty() {
            return;
        }
        let mut out = Vec::new();
        b.clip(&a.polygons, ClipType::Negative, ClipObjective::Subtract, &mut out);
        a.clip(&b.polygons, ClipType::Positive, ClipObjective::Subtract, &mut out);
        self.set_boolean_result(out);
    }

    fn intersect(&mut self, other: &Model) {
        let b = BooleanStruct::of(other);
        let a = BooleanStruct::of(self);
        if a.is_empty() || b.is_empty() {
            return;
        }
        let mut out = Vec::new();
        b.clip(
            &a.polygons,
            ClipType::Positive,
            ClipObjective::Intersection0IncludingCoSame,
            &mut out,
        );
        a.clip(
            &b.polygons,
            ClipType::Positive,
            ClipObjective::Intersection1IncludingCoDiff,
            &mut out,
        );
        self.set_boolean_result(out);
    }

    fn clip_inside(&mut self, other: &Model) {
        let b = BooleanStruct::of(other);
        let a = BooleanStruct::of(self);
        if a.is_empty() || b.is_empty() {
            return;
        }
        let mut out = Vec::new();
        b.clip(&a.polygons, ClipType::Negative, ClipObjective::JustClip, &mut out);
        self.set_boolean_result(out);
    }

    fn clip_outside(&mut self, other: &Model) {
        let b = BooleanStruct::of(other);
        let a = BooleanStruct::of(self);
        if a.is_empty() || b.is_empty() {
            return;
        }
        let mut out = Vec::new();
        b.clip(&a.polygons, ClipType::Positive, ClipObjective::JustClip, &mut out);
        self.set_boolean_result(out);
    }

    fn is_inside(&self, point: &Point3<Real>) -> bool {
        BooleanStruct::of(self).tree.is_inside(point)
    }

    fn transform(&mut self, matrix: &Matrix4<Real>) {
        for polygon in self.polygons_mut() {
            polygon.transform(matrix);
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bounding_box_of(Some(self.shelf()))
    }

    fn invalidate_bounding_box(&mut self) {
        self.invalidate_aabb(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(min: Real, max: Real) -> Model {
        let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
        let (a, b) = (min, max);
        Model::from_polygons([
            Polygon::from_points(&[p(a, a, a), p(a, b, a), p(b, b, a), p(b, a, a)]),
            Polygon::from_points(&[p(a, a, b), p(b, a, b), p(b, b, b), p(a, b, b)]),
            Polygon::from_points(&[p(a, a, a), p(b, a, a), p(b, a, b), p(a, a, b)]),
            Polygon::from_points(&[p(a, b, a), p(a, b, b), p(b, b, b), p(b, b, a)]),
            Polygon::from_points(&[p(a, a, a), p(a, a, b), p(a, b, b), p(a, b, a)]),
            Polygon::from_points(&[p(b, a, a), p(b, b, a), p(b, b, b), p(b, a, b)]),
        ])
    }

    #[test]
    fn empty_operands_are_identities() {
        let mut a = cube(0.0, 1.0);
        let before = a.clone();
        a.union(&Model::new());
        assert_eq!(a, before);
        a.subtract(&Model::new());
        assert_eq!(a, before);

        let mut empty = Model::new();
        empty.union(&before);
        assert_eq!(empty.polygon_count(), 6);
        let mut empty = Model::new();
        empty.intersect(&before);
        assert!(empty.is_empty(None));
    }

    #[test]
    fn result_ids_are_unique() {
        let mut a = cube(0.0, 1.0);
        a.subtract(&cube(0.5, 1.5));
        let ids: HashSet<_> = a.polygons().iter().map(Polygon::id).collect();
        assert_eq!(ids.len(), a.polygon_count());
    }

    #[test]
    fn intersected_parts_lie_inside() {
        let a = cube(0.0, 1.0);
        let quad = Polygon::from_points(&[
            Point3::new(-1.0, -1.0, 0.5),
            Point3::new(2.0, -1.0, 0.5),
            Point3::new(2.0, 2.0, 0.5),
            Point3::new(-1.0, 2.0, 0.5),
        ]);
        let inside: Real = a.get_intersected_parts(&quad).iter().map(Polygon::area).sum();
        assert!((inside - 1.0).abs() < 1e-6, "inside area {inside}");
    }
}
