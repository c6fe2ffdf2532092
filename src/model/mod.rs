//! The brush model: two shelves of polygons and the editing operations on
//! them.
//!
//! Every operation works on the *current* shelf. The Base shelf holds the
//! committed solid, the Construction shelf holds geometry that is still being
//! built. Geometric failures never surface as errors; operations report a
//! `bool` or a status and leave the shelf consistent.

pub mod bsp;
pub mod edge;
pub mod plane;
pub mod polygon;
pub mod vertex;

mod archive;
mod boolean;
mod clip;
mod mirror;
mod query;
pub(crate) mod trace;

pub use clip::{ClipResult, ModelClip};
pub use query::{EdgeHit, FindOppositeFlag, OppositePolygon, SurroundType};

use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::model::bsp::IntersectionType;
use crate::model::plane::Plane;
use crate::model::polygon::{CoEdgeMode, Polygon, PolygonFlags, PolygonId};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Inward edge offset of the frame left behind by a leave-frame removal.
const FRAME_WIDTH: crate::float_types::Real = 0.1;

/// One of the two polygon layers of a [`Model`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShelfId {
    #[default]
    Base,
    Construction,
}

impl ShelfId {
    pub const ALL: [ShelfId; 2] = [ShelfId::Base, ShelfId::Construction];

    const fn index(self) -> usize {
        match self {
            ShelfId::Base => 0,
            ShelfId::Construction => 1,
        }
    }
}

/// Model-level flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelFlags(u32);

impl ModelFlags {
    pub const NONE: ModelFlags = ModelFlags(0);
    /// Keep a reflected copy of the solid across the mirror plane.
    pub const MIRROR: ModelFlags = ModelFlags(1 << 0);
    /// Removing a face with `leave_frame` keeps a thin border of it.
    pub const LEAVE_FRAME_AFTER_POLYGON_REMOVED: ModelFlags = ModelFlags(1 << 1);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        ModelFlags(bits)
    }

    pub const fn contains(self, other: ModelFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ModelFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ModelFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for ModelFlags {
    type Output = ModelFlags;
    fn bitor(self, rhs: ModelFlags) -> ModelFlags {
        ModelFlags(self.0 | rhs.0)
    }
}

/// A polygonal solid split over two shelves.
///
/// The model owns its polygons. Per-shelf bounding boxes are computed lazily
/// and dropped by every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "archive::ModelArchive", into = "archive::ModelArchive")]
pub struct Model {
    shelves: [Vec<Polygon>; 2],
    shelf: ShelfId,
    bounds: [OnceLock<Aabb>; 2],
    flags: ModelFlags,
    subdivision_level: u32,
    mirror_plane: Plane,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.shelves == other.shelves
            && self.flags == other.flags
            && self.subdivision_level == other.subdivision_level
            && self.mirror_plane == other.mirror_plane
    }
}

impl Model {
    pub fn new() -> Self {
        Model {
            shelves: [Vec::new(), Vec::new()],
            shelf: ShelfId::Base,
            bounds: [OnceLock::new(), OnceLock::new()],
            flags: ModelFlags::NONE,
            subdivision_level: 0,
            mirror_plane: Plane::default(),
        }
    }

    /// A Base-shelf model holding `polygons`, added as by [`add_polygon`](Self::add_polygon)
    /// without touching their texture coordinates.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Polygon>) -> Self {
        let mut model = Model::new();
        for polygon in polygons {
            model.add_polygon(polygon, false);
        }
        model
    }

    /// Empty model sharing this one's flags, subdivision level and mirror plane.
    pub(crate) fn empty_like(&self) -> Model {
        Model {
            flags: self.flags,
            subdivision_level: self.subdivision_level,
            mirror_plane: self.mirror_plane,
            ..Model::new()
        }
    }

    // ---------------------------------------------------------------------
    // shelves and settings
    // ---------------------------------------------------------------------

    pub const fn shelf(&self) -> ShelfId {
        self.shelf
    }

    pub fn set_shelf(&mut self, shelf: ShelfId) {
        self.shelf = shelf;
    }

    /// Run `f` with `shelf` selected, then restore the previous selection.
    pub fn with_shelf<R>(&mut self, shelf: ShelfId, f: impl FnOnce(&mut Model) -> R) -> R {
        let previous = self.shelf;
        self.shelf = shelf;
        let result = f(self);
        self.shelf = previous;
        result
    }

    pub const fn flags(&self) -> ModelFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ModelFlags) {
        self.flags = flags;
    }

    pub fn add_flags(&mut self, flags: ModelFlags) {
        self.flags.insert(flags);
    }

    pub fn remove_flags(&mut self, flags: ModelFlags) {
        self.flags.remove(flags);
    }

    pub const fn check_flags(&self, flags: ModelFlags) -> bool {
        self.flags.contains(flags)
    }

    pub const fn subdivision_level(&self) -> u32 {
        self.subdivision_level
    }

    pub fn set_subdivision_level(&mut self, level: u32) {
        self.subdivision_level = level;
    }

    pub const fn mirror_plane(&self) -> &Plane {
        &self.mirror_plane
    }

    pub fn set_mirror_plane(&mut self, plane: Plane) {
        self.mirror_plane = plane;
    }

    // ---------------------------------------------------------------------
    // polygon access
    // ---------------------------------------------------------------------

    /// Polygons of the current shelf.
    pub fn polygons(&self) -> &[Polygon] {
        &self.shelves[self.shelf.index()]
    }

    pub fn polygons_on(&self, shelf: ShelfId) -> &[Polygon] {
        &self.shelves[shelf.index()]
    }

    pub(crate) fn polygons_mut(&mut self) -> &mut Vec<Polygon> {
        let index = self.shelf.index();
        self.bounds[index] = OnceLock::new();
        &mut self.shelves[index]
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons().len()
    }

    pub fn polygon(&self, index: usize) -> Option<&Polygon> {
        self.polygons().get(index)
    }

    pub fn polygon_index(&self, id: PolygonId) -> Option<usize> {
        self.polygons().iter().position(|p| p.id() == id)
    }

    /// Snapshot of the current shelf, open chains only when asked for.
    pub fn polygon_list(&self, include_open: bool) -> Vec<Polygon> {
        self.polygons()
            .iter()
            .filter(|p| include_open || !p.is_open())
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------
    // adding
    // ---------------------------------------------------------------------

    /// Append `polygon` to the current shelf. Open chains go in as they are;
    /// closed polygons are split into islands. Parts equivalent to a stored
    /// polygon are skipped.
    pub fn add_polygon(&mut self, polygon: Polygon, reset_uvs: bool) -> bool {
        if !polygon.is_valid() {
            debug!(id = %polygon.id(), "rejecting invalid polygon");
            return false;
        }
        if polygon.is_open() {
            self.polygons_mut().push(polygon);
            return true;
        }
        self.add_islands(polygon, reset_uvs)
    }

    fn add_islands(&mut self, polygon: Polygon, reset_uvs: bool) -> bool {
        if !polygon.is_valid() {
            return false;
        }
        let mut added = false;
        for mut island in polygon.islands() {
            if !island.is_valid() {
                continue;
            }
            if self.polygons().iter().any(|p| p.is_equivalent(&island)) {
                debug!(id = %island.id(), "skipping polygon equivalent to a stored one");
                continue;
            }
            if self.polygons().iter().any(|p| p.id() == island.id()) {
                island.new_id();
            }
            if reset_uvs {
                island.reset_uvs();
            }
            self.polygons_mut().push(island);
            added = true;
        }
        added
    }

    /// Closed, same mirror state, boxes overlapping `polygon`, and on an
    /// equivalent plane when `same_plane` is set.
    fn candidates(&self, polygon: &Polygon, same_plane: bool) -> Vec<usize> {
        let mirrored = polygon.check_flags(PolygonFlags::MIRRORED);
        let aabb = polygon.expanded_bounding_box();
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                !p.is_open()
                    && p.check_flags(PolygonFlags::MIRRORED) == mirrored
                    && aabb.intersects(&p.expanded_bounding_box())
                    && (!same_plane || p.plane().is_equivalent(polygon.plane()))
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn take_indices(&mut self, mut indices: Vec<usize>) -> Vec<Polygon> {
        indices.sort_unstable();
        let shelf = self.polygons_mut();
        let mut taken: Vec<Polygon> = indices.into_iter().rev().map(|i| shelf.remove(i)).collect();
        taken.reverse();
        taken
    }

    /// Merge `polygon` with every stored polygon it overlaps or touches.
    pub fn add_union_polygon(&mut self, polygon: &Polygon) -> bool {
        if polygon.is_open() || !polygon.is_valid() {
            return false;
        }
        let mut merged = polygon.clone();
        let mut absorbed = Vec::new();
        for i in self.candidates(polygon, true) {
            let existing = &self.polygons()[i];
            if existing.has_intersection(polygon) == IntersectionType::None {
                continue;
            }
            if !merged.union(existing) {
                debug!(id = %polygon.id(), "union with a stored polygon failed");
                return false;
            }
            absorbed.push(i);
        }
        if !merged.is_valid() || merged.is_open() {
            return false;
        }
        self.take_indices(absorbed);
        merged.reset_uvs();
        self.add_islands(merged, false);
        true
    }

    /// Cut `polygon` out of the stored polygons it overlaps. When it
    /// overlaps nothing it is added instead.
    pub fn add_subtracted_polygon(&mut self, polygon: &Polygon) -> bool {
        if polygon.is_open() {
            return false;
        }
        let hits: Vec<usize> = self
            .candidates(polygon, true)
            .into_iter()
            .filter(|&i| self.polygons()[i].has_intersection(polygon) == IntersectionType::Cross)
            .collect();
        if hits.is_empty() {
            let mut copy = polygon.clone();
            copy.reset_uvs();
            self.add_islands(copy, false);
            return true;
        }
        for mut target in self.take_indices(hits) {
            target.subtract(polygon);
            if target.is_valid() {
                target.reset_uvs();
                self.add_islands(target, false);
            }
        }
        true
    }

    /// Clip the stored polygons under `polygon` to it. When nothing lies
    /// under it, `polygon` is added.
    pub fn add_intersected_polygon(&mut self, polygon: &Polygon) -> bool {
        if polygon.is_open() {
            return false;
        }
        let hits = self.candidates(polygon, true);
        if hits.is_empty() {
            return self.add_polygon(polygon.clone(), true);
        }
        for mut target in self.take_indices(hits) {
            if !target.intersect(polygon, CoEdgeMode::IncludeCoSame) {
                continue;
            }
            if target.is_valid() {
                target.reset_uvs();
                self.add_islands(target, false);
            }
        }
        true
    }

    /// Toggle the region of `polygon` on its plane: overlapped parts are
    /// removed, the rest is added facing the other way. With no overlap it
    /// is added as is, merged into touching neighbours when
    /// `union_adjacent` is set.
    pub fn add_xor_polygon(&mut self, polygon: &Polygon, union_adjacent: bool) -> bool {
        if polygon.is_open() {
            return false;
        }
        let mut overlapped = Vec::new();
        let mut touched = Vec::new();
        for i in self.candidates(polygon, true) {
            match self.polygons()[i].has_intersection(polygon) {
                IntersectionType::Cross => overlapped.push(i),
                IntersectionType::JustTouch => touched.push(i),
                IntersectionType::None => {},
            }
        }

        if overlapped.is_empty() {
            if union_adjacent && !touched.is_empty() {
                let mut merged = polygon.clone();
                for neighbour in self.take_indices(touched) {
                    merged.union(&neighbour);
                }
                merged.reset_uvs();
                self.add_islands(merged, false);
            } else {
                self.add_polygon(polygon.clone(), true);
            }
            return true;
        }

        let originals = self.take_indices(overlapped);
        let mut remainder = polygon.clone();
        for original in &originals {
            remainder.subtract(original);
        }
        for mut original in originals {
            if polygon.include_all_edges(&original) {
                continue;
            }
            original.subtract(polygon);
            original.reset_uvs();
            self.add_islands(original, false);
        }
        if remainder.is_valid() {
            remainder.flip();
            remainder.reset_uvs();
            self.add_islands(remainder, false);
        }
        true
    }

    /// Add `polygon` so that no stored coplanar polygon partially overlaps
    /// it: crossed polygons are cut along its boundary. An open chain cuts
    /// the polygons it crosses instead of being stored.
    pub fn add_split_polygon(&mut self, polygon: &Polygon) -> bool {
        if !polygon.is_valid() {
            return false;
        }
        if polygon.is_open() {
            return self.split_by_open_polygon(polygon);
        }

        let spanned: Vec<usize> = self
            .candidates(polygon, true)
            .into_iter()
            .filter(|&i| self.polygons()[i].has_intersection(polygon) == IntersectionType::Cross)
            .collect();
        if spanned.is_empty() {
            return self.add_polygon(polygon.clone(), true);
        }

        let spanned_polygons: Vec<Polygon> = spanned.iter().map(|&i| self.polygons()[i].clone()).collect();
        let mut entered = polygon.clone();
        for s in &spanned_polygons {
            if !entered.subtract(s) {
                break;
            }
        }
        let mut intersected = Vec::new();
        for s in &spanned_polygons {
            let mut piece = s.clone();
            if piece.intersect(polygon, CoEdgeMode::IncludeCoSame) {
                piece.new_id();
                intersected.push(piece);
            }
        }
        let mut subtracted = Vec::new();
        for s in &spanned_polygons {
            let mut rest = s.clone();
            if !rest.subtract(polygon) {
                return false;
            }
            subtracted.push(rest);
        }

        self.take_indices(spanned);
        for piece in subtracted.into_iter().chain(intersected) {
            let mut piece = piece;
            piece.reset_uvs();
            self.add_islands(piece, false);
        }
        if entered.is_valid() {
            entered.new_id();
            entered.reset_uvs();
            self.add_islands(entered, false);
        }
        true
    }

    fn split_by_open_polygon(&mut self, chain: &Polygon) -> bool {
        let spanned: Vec<usize> = self
            .polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                !p.is_open()
                    && p.plane().is_equivalent(chain.plane())
                    && p.has_intersection(chain) == IntersectionType::Cross
            })
            .map(|(i, _)| i)
            .collect();

        let mut cut = Vec::new();
        let mut pieces = Vec::new();
        for i in spanned {
            let parts = self.polygons()[i].split_by_chain(chain);
            if parts.len() > 1 {
                cut.push(i);
                pieces.extend(parts);
            }
        }
        if cut.is_empty() {
            self.polygons_mut().push(chain.clone());
            return true;
        }
        self.take_indices(cut);
        for piece in pieces {
            self.add_islands(piece, false);
        }
        true
    }

    // ---------------------------------------------------------------------
    // replacing and removing
    // ---------------------------------------------------------------------

    /// Overwrite the polygon at `index`.
    pub fn replace(&mut self, index: usize, polygon: Polygon) -> bool {
        match self.polygons_mut().get_mut(index) {
            Some(slot) => {
                *slot = polygon;
                true
            },
            None => false,
        }
    }

    /// Remove the polygon at `index`.
    ///
    /// With `leave_frame` and [`ModelFlags::LEAVE_FRAME_AFTER_POLYGON_REMOVED`]
    /// set, a polygon that is not fully surrounded by coplanar neighbours
    /// keeps a thin border: only its shrunk interior is cut away.
    pub fn remove_polygon(&mut self, index: usize, leave_frame: bool) -> bool {
        let Some(polygon) = self.polygon(index).cloned() else {
            return false;
        };
        if leave_frame && self.check_flags(ModelFlags::LEAVE_FRAME_AFTER_POLYGON_REMOVED) {
            match self.query_surround_type(&polygon) {
                SurroundType::SurroundedByOthers => {},
                _ => {
                    let mut interior = polygon.clone();
                    interior.remove_all_holes();
                    if interior.scale(FRAME_WIDTH) {
                        return self.add_subtracted_polygon(&interior);
                    }
                    warn!(id = %polygon.id(), "polygon too small to leave a frame, removing it");
                },
            }
        }
        self.polygons_mut().remove(index);
        true
    }

    pub fn remove_polygon_by_id(&mut self, id: PolygonId, leave_frame: bool) -> bool {
        match self.polygon_index(id) {
            Some(index) => self.remove_polygon(index, leave_frame),
            None => false,
        }
    }

    pub fn remove_polygons_with_flags(&mut self, flags: PolygonFlags) {
        self.remove_polygons_with_flags_and_plane(flags, None);
    }

    /// Remove polygons carrying all of `flags`, limited to those on an
    /// equivalent plane when `plane` is given.
    pub fn remove_polygons_with_flags_and_plane(&mut self, flags: PolygonFlags, plane: Option<&Plane>) {
        self.polygons_mut().retain(|p| {
            let on_plane = plane.is_none_or(|plane| plane.is_equivalent(p.plane()));
            !(on_plane && p.check_flags(flags))
        });
    }

    /// Empty the current shelf.
    pub fn clear(&mut self) {
        self.polygons_mut().clear();
    }

    /// Replace the current shelf with the union-merge of `polygons`.
    pub fn reset_all_polygons_from_list(&mut self, polygons: &[Polygon]) {
        self.clear();
        for polygon in polygons {
            if !self.add_union_polygon(polygon) {
                self.add_polygon(polygon.clone(), true);
            }
        }
    }

    pub fn set_sub_mat_id(&mut self, id: u16) {
        for polygon in self.polygons_mut() {
            polygon.set_sub_mat_id(id);
        }
    }

    /// Move every polygon of `from` to the end of `to`.
    pub fn move_polygons_between_shelves(&mut self, from: ShelfId, to: ShelfId) {
        if from == to {
            return;
        }
        let moved = std::mem::take(&mut self.shelves[from.index()]);
        self.shelves[to.index()].extend(moved);
        self.invalidate_aabb(None);
    }

    pub fn move_polygon_between_shelves(&mut self, id: PolygonId, from: ShelfId, to: ShelfId) -> bool {
        let Some(index) = self.shelves[from.index()].iter().position(|p| p.id() == id) else {
            return false;
        };
        let polygon = self.shelves[from.index()].remove(index);
        self.with_shelf(to, |model| model.add_polygon(polygon, false));
        self.invalidate_aabb(None);
        true
    }

    // ---------------------------------------------------------------------
    // bookkeeping
    // ---------------------------------------------------------------------

    /// Bounding box of one shelf, or of both when `shelf` is `None`.
    /// Empty shelves give an invalid box.
    pub fn bounding_box_of(&self, shelf: Option<ShelfId>) -> Aabb {
        let shelf_box = |s: ShelfId| {
            *self.bounds[s.index()].get_or_init(|| {
                self.shelves[s.index()]
                    .iter()
                    .fold(Aabb::new_invalid(), |acc, p| acc.merged(&p.bounding_box()))
            })
        };
        match shelf {
            Some(s) => shelf_box(s),
            None => shelf_box(ShelfId::Base).merged(&shelf_box(ShelfId::Construction)),
        }
    }

    pub fn invalidate_aabb(&mut self, shelf: Option<ShelfId>) {
        match shelf {
            Some(s) => self.bounds[s.index()] = OnceLock::new(),
            None => self.bounds = [OnceLock::new(), OnceLock::new()],
        }
    }

    /// No polygon on `shelf`, or on either shelf when `None`.
    pub fn is_empty(&self, shelf: Option<ShelfId>) -> bool {
        match shelf {
            Some(s) => self.shelves[s.index()].is_empty(),
            None => self.shelves.iter().all(Vec::is_empty),
        }
    }

    pub fn has_closed_polygon(&self, shelf: Option<ShelfId>) -> bool {
        ShelfId::ALL
            .into_iter()
            .filter(|s| shelf.is_none_or(|wanted| wanted == *s))
            .any(|s| self.shelves[s.index()].iter().any(|p| !p.is_open()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::Real;
    use nalgebra::Point3;

    fn rect(x0: Real, y0: Real, x1: Real, y1: Real) -> Polygon {
        Polygon::from_points(&[
            Point3::new(x0, y0, 0.0),
            Point3::new(x1, y0, 0.0),
            Point3::new(x1, y1, 0.0),
            Point3::new(x0, y1, 0.0),
        ])
    }

    fn total_area(model: &Model) -> Real {
        model.polygons().iter().map(Polygon::area).sum()
    }

    #[test]
    fn add_polygon_skips_duplicates_and_invalid() {
        let mut model = Model::new();
        assert!(model.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true));
        assert!(!model.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true));
        assert!(!model.add_polygon(Polygon::empty(Plane::default()), true));
        assert_eq!(model.polygon_count(), 1);
    }

    #[test]
    fn union_polygon_merges_touching_neighbours() {
        let mut model = Model::new();
        model.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true);
        assert!(model.add_union_polygon(&rect(1.0, 0.0, 2.0, 1.0)));
        assert_eq!(model.polygon_count(), 1);
        assert!((total_area(&model) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn subtracted_polygon_cuts_a_hole() {
        let mut model = Model::new();
        model.add_polygon(rect(0.0, 0.0, 4.0, 4.0), true);
        assert!(model.add_subtracted_polygon(&rect(1.0, 1.0, 2.0, 2.0)));
        assert_eq!(model.polygon_count(), 1);
        assert!(model.polygons()[0].has_holes());
        assert!((total_area(&model) - 15.0).abs() < 1e-6);
    }

    #[test]
    fn split_polygon_keeps_coverage() {
        let mut model = Model::new();
        model.add_polygon(rect(0.0, 0.0, 2.0, 2.0), true);
        assert!(model.add_split_polygon(&rect(1.0, 1.0, 3.0, 3.0)));
        assert_eq!(model.polygon_count(), 3);
        assert!((total_area(&model) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn open_chain_splits_crossed_polygon() {
        let mut model = Model::new();
        let square = rect(0.0, 0.0, 2.0, 2.0);
        let plane = *square.plane();
        model.add_polygon(square, true);
        let chain = Polygon::open_chain(&[Point3::new(1.0, -1.0, 0.0), Point3::new(1.0, 3.0, 0.0)], plane);
        assert!(model.add_split_polygon(&chain));
        assert_eq!(model.polygon_count(), 2);
        assert!(model.polygons().iter().all(|p| !p.is_open()));
        assert!((total_area(&model) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn leave_frame_keeps_a_border() {
        let mut model = Model::new();
        model.add_flags(ModelFlags::LEAVE_FRAME_AFTER_POLYGON_REMOVED);
        model.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true);
        assert!(model.remove_polygon(0, true));
        assert_eq!(model.polygon_count(), 1);
        assert!((total_area(&model) - (1.0 - 0.64)).abs() < 1e-6);

        let mut plain = Model::new();
        plain.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true);
        assert!(plain.remove_polygon(0, true));
        assert!(plain.is_empty(Some(ShelfId::Base)));
    }

    #[test]
    fn shelves_are_independent() {
        let mut model = Model::new();
        model.add_polygon(rect(0.0, 0.0, 1.0, 1.0), true);
        model.with_shelf(ShelfId::Construction, |m| {
            m.add_polygon(rect(5.0, 5.0, 6.0, 6.0), true);
        });
        assert_eq!(model.shelf(), ShelfId::Base);
        assert_eq!(model.polygon_count(), 1);
        assert_eq!(model.polygons_on(ShelfId::Construction).len(), 1);
        let all = model.bounding_box_of(None);
        assert!((all.maxs.x - 6.0).abs() < 1e-9);
        model.move_polygons_between_shelves(ShelfId::Construction, ShelfId::Base);
        assert_eq!(model.polygon_count(), 2);
        assert!(model.is_empty(Some(ShelfId::Construction)));
    }
}
