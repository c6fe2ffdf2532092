//! Planar contours with holes, open chains and multiple islands.
//!
//! A [`Polygon`] stores a vertex list and directed edges between vertex
//! indices. A closed polygon's edges form one or more loops: loops winding
//! counter-clockwise around the plane normal are outer boundaries, clockwise
//! loops are holes. An open polygon is a dangling chain used while building or
//! splitting geometry.

mod boolean;
mod clip;
mod loops;
mod query;
mod snap;

pub use boolean::CoEdgeMode;
pub use clip::PlaneClip;

use crate::errors::ValidationError;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::{BOUND_BOX_OFFSET, Real, tolerance};
use crate::model::bsp::BspTree2D;
use crate::model::edge::Edge3D;
use crate::model::plane::Plane;
use crate::model::vertex::{TexInfo, Vertex, is_equivalent_point};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::OnceLock;
use uuid::Uuid;

/// Per-polygon flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolygonFlags(u32);

impl PolygonFlags {
    pub const NONE: PolygonFlags = PolygonFlags(0);
    /// Generated reflection of another polygon across the model's mirror plane.
    pub const MIRRORED: PolygonFlags = PolygonFlags(1 << 1);
    pub const HIDDEN: PolygonFlags = PolygonFlags(1 << 4);
    pub const NONPLANAR_QUAD: PolygonFlags = PolygonFlags(1 << 5);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        PolygonFlags(bits)
    }

    pub const fn contains(self, other: PolygonFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: PolygonFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: PolygonFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PolygonFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for PolygonFlags {
    type Output = PolygonFlags;
    fn bitor(self, rhs: PolygonFlags) -> PolygonFlags {
        PolygonFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for PolygonFlags {
    fn bitor_assign(&mut self, rhs: PolygonFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PolygonFlags {
    type Output = PolygonFlags;
    fn bitand(self, rhs: PolygonFlags) -> PolygonFlags {
        PolygonFlags(self.0 & rhs.0)
    }
}

/// Stable identity of a polygon, kept across clones and shape edits.
///
/// Serialized as a 32 digit hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(Uuid);

impl PolygonId {
    /// A fresh random (v4) id.
    pub fn new() -> Self {
        PolygonId(Uuid::new_v4())
    }

    pub const fn from_u128(value: u128) -> Self {
        PolygonId(Uuid::from_u128(value))
    }

    pub const fn as_u128(self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for PolygonId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for PolygonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PolygonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Uuid::parse_str(&text)
            .map(PolygonId)
            .map_err(serde::de::Error::custom)
    }
}

/// A planar contour: vertices, directed edges and metadata.
///
/// Deserialization goes through [`validate`](Polygon::validate), so a loaded
/// polygon never indexes past its vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord", into = "PolygonRecord")]
pub struct Polygon {
    plane: Plane,
    vertices: Vec<Vertex>,
    edges: Vec<[usize; 2]>,
    tex_info: TexInfo,
    sub_mat_id: u16,
    flags: PolygonFlags,
    id: PolygonId,

    /// Lazily-built 2D BSP over the polygon's own edges
    bsp: OnceLock<BspTree2D>,
    /// Lazily-calculated AABB that spans `vertices`.
    bounding_box: OnceLock<Aabb>,
}

/// Stored form of a [`Polygon`], before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PolygonRecord {
    plane: Plane,
    vertices: Vec<Vertex>,
    edges: Vec<[usize; 2]>,
    #[serde(default)]
    tex_info: TexInfo,
    #[serde(default)]
    sub_mat_id: u16,
    #[serde(default)]
    flags: PolygonFlags,
    id: PolygonId,
}

impl From<Polygon> for PolygonRecord {
    fn from(polygon: Polygon) -> Self {
        PolygonRecord {
            plane: polygon.plane,
            vertices: polygon.vertices,
            edges: polygon.edges,
            tex_info: polygon.tex_info,
            sub_mat_id: polygon.sub_mat_id,
            flags: polygon.flags,
            id: polygon.id,
        }
    }
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = ValidationError;

    fn try_from(record: PolygonRecord) -> Result<Self, Self::Error> {
        let polygon = Polygon {
            plane: record.plane,
            vertices: record.vertices,
            edges: record.edges,
            tex_info: record.tex_info,
            sub_mat_id: record.sub_mat_id,
            flags: record.flags,
            id: record.id,
            bsp: OnceLock::new(),
            bounding_box: OnceLock::new(),
        };
        polygon.validate()?;
        Ok(polygon)
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.plane == other.plane
            && self.vertices == other.vertices
            && self.edges == other.edges
            && self.tex_info == other.tex_info
            && self.sub_mat_id == other.sub_mat_id
            && self.flags == other.flags
            && self.id == other.id
    }
}

impl Polygon {
    fn from_parts(plane: Plane, vertices: Vec<Vertex>, edges: Vec<[usize; 2]>) -> Self {
        Polygon {
            plane,
            vertices,
            edges,
            tex_info: TexInfo::default(),
            sub_mat_id: 0,
            flags: PolygonFlags::NONE,
            id: PolygonId::new(),
            bsp: OnceLock::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Closed single-loop polygon. The plane is fitted to the loop and faces
    /// the side from which the loop winds counter-clockwise.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        let points: Vec<Point3<Real>> = vertices.iter().map(|v| v.pos).collect();
        let plane = Plane::from_loop(&points).unwrap_or_default();
        Self::with_plane(vertices, plane)
    }

    pub fn from_points(points: &[Point3<Real>]) -> Self {
        Self::new(points.iter().map(|p| Vertex::new(*p)).collect())
    }

    /// Closed single-loop polygon on a caller-supplied plane.
    pub fn with_plane(vertices: Vec<Vertex>, plane: Plane) -> Self {
        let n = vertices.len();
        let edges = (0..n).map(|i| [i, (i + 1) % n]).collect();
        Self::from_parts(plane, vertices, edges)
    }

    /// Checked constructor for caller-supplied loops.
    pub fn try_new(vertices: Vec<Vertex>) -> Result<Self, ValidationError> {
        if vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints(vertices.len()));
        }
        if let Some(bad) = vertices
            .iter()
            .find(|v| !v.pos.coords.iter().all(|c| c.is_finite()))
        {
            return Err(ValidationError::InvalidCoordinate(bad.pos));
        }
        for (i, v) in vertices.iter().enumerate() {
            let next = &vertices[(i + 1) % vertices.len()];
            if v.is_equivalent(next) {
                return Err(ValidationError::RepeatedPoint(v.pos));
            }
        }
        let points: Vec<Point3<Real>> = vertices.iter().map(|v| v.pos).collect();
        let plane = Plane::from_loop(&points).ok_or(ValidationError::DegeneratePlane)?;
        let polygon = Self::with_plane(vertices, plane);
        polygon.validate()?;
        Ok(polygon)
    }

    /// Open chain through `points` on `plane`.
    pub fn open_chain(points: &[Point3<Real>], plane: Plane) -> Self {
        let vertices = points.iter().map(|p| Vertex::new(*p)).collect();
        let edges = (1..points.len()).map(|i| [i - 1, i]).collect();
        Self::from_parts(plane, vertices, edges)
    }

    /// Polygon made of several closed loops. Outer loops must wind
    /// counter-clockwise around `plane`'s normal and holes clockwise.
    pub fn from_loops(plane: Plane, loops: Vec<Vec<Vertex>>) -> Self {
        let mut polygon = Self::empty(plane);
        for ring in loops {
            let base = polygon.vertices.len();
            let n = ring.len();
            if n < 3 {
                continue;
            }
            polygon.vertices.extend(ring);
            polygon
                .edges
                .extend((0..n).map(|i| [base + i, base + (i + 1) % n]));
        }
        polygon
    }

    /// Polygon with no edges on `plane`, to be filled with [`add_edge`](Self::add_edge).
    pub fn empty(plane: Plane) -> Self {
        Self::from_parts(plane, Vec::new(), Vec::new())
    }

    /// Polygon built from loose directed edges, endpoints welded by position.
    pub fn from_edges(plane: Plane, edges: &[Edge3D]) -> Self {
        let mut polygon = Self::empty(plane);
        for edge in edges {
            polygon.add_edge(edge);
        }
        polygon
    }

    /// Append a directed edge, reusing vertices that coincide with its endpoints.
    /// Degenerate and duplicate edges are ignored.
    pub fn add_edge(&mut self, edge: &Edge3D) {
        if edge.is_degenerate() {
            return;
        }
        let a = self.add_vertex(Vertex::with_uv(edge.v[0], edge.data[0]));
        let b = self.add_vertex(Vertex::with_uv(edge.v[1], edge.data[1]));
        if !self.edges.contains(&[a, b]) {
            self.edges.push([a, b]);
        }
        self.invalidate();
    }

    fn add_vertex(&mut self, vertex: Vertex) -> usize {
        match self.vertices.iter().position(|v| v.is_equivalent(&vertex)) {
            Some(i) => i,
            None => {
                self.vertices.push(vertex);
                self.vertices.len() - 1
            },
        }
    }

    /// Check edge indices, finiteness and planarity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for edge in &self.edges {
            for &index in edge {
                if index >= self.vertices.len() {
                    return Err(ValidationError::EdgeOutOfRange {
                        index,
                        len: self.vertices.len(),
                    });
                }
            }
        }
        for v in &self.vertices {
            if !v.pos.coords.iter().all(|c| c.is_finite()) {
                return Err(ValidationError::InvalidCoordinate(v.pos));
            }
            let distance = self.plane.distance(&v.pos);
            if distance.abs() > tolerance() * 10.0 {
                return Err(ValidationError::NonPlanar {
                    point: v.pos,
                    distance,
                });
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // accessors
    // ---------------------------------------------------------------------

    pub const fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Directed edges as vertex index pairs.
    pub fn edge_indices(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn position(&self, index: usize) -> Point3<Real> {
        self.vertices[index].pos
    }

    pub fn edge(&self, index: usize) -> Edge3D {
        let [a, b] = self.edges[index];
        Edge3D::with_data(
            self.vertices[a].pos,
            self.vertices[b].pos,
            self.vertices[a].uv,
            self.vertices[b].uv,
        )
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge3D> + '_ {
        (0..self.edges.len()).map(|i| self.edge(i))
    }

    pub const fn tex_info(&self) -> &TexInfo {
        &self.tex_info
    }

    pub fn set_tex_info(&mut self, tex_info: TexInfo) {
        self.tex_info = tex_info;
    }

    pub const fn sub_mat_id(&self) -> u16 {
        self.sub_mat_id
    }

    pub fn set_sub_mat_id(&mut self, id: u16) {
        self.sub_mat_id = id;
    }

    pub const fn flags(&self) -> PolygonFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: PolygonFlags) {
        self.flags = flags;
    }

    pub fn add_flags(&mut self, flags: PolygonFlags) {
        self.flags.insert(flags);
    }

    pub fn remove_flags(&mut self, flags: PolygonFlags) {
        self.flags.remove(flags);
    }

    pub const fn check_flags(&self, flags: PolygonFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub const fn id(&self) -> PolygonId {
        self.id
    }

    pub fn set_id(&mut self, id: PolygonId) {
        self.id = id;
    }

    /// Give the polygon a fresh identity (used when a clone becomes a new face).
    pub fn new_id(&mut self) {
        self.id = PolygonId::new();
    }

    /// Replace the supporting plane without touching vertices.
    pub fn set_plane(&mut self, plane: Plane) {
        self.plane = plane;
        self.invalidate();
    }

    /// Copy of the metadata (texture, material, flags, id) with new geometry.
    pub(crate) fn with_geometry(&self, plane: Plane, vertices: Vec<Vertex>, edges: Vec<[usize; 2]>) -> Polygon {
        Polygon {
            plane,
            vertices,
            edges,
            tex_info: self.tex_info,
            sub_mat_id: self.sub_mat_id,
            flags: self.flags,
            id: self.id,
            bsp: OnceLock::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Take another polygon's geometry, keeping our metadata and id.
    pub(crate) fn assign_geometry(&mut self, other: Polygon) {
        self.plane = other.plane;
        self.vertices = other.vertices;
        self.edges = other.edges;
        self.invalidate();
    }

    /// Drop the lazy BSP and bounding box.
    pub fn invalidate(&mut self) {
        self.bsp = OnceLock::new();
        self.bounding_box = OnceLock::new();
    }

    /// The polygon's private edge BSP, built on first use.
    pub fn bsp(&self) -> &BspTree2D {
        self.bsp
            .get_or_init(|| BspTree2D::build(&self.plane, &self.edges().collect::<Vec<_>>()))
    }

    // ---------------------------------------------------------------------
    // state
    // ---------------------------------------------------------------------

    /// Some edge has no predecessor or no successor.
    pub fn is_open(&self) -> bool {
        let mut has_next = vec![false; self.vertices.len()];
        let mut has_prev = vec![false; self.vertices.len()];
        for &[a, b] in &self.edges {
            has_next[a] = true;
            has_prev[b] = true;
        }
        self.edges.iter().any(|&[a, b]| !has_prev[a] || !has_next[b])
    }

    /// An open chain with at least one edge, or a closed polygon with a
    /// non-degenerate area.
    pub fn is_valid(&self) -> bool {
        if self.edges.is_empty() {
            return false;
        }
        if self.is_open() {
            return true;
        }
        self.edges.len() >= 3 && self.area() > tolerance() * tolerance()
    }

    // ---------------------------------------------------------------------
    // orientation and transforms
    // ---------------------------------------------------------------------

    /// Reverse the winding and the plane.
    pub fn flip(&mut self) {
        self.plane.flip();
        for edge in &mut self.edges {
            edge.swap(0, 1);
        }
        self.invalidate();
    }

    pub fn flipped(&self) -> Polygon {
        let mut p = self.clone();
        p.flip();
        p
    }

    /// Reflect across `mirror`, keeping the winding outward-consistent, and
    /// tag the result as [`PolygonFlags::MIRRORED`].
    pub fn mirror(&mut self, mirror: &Plane) {
        for v in &mut self.vertices {
            v.pos = mirror.mirror_point(&v.pos);
        }
        for edge in &mut self.edges {
            edge.swap(0, 1);
        }
        self.plane = mirror.mirror_plane(&self.plane);
        self.flags.insert(PolygonFlags::MIRRORED);
        self.invalidate();
    }

    /// Give every vertex a fresh tag from `next`, so copies can be traced
    /// back to it.
    pub(crate) fn tag_vertices(&mut self, next: &mut u32) {
        for v in &mut self.vertices {
            v.id = Some(*next);
            *next = next.wrapping_add(1);
        }
    }

    pub fn translate(&mut self, offset: &Vector3<Real>) {
        for v in &mut self.vertices {
            v.pos += offset;
        }
        self.plane.w += self.plane.normal.dot(offset);
        self.invalidate();
    }

    /// Apply an affine transform. Reflections reverse the winding so the
    /// polygon keeps facing its transformed plane.
    pub fn transform(&mut self, matrix: &Matrix4<Real>) {
        for v in &mut self.vertices {
            v.pos = matrix.transform_point(&v.pos);
        }
        let reflect = matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        if reflect {
            for edge in &mut self.edges {
                edge.swap(0, 1);
            }
        }
        self.plane = match self.plane.transformed(matrix) {
            Some(plane) => plane,
            None => self.fitted_plane().unwrap_or(self.plane),
        };
        self.invalidate();
    }

    /// Newell plane of the first closed loop.
    fn fitted_plane(&self) -> Option<Plane> {
        let ring = self.loops().into_iter().next()?;
        let points: Vec<Point3<Real>> = ring.iter().map(|&i| self.vertices[i].pos).collect();
        Plane::from_loop(&points)
    }

    /// Recompute texture coordinates from the plane frame and [`TexInfo`].
    pub fn reset_uvs(&mut self) {
        for v in &mut self.vertices {
            let local = self.plane.w2p(&v.pos);
            v.uv = self.tex_info.apply(&local);
        }
    }

    // ---------------------------------------------------------------------
    // measures
    // ---------------------------------------------------------------------

    /// Enclosed area (holes subtracted). Zero for open polygons.
    pub fn area(&self) -> Real {
        if self.is_open() {
            return 0.0;
        }
        self.loops()
            .iter()
            .map(|ring| self.loop_signed_area(ring))
            .sum::<Real>()
            .max(0.0)
    }

    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }
            if self.vertices.is_empty() {
                Aabb::new_invalid()
            } else {
                Aabb::new(mins, maxs)
            }
        })
    }

    /// Bounding box grown by [`BOUND_BOX_OFFSET`] for overlap tests.
    pub fn expanded_bounding_box(&self) -> Aabb {
        self.bounding_box().loosened(BOUND_BOX_OFFSET)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point3<Real> {
        self.bounding_box().center()
    }

    pub fn average_position(&self) -> Point3<Real> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords);
        Point3::from(sum / self.vertices.len() as Real)
    }

    /// Vertices strictly on the positive side of `plane`.
    pub fn vertex_count_above_plane(&self, plane: &Plane) -> usize {
        self.vertices
            .iter()
            .filter(|v| plane.distance(&v.pos) > 0.0)
            .count()
    }

    /// Shrink (positive `offset`) or grow every loop by moving its edges
    /// along their in-plane normals. Returns `false`, leaving the polygon
    /// untouched, when a loop would collapse or turn inside out.
    pub fn scale(&mut self, offset: Real) -> bool {
        if self.is_open() {
            return false;
        }
        let loops = self.loops();
        let mut moved: Vec<(usize, Point3<Real>)> = Vec::with_capacity(self.vertices.len());
        for ring in &loops {
            let pts: Vec<Point2<Real>> = ring
                .iter()
                .map(|&i| self.plane.w2p(&self.vertices[i].pos))
                .collect();
            let n = pts.len();
            let mut shifted = Vec::with_capacity(n);
            for i in 0..n {
                let prev = pts[(i + n - 1) % n];
                let curr = pts[i];
                let next = pts[(i + 1) % n];
                let d0 = (curr - prev).try_normalize(Real::EPSILON);
                let d1 = (next - curr).try_normalize(Real::EPSILON);
                let (Some(d0), Some(d1)) = (d0, d1) else {
                    return false;
                };
                // inward (left-hand) normals of both edges
                let n0 = nalgebra::Vector2::new(-d0.y, d0.x);
                let n1 = nalgebra::Vector2::new(-d1.y, d1.x);
                let denom = 1.0 + n0.dot(&n1);
                if denom < Real::EPSILON {
                    return false;
                }
                shifted.push(curr + (n0 + n1) * (offset / denom));
            }
            let before = signed_area_2d(&pts);
            let after = signed_area_2d(&shifted);
            if before.signum() != after.signum() || after.abs() < tolerance() * tolerance() {
                return false;
            }
            if offset > 0.0 && after.abs() > before.abs() {
                return false;
            }
            let folded = (0..n).any(|i| {
                let j = (i + 1) % n;
                (shifted[j] - shifted[i]).dot(&(pts[j] - pts[i])) <= 0.0
            });
            if folded {
                return false;
            }
            moved.extend(
                ring.iter()
                    .zip(shifted.iter())
                    .map(|(&i, q)| (i, self.plane.p2w(q))),
            );
        }
        for (i, p) in moved {
            self.vertices[i].pos = p;
        }
        self.invalidate();
        true
    }

    /// Some vertex coincides with `point`.
    pub fn has_vertex(&self, point: &Point3<Real>) -> bool {
        self.vertices.iter().any(|v| is_equivalent_point(&v.pos, point))
    }
}

/// Shoelace signed area of a 2D ring (positive when counter-clockwise).
pub(crate) fn signed_area_2d(points: &[Point2<Real>]) -> Real {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<Real>()
        * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: Real) -> Polygon {
        Polygon::from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, size, 0.0),
            Point3::new(0.0, size, 0.0),
        ])
    }

    #[test]
    fn ccw_square_faces_up() {
        let sq = square(2.0);
        assert!((sq.plane().normal - Vector3::z()).norm() < 1e-12);
        assert!((sq.area() - 4.0).abs() < 1e-9);
        assert!(!sq.is_open());
        assert!(sq.is_valid());
    }

    #[test]
    fn flip_keeps_area_and_reverses_plane() {
        let mut sq = square(1.0);
        sq.flip();
        assert!((sq.plane().normal + Vector3::z()).norm() < 1e-12);
        assert!((sq.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn open_chain_is_open() {
        let chain = Polygon::open_chain(
            &[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
            Plane::default(),
        );
        assert!(chain.is_open());
        assert!(chain.is_valid());
        assert_eq!(chain.area(), 0.0);
    }

    #[test]
    fn scale_shrinks_square() {
        let mut sq = square(1.0);
        assert!(sq.scale(0.1));
        assert!((sq.area() - 0.64).abs() < 1e-9, "area = {}", sq.area());
        assert!(!square(1.0).scale(0.6), "a square cannot shrink past its center");
    }

    #[test]
    fn clone_keeps_id() {
        let sq = square(1.0);
        assert_eq!(sq.clone().id(), sq.id());
        assert_ne!(square(1.0).id(), sq.id());
    }

    #[test]
    fn fresh_ids_are_random_v4_hex() {
        let id = PolygonId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(Uuid::from_u128(id.as_u128()).get_version_num(), 4);
        let parsed: PolygonId = serde_json::from_str(&format!("\"{text}\"")).expect("hex id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn try_new_rejects_repeats() {
        let pts = vec![
            Vertex::new(Point3::new(0.0, 0.0, 0.0)),
            Vertex::new(Point3::new(0.0, 0.0, 0.0)),
            Vertex::new(Point3::new(1.0, 1.0, 0.0)),
        ];
        assert!(matches!(Polygon::try_new(pts), Err(ValidationError::RepeatedPoint(_))));
    }
}
