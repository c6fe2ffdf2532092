//! Binary space partitioning over polygon edges (2D) and polygons (3D).
//!
//! Both trees use the solid convention: the back side of a splitter is the
//! inside. Queries return fragments sorted into four buckets, and a
//! [`ClipObjective`] decides which buckets a Boolean step keeps.

mod traits;
mod tree2d;
mod tree3d;

pub use traits::{BalancedSplittingStrategy, FirstPolygonStrategy, SplittingPolygonStrategy};
pub use tree2d::{BspTree2D, EdgePartitions};
pub use tree3d::{BspTree3D, OutputPolygons};

/// Point classification against a closed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPos {
    Inside,
    Border,
    Outside,
}

/// Strength of the overlap between two regions, ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntersectionType {
    None,
    /// Shared boundary of positive length, no shared area.
    JustTouch,
    /// Shared area.
    Cross,
}

/// Which side of the other operand a clip step is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipType {
    /// Fragments classified inside (negative) the tree.
    Positive,
    /// Fragments classified outside (positive) the tree.
    Negative,
}

/// The Boolean step a clip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipObjective {
    JustClip,
    Union0,
    Union1,
    Intersection0,
    Intersection0IncludingCoSame,
    Intersection1,
    Intersection1IncludingCoDiff,
    Subtract,
}

/// Buckets a clip step keeps, and whether kept fragments are flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Routing {
    pub pos: bool,
    pub neg: bool,
    pub co_same: bool,
    pub co_diff: bool,
    pub flip: bool,
}

impl ClipObjective {
    /// The routing table shared by polygon edge clipping and the 3D engine.
    pub const fn routing(self, clip_type: ClipType) -> Routing {
        let none = Routing {
            pos: false,
            neg: false,
            co_same: false,
            co_diff: false,
            flip: false,
        };
        match (self, clip_type) {
            (ClipObjective::JustClip, ClipType::Positive) => Routing {
                neg: true,
                co_diff: true,
                ..none
            },
            (ClipObjective::JustClip, ClipType::Negative) => Routing {
                pos: true,
                co_same: true,
                ..none
            },
            (ClipObjective::Union0, ClipType::Negative) => Routing {
                pos: true,
                co_same: true,
                ..none
            },
            (ClipObjective::Union1, ClipType::Negative) => Routing { pos: true, ..none },
            (ClipObjective::Intersection0, ClipType::Positive)
            | (ClipObjective::Intersection1, ClipType::Positive) => Routing { neg: true, ..none },
            (ClipObjective::Intersection0IncludingCoSame, ClipType::Positive) => Routing {
                neg: true,
                co_same: true,
                ..none
            },
            (ClipObjective::Intersection1IncludingCoDiff, ClipType::Positive) => Routing {
                neg: true,
                co_diff: true,
                ..none
            },
            (ClipObjective::Subtract, ClipType::Positive) => Routing {
                neg: true,
                flip: true,
                ..none
            },
            (ClipObjective::Subtract, ClipType::Negative) => Routing {
                pos: true,
                co_diff: true,
                ..none
            },
            _ => none,
        }
    }
}
