//! Validation and persistence errors.
//!
//! Geometric failures inside the Boolean engine are never reported here; they
//! surface as `bool`, `Option` or status returns. These types only cover data
//! handed in by callers.

use crate::float_types::Real;
use nalgebra::Point3;

/// All the possible validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A loop or chain has fewer than the minimal number of points
    #[error("(TooFewPoints) A loop or chain has fewer than the minimal #points: got {0}")]
    TooFewPoints(usize),
    /// The coordinate has a NaN or infinite component
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// Two consecutive points are identical
    #[error("(RepeatedPoint) Two consecutive coords are identical at: {0}")]
    RepeatedPoint(Point3<Real>),
    /// A vertex lies off the supporting plane by more than the tolerance
    #[error("(NonPlanar) Vertex {point} lies {distance} away from the supporting plane")]
    NonPlanar { point: Point3<Real>, distance: Real },
    /// The points do not span a plane
    #[error("(DegeneratePlane) Vertices do not define a plane")]
    DegeneratePlane,
    /// An edge references a vertex index that does not exist
    #[error("(EdgeOutOfRange) Edge index {index} is out of range (vertices.len = {len})")]
    EdgeOutOfRange { index: usize, len: usize },
    /// In general, anything else
    #[error("{0}")]
    Other(String),
}

/// Errors raised while persisting or restoring a [`Model`](crate::Model).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to (de)serialize model: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("restored polygon {index} is invalid: {source}")]
    InvalidPolygon {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
