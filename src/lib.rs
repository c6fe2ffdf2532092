//! **BSP-based Constructive Solid Geometry for editable brushes.**
//!
//! A [`Model`] is a solid made of planar [`Polygon`]s, each of which may carry
//! holes, several islands, texture mapping and a stable id. Models combine
//! through the [`CSGOps`](traits::CSGOps) Booleans (*union*, *subtract*,
//! *intersect*, *clip inside*, *clip outside*), which classify every polygon
//! of one operand against a [BSP tree](model::bsp) of the other.
//!
//! Coplanar polygons are combined in the plane's own 2D frame, so editing
//! operations such as [`Model::add_union_polygon`] or
//! [`Model::add_split_polygon`] keep faces merged and seams explicit.
//!
//! # Tolerance
//! Every geometric comparison goes through
//! [`float_types::tolerance`], `1e-4` unless overridden through the
//! `BRUSHCSG_TOLERANCE` build-time environment variable or
//! [`float_types::set_tolerance`].
//!
//! # Failure
//! Degenerate geometry never produces an error. Fragments that collapse are
//! dropped and operations report `bool`, `Option` or a status. Errors
//! ([`errors`]) only describe caller-supplied or persisted data.

#![forbid(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod model;
pub mod traits;

pub use model::plane::Plane;
pub use model::polygon::Polygon;
pub use model::vertex::Vertex;
pub use model::{Model, ModelFlags, ShelfId};
pub use traits::CSGOps;
