// Re-export parry for the f64 scalar
pub use parry3d_f64 as parry3d;

// Our Real scalar type:
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Default distance epsilon used by every geometric comparison.
pub const DESIGNER_EPSILON: Real = 1e-4;

/// Looser epsilon used where accumulated error is expected (snapping, opposite-face search).
pub const DESIGNER_LOOSE_EPSILON: Real = 1e-3;

/// Margin added around a polygon AABB before overlap tests.
pub const BOUND_BOX_OFFSET: Real = 1e-3;

/// Sentinel distance meaning "nothing found yet".
pub const ENOUGH_BIG_NUMBER: Real = 3e10;

/// Lazily-initialized tolerance used across the crate.
/// Defaults to [`DESIGNER_EPSILON`], but can be overridden:
///  1) **Build-time**: set env var `BRUSHCSG_TOLERANCE` (e.g. `BRUSHCSG_TOLERANCE=1e-5 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

/// Returns the current epsilon value.
/// If not set yet, it tries `BRUSHCSG_TOLERANCE` (parsed as `Real`) and
/// falls back to [`DESIGNER_EPSILON`].
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        // Compile-time env if provided, inherited by dependencies
        if let Some(environment_variable) = option_env!("BRUSHCSG_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        DESIGNER_EPSILON
    })
}

/// The loose epsilon, kept at the same ratio to [`tolerance`] as the defaults.
#[inline]
pub fn loose_tolerance() -> Real {
    tolerance() * (DESIGNER_LOOSE_EPSILON / DESIGNER_EPSILON)
}

/// Set epsilon programmatically once (subsequent calls are ignored).
/// Call near program start: `brushcsg::float_types::set_tolerance(1e-5);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}
