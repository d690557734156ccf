//! Cursor animation math.
//!
//! The page interpolates; the host decides the curve. [`ArcPath`] picks the
//! control point of a quadratic curve between the current cursor position
//! and the target. [`EasingFunction`] names the curves of the CSS overlay
//! transitions.

pub mod easing;
pub mod path;

pub use easing::EasingFunction;
pub use path::{ArcPath, ARC_OFFSET_RATIO, MAX_ARC_OFFSET};
