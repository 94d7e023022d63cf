//! Easing curves shared by the planner and the renderer.

/// Normalized easing functions.
pub mod ease;
