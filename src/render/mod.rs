//! Frame rendering: animation plans, static layers, per-frame poses and compositing.

/// Per-pixel blend helpers.
pub mod effects;
/// Pose computation and the multi-frame render loop.
pub mod frame;
/// Asset bundles and per-request static layers.
pub mod layers;
/// Animation plans: phases, effects, render mode and timing limits.
pub mod plan;
