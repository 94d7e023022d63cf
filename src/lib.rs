//! Wheelspin renders roulette spin animations that land on a predetermined outcome.
//!
//! The pipeline is request-scoped and deterministic:
//!
//! - [`compute_spin_plan`] precomputes per-frame wheel and ball angles that end exactly on the
//!   winning pocket
//! - [`AssetCache`] generates the static wheel layers once per layout and size
//! - [`render_frames`] composites frames on the CPU, in parallel
//! - [`EncodeLadder`] encodes them under a byte budget, degrading quality, frame count and
//!   finally format
//!
//! [`SpinEngine`] ties the stages together, synchronously or on a background [`RenderJob`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Easing curves.
pub mod animation;
/// Static raster layers and their cache.
pub mod assets;
/// Engine configuration.
pub mod config;
/// Structured diagnostics and sinks.
pub mod diagnostics;
/// Adaptive animation encoding.
pub mod encode;
/// Shared value types, errors and numeric helpers.
pub mod foundation;
/// Spin trajectories.
pub mod physics;
/// Frame rendering.
pub mod render;
/// Request orchestration.
pub mod session;
/// Wheel layouts and geometry.
pub mod wheel;

pub use crate::assets::cache::{
    AssetCache, AssetKey, AssetKind, CacheHealthReport, CacheLimits, CacheStats, HealthVerdict,
    RasterImage,
};
pub use crate::config::{EncodeConfig, PhysicsConfig, RenderConfig, SpinConfig};
pub use crate::diagnostics::{
    ChannelSink, CollectingSink, Diagnostic, DiagnosticsSink, NullSink, TeeSink, TracingSink,
};
pub use crate::encode::artifact::{EncodedArtifact, FormatTag};
pub use crate::encode::ladder::{
    EncodeControl, EncodeLadder, EncodeOutcome, EncodeStrategy, LadderStep,
};
pub use crate::encode::report::{SizeIssue, SizeReport, analyze_size};
pub use crate::foundation::core::{Canvas, Rgba8Premul};
pub use crate::foundation::error::{SpinError, SpinResult};
pub use crate::physics::spin::{SpinParams, SpinPlan, compute_spin_plan, verify_spin_plan};
pub use crate::render::frame::{FramePose, FrameRGBA, RenderControl, RenderThreading, render_frames};
pub use crate::render::layers::{RenderAssets, wheel_diameter_for};
pub use crate::render::plan::{AnimationPlan, Effect, RenderMode, TimingLimits};
pub use crate::session::engine::{SpinEngine, SpinOutput, SpinRequest};
pub use crate::session::job::RenderJob;
pub use crate::wheel::layout::{LayoutKind, PocketColor, PocketLabel, WheelLayout};
