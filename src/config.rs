use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;

use crate::assets::cache::CacheLimits;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SpinError, SpinResult};
use crate::physics::spin::{DEFAULT_DROP_THRESHOLD_RPM, SpinParams};
use crate::render::frame::RenderThreading;
use crate::render::plan::{AnimationPlan, Effect, RenderMode, TimingLimits};

/// Physics inputs of the spin planner, minus the timing the renderer decides.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Initial wheel speed, RPM.
    pub wheel_rpm0: f64,
    /// Initial ball speed, RPM.
    pub ball_rpm0: f64,
    /// Wheel decay constant, per second.
    pub wheel_friction: f64,
    /// Ball decay constant, per second.
    pub ball_friction: f64,
    /// Extra ball laps relative to the wheel.
    pub laps: u32,
    /// Ball speed, RPM, at which it leaves the track.
    pub drop_threshold_rpm: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            wheel_rpm0: 10.0,
            ball_rpm0: 40.0,
            wheel_friction: 0.1,
            ball_friction: 0.2,
            laps: 3,
            drop_threshold_rpm: DEFAULT_DROP_THRESHOLD_RPM,
        }
    }
}

impl PhysicsConfig {
    /// Planner parameters sampled at `fps` over `duration_secs`.
    pub fn to_params(&self, fps: f64, duration_secs: f64) -> SpinParams {
        SpinParams {
            fps,
            duration_secs,
            wheel_rpm0: self.wheel_rpm0,
            ball_rpm0: self.ball_rpm0,
            wheel_friction: self.wheel_friction,
            ball_friction: self.ball_friction,
            laps: self.laps,
            drop_threshold_rpm: self.drop_threshold_rpm,
        }
    }
}

/// Frame size, timing and look of the rendered animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Animation length before clamping.
    pub duration_ms: u64,
    /// Overrides the duration-tier frame rate when set.
    pub fps_hint: Option<f64>,
    /// Enabled effects.
    pub effects: Vec<Effect>,
    /// Angle source.
    pub mode: RenderMode,
    /// Frame-level parallelism.
    pub threading: RenderThreading,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 320,
            duration_ms: 5_000,
            fps_hint: None,
            effects: AnimationPlan::default_effects(),
            mode: RenderMode::default(),
            threading: RenderThreading::default(),
        }
    }
}

/// Byte limits and the degradation steps of the encoder.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Soft size target.
    pub byte_budget: u64,
    /// Size ceiling no accepted attempt may exceed.
    pub hard_cap: u64,
    /// Quality of the first attempt.
    pub default_quality: u8,
    /// Descending qualities tried after the first attempt.
    pub quality_steps: Vec<u8>,
    /// Descending frame keep percentages tried after the quality steps.
    pub keep_percents: Vec<u8>,
    /// Clamps applied to fps and duration.
    pub timing: TimingLimits,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            byte_budget: 4 * 1024 * 1024,
            hard_cap: 8 * 1024 * 1024,
            default_quality: 90,
            quality_steps: vec![75, 60, 45, 30, 15],
            keep_percents: vec![75, 50, 33, 25],
            timing: TimingLimits::default(),
        }
    }
}

/// Complete engine configuration. Every field has a default, so `{}` is a valid document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Planner physics.
    pub physics: PhysicsConfig,
    /// Renderer settings.
    pub render: RenderConfig,
    /// Encoder settings.
    pub encode: EncodeConfig,
    /// Asset cache health thresholds.
    pub cache: CacheLimits,
}

impl SpinConfig {
    /// Parse configuration JSON from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SpinResult<Self> {
        serde_json::from_reader(r).map_err(|e| SpinError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse configuration JSON from a string.
    pub fn from_json_str(s: &str) -> SpinResult<Self> {
        serde_json::from_str(s).map_err(|e| SpinError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse configuration JSON from a file.
    pub fn from_path(path: impl AsRef<Path>) -> SpinResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open config JSON '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON of the full configuration, defaults included.
    pub fn to_json_pretty(&self) -> SpinResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SpinError::serde(e.to_string()))
    }

    /// Check every value range. Runs before a request allocates anything.
    pub fn validate(&self) -> SpinResult<()> {
        self.physics.to_params(30.0, 1.0).validate()?;

        let r = &self.render;
        Canvas::new(r.width, r.height)?;
        if r.duration_ms == 0 {
            return Err(SpinError::validation("render duration_ms must be > 0"));
        }
        if let Some(fps) = r.fps_hint
            && !(fps.is_finite() && fps > 0.0)
        {
            return Err(SpinError::validation("render fps_hint must be finite and > 0"));
        }
        if r.threading.threads == Some(0) {
            return Err(SpinError::validation("render threads must be >= 1"));
        }

        let e = &self.encode;
        if e.hard_cap == 0 || e.byte_budget == 0 {
            return Err(SpinError::validation("encode byte_budget and hard_cap must be > 0"));
        }
        let quality_ok = |q: u8| (1..=100).contains(&q);
        if !quality_ok(e.default_quality) || !e.quality_steps.iter().copied().all(quality_ok) {
            return Err(SpinError::validation("encode qualities must be in 1..=100"));
        }
        if !e.keep_percents.iter().all(|k| (1..=100).contains(k)) {
            return Err(SpinError::validation("encode keep_percents must be in 1..=100"));
        }
        e.timing.validate()?;

        let c = &self.cache;
        if !(0.0..=1.0).contains(&c.min_hit_rate) {
            return Err(SpinError::validation("cache min_hit_rate must be in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
