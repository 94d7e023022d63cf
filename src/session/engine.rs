use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::assets::cache::{AssetCache, CacheHealthReport};
use crate::config::{PhysicsConfig, SpinConfig};
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingSink};
use crate::encode::artifact::EncodedArtifact;
use crate::encode::ladder::{EncodeControl, EncodeLadder, EncodeOutcome, LadderStep};
use crate::encode::report::SizeReport;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SpinError, SpinResult};
use crate::physics::spin::{SpinPlan, compute_spin_plan};
use crate::render::frame::{RenderControl, render_frames};
use crate::render::layers::{RenderAssets, wheel_diameter_for};
use crate::render::plan::{AnimationPlan, Effect, RenderMode};
use crate::session::job::RenderJob;
use crate::wheel::layout::{LayoutKind, PocketLabel};

/// One spin to render. Unset fields fall back to the engine configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpinRequest {
    /// Outcome label, e.g. `"17"`, `"0"` or `"00"`.
    pub outcome: String,
    /// Pocket arrangement.
    pub layout: LayoutKind,
    /// Physics override.
    #[serde(default)]
    pub physics: Option<PhysicsConfig>,
    /// Duration override, milliseconds.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Frame size override, `(width, height)`.
    #[serde(default)]
    pub frame_size: Option<(u32, u32)>,
    /// Byte budget override.
    #[serde(default)]
    pub byte_budget: Option<u64>,
    /// Frame-rate hint override.
    #[serde(default)]
    pub fps_hint: Option<f64>,
    /// Effects override.
    #[serde(default)]
    pub effects: Option<Vec<Effect>>,
    /// Render mode override.
    #[serde(default)]
    pub mode: Option<RenderMode>,
}

impl SpinRequest {
    /// Request for `outcome` on `layout` with every setting taken from configuration.
    pub fn new(outcome: impl Into<String>, layout: LayoutKind) -> Self {
        Self {
            outcome: outcome.into(),
            layout,
            physics: None,
            duration_ms: None,
            frame_size: None,
            byte_budget: None,
            fps_hint: None,
            effects: None,
            mode: None,
        }
    }

    /// Override the frame size.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    /// Override the duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Override the byte budget.
    pub fn with_byte_budget(mut self, byte_budget: u64) -> Self {
        self.byte_budget = Some(byte_budget);
        self
    }

    /// Override the frame-rate hint.
    pub fn with_fps_hint(mut self, fps: f64) -> Self {
        self.fps_hint = Some(fps);
        self
    }

    /// Override the effect list.
    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Override the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Override the physics.
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = Some(physics);
        self
    }
}

/// Everything produced for one request.
#[derive(Clone, Debug)]
pub struct SpinOutput {
    /// Encoded animation.
    pub artifact: EncodedArtifact,
    /// Trajectory the animation was drawn from.
    pub plan: SpinPlan,
    /// Animation settings after clamping.
    pub animation: AnimationPlan,
    /// Size analysis of `artifact`.
    pub report: SizeReport,
    /// Every encoder attempt.
    pub steps: Vec<LadderStep>,
    /// `true` when no encoder attempt fit the hard cap.
    pub exhausted: bool,
    /// Asset cache snapshot taken after the request.
    pub cache_health: CacheHealthReport,
}

/// A request with every setting resolved and validated.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedRequest {
    pub(crate) outcome: String,
    pub(crate) layout: LayoutKind,
    pub(crate) physics: PhysicsConfig,
    pub(crate) canvas: Canvas,
    pub(crate) byte_budget: u64,
    pub(crate) animation: AnimationPlan,
}

/// Entry point: plans, renders and encodes spins against a shared asset cache.
///
/// Cloning is cheap; clones share configuration, cache and sink.
#[derive(Clone)]
pub struct SpinEngine {
    config: Arc<SpinConfig>,
    cache: Arc<AssetCache>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl std::fmt::Debug for SpinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinEngine")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

impl SpinEngine {
    /// Engine over an injected cache and diagnostics sink. Rejects invalid configuration.
    pub fn new(
        config: SpinConfig,
        cache: Arc<AssetCache>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> SpinResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            cache,
            sink,
        })
    }

    /// Engine with a private cache sized from `config` and diagnostics forwarded to `tracing`.
    pub fn from_config(config: SpinConfig) -> SpinResult<Self> {
        let cache = Arc::new(AssetCache::with_limits(config.cache));
        Self::new(config, cache, Arc::new(TracingSink))
    }

    /// Active configuration.
    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    /// Shared asset cache.
    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    /// Compute only the trajectory for a request, without rendering.
    pub fn plan(&self, req: &SpinRequest) -> SpinResult<SpinPlan> {
        let resolved = self.resolve(req)?;
        self.plan_resolved(&resolved)
    }

    /// Plan, render and encode synchronously on the calling thread.
    ///
    /// Layers are generated into the shared cache before rendering starts and stay resident when
    /// a later stage fails. Only complete layers are ever inserted.
    pub fn generate(&self, req: &SpinRequest) -> SpinResult<SpinOutput> {
        let resolved = self.resolve(req)?;
        self.run(&resolved, None)
    }

    /// Validate `req` now, then plan, render and encode on a background thread.
    pub fn spawn(&self, req: SpinRequest) -> SpinResult<RenderJob> {
        let resolved = self.resolve(&req)?;
        RenderJob::start(self.clone(), resolved)
    }

    pub(crate) fn resolve(&self, req: &SpinRequest) -> SpinResult<ResolvedRequest> {
        let cfg = &self.config;
        let label: PocketLabel = req.outcome.parse()?;
        req.layout.layout().index_of(label)?;

        let physics = req.physics.unwrap_or(cfg.physics);
        let (width, height) = req
            .frame_size
            .unwrap_or((cfg.render.width, cfg.render.height));
        let canvas = Canvas::new(width, height)?;

        let byte_budget = req.byte_budget.unwrap_or(cfg.encode.byte_budget);
        if byte_budget == 0 {
            return Err(SpinError::validation("byte budget must be > 0"));
        }
        let duration_ms = req.duration_ms.unwrap_or(cfg.render.duration_ms);
        if duration_ms == 0 {
            return Err(SpinError::validation("duration_ms must be > 0"));
        }
        let fps_hint = req.fps_hint.or(cfg.render.fps_hint);
        if let Some(fps) = fps_hint
            && !(fps.is_finite() && fps > 0.0)
        {
            return Err(SpinError::validation("fps hint must be finite and > 0"));
        }

        let animation = AnimationPlan::new(label, duration_ms, fps_hint, &cfg.encode.timing)
            .with_effects(
                req.effects
                    .clone()
                    .unwrap_or_else(|| cfg.render.effects.clone()),
            )
            .with_mode(req.mode.unwrap_or(cfg.render.mode));
        animation.validate()?;
        physics
            .to_params(animation.fps, animation.duration_secs())
            .validate()?;

        Ok(ResolvedRequest {
            outcome: req.outcome.clone(),
            layout: req.layout,
            physics,
            canvas,
            byte_budget,
            animation,
        })
    }

    fn plan_resolved(&self, r: &ResolvedRequest) -> SpinResult<SpinPlan> {
        let params = r
            .physics
            .to_params(r.animation.fps, r.animation.duration_secs());
        compute_spin_plan(&r.outcome, r.layout, &params, &*self.sink)
    }

    /// Run a resolved request. A `CacheHealth` record is emitted whether or not it succeeds.
    pub(crate) fn run(
        &self,
        r: &ResolvedRequest,
        cancel: Option<&AtomicBool>,
    ) -> SpinResult<SpinOutput> {
        let result = self.run_inner(r, cancel);
        let health = self.cache.health();
        self.sink.record(Diagnostic::CacheHealth(health.clone()));
        let (plan, encoded) = result?;
        Ok(SpinOutput {
            artifact: encoded.artifact,
            plan,
            animation: r.animation.clone(),
            report: encoded.report,
            steps: encoded.steps,
            exhausted: encoded.exhausted,
            cache_health: health,
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(outcome = %r.outcome, layout = %r.layout))]
    fn run_inner(
        &self,
        r: &ResolvedRequest,
        cancel: Option<&AtomicBool>,
    ) -> SpinResult<(SpinPlan, EncodeOutcome)> {
        let sink = &*self.sink;
        let plan = self.plan_resolved(r)?;

        let assets = RenderAssets::from_cache(&self.cache, r.layout, wheel_diameter_for(r.canvas))?;
        let frames = render_frames(
            &r.animation,
            &plan,
            &assets,
            r.canvas,
            RenderControl {
                threading: &self.config.render.threading,
                cancel,
                sink,
            },
        )?;

        let ladder = EncodeLadder::from_config(&self.config.encode)?;
        let encoded = ladder.encode(
            &frames,
            r.animation.fps,
            r.byte_budget,
            EncodeControl { cancel, sink },
        )?;
        Ok((plan, encoded))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
