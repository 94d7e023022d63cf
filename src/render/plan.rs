use crate::animation::ease::Ease;
use crate::foundation::error::{SpinError, SpinResult};
use crate::wheel::layout::PocketLabel;

/// Longest accepted motion-blur trail.
pub const MAX_TRAIL: u8 = 12;

/// Fraction of frames, counted from the end, during which the winning pocket glows.
pub const GLOW_TAIL: f64 = 0.3;

/// Fraction of frames, counted from the end, during which the result popup is shown.
pub const POPUP_TAIL: f64 = 0.2;

/// Fraction of frames, counted from the end, by which the ball has started dropping toward its
/// pocket even if it is still above the drop threshold.
pub const SETTLE_TAIL: f64 = 0.3;

/// Relative wheel speed handed from the deceleration phase to the stop phase.
const STOP_SPEED: f64 = 0.06;

/// Visual phase of the wheel's motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Initial fast rotation.
    SpinUp,
    /// Long, dramatic slow-down.
    Decelerate,
    /// Final settle onto the resting angle.
    Stop,
}

impl Phase {
    /// Curve shaping the wheel speed between the phase's start and end levels.
    pub fn ease(self) -> Ease {
        match self {
            Self::SpinUp => Ease::OutCubic,
            Self::Decelerate => Ease::OutQuart,
            Self::Stop => Ease::InOutCubic,
        }
    }

    /// Wheel speed at the start and end of the phase, relative to the peak speed.
    ///
    /// Each phase starts at the level the previous one ends on, so the default sequence has no
    /// speed jumps and the speed never rises again once spin-up is over.
    pub fn speed_levels(self) -> (f64, f64) {
        match self {
            Self::SpinUp => (0.0, 1.0),
            Self::Decelerate => (1.0, STOP_SPEED),
            Self::Stop => (STOP_SPEED, 0.0),
        }
    }

    /// Share of the phase's duration times peak speed covered by local progress `u`.
    fn distance(self, u: f64) -> f64 {
        let (v0, v1) = self.speed_levels();
        v0 * u + (v1 - v0) * self.ease().integral(u)
    }
}

/// One phase and its relative share of the animation time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseSpan {
    /// Phase kind.
    pub phase: Phase,
    /// Relative time weight; spans are normalized by the sum of weights.
    pub weight: f64,
}

/// Optional per-frame effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Re-composite the ball at its `trail` most recent positions with decaying opacity.
    MotionBlur {
        /// Number of ghost positions.
        trail: u8,
    },
    /// Screen-blended radial highlights over the wheel.
    Specular,
    /// Darkened frame edges.
    Vignette,
    /// Pulsing highlight on the winning pocket near the end.
    WinnerGlow,
    /// Result banner near the end.
    ResultPopup,
}

/// How per-frame angles are derived from the spin plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Draw the planner's angles verbatim; frame counts must match.
    #[default]
    PhysicsAccurate,
    /// Re-time the wheel through the phase curves, resampling the ball's relative angle.
    Stylized,
}

/// Limits applied to caller-provided timing before any frame arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingLimits {
    /// Lowest supported frame rate.
    pub min_fps: f64,
    /// Highest supported frame rate.
    pub max_fps: f64,
    /// Shortest accepted animation.
    pub min_duration_ms: u64,
    /// Longest accepted animation.
    pub max_duration_ms: u64,
}

impl Default for TimingLimits {
    fn default() -> Self {
        Self {
            min_fps: 8.0,
            max_fps: 50.0,
            min_duration_ms: 500,
            max_duration_ms: 20_000,
        }
    }
}

impl TimingLimits {
    /// Clamp `fps` into range; non-finite input falls back to the tier rate for `duration_ms`.
    pub fn clamp_fps(&self, fps: f64, duration_ms: u64) -> f64 {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            fps_for_duration(duration_ms)
        };
        fps.clamp(self.min_fps, self.max_fps)
    }

    /// Clamp a duration into range.
    pub fn clamp_duration_ms(&self, duration_ms: u64) -> u64 {
        duration_ms.clamp(self.min_duration_ms, self.max_duration_ms)
    }

    /// Check the limits themselves.
    pub fn validate(&self) -> SpinResult<()> {
        if !(self.min_fps.is_finite() && self.max_fps.is_finite())
            || self.min_fps <= 0.0
            || self.min_fps > self.max_fps
        {
            return Err(SpinError::validation(
                "fps limits must be finite with 0 < min_fps <= max_fps",
            ));
        }
        if self.min_duration_ms == 0 || self.min_duration_ms > self.max_duration_ms {
            return Err(SpinError::validation(
                "duration limits must satisfy 0 < min <= max",
            ));
        }
        Ok(())
    }
}

/// Frame rate tier for a clip length: shorter clips get smoother motion.
pub fn fps_for_duration(duration_ms: u64) -> f64 {
    match duration_ms {
        0..=3_000 => 30.0,
        3_001..=6_000 => 24.0,
        6_001..=10_000 => 20.0,
        _ => 15.0,
    }
}

/// Descriptive renderer input for one request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationPlan {
    /// Ordered visual phases.
    pub phases: Vec<PhaseSpan>,
    /// Animation length.
    pub duration_ms: u64,
    /// Enabled effects.
    pub effects: Vec<Effect>,
    /// Outcome the animation lands on.
    pub target_outcome: PocketLabel,
    /// Angle source.
    pub mode: RenderMode,
    /// Frame rate of the rendered sequence.
    pub fps: f64,
}

impl AnimationPlan {
    /// Plan with the default phases and effects, clamped timing, and tier or hinted fps.
    pub fn new(
        target_outcome: PocketLabel,
        duration_ms: u64,
        fps_hint: Option<f64>,
        limits: &TimingLimits,
    ) -> Self {
        let duration_ms = limits.clamp_duration_ms(duration_ms);
        let fps = limits.clamp_fps(
            fps_hint.unwrap_or_else(|| fps_for_duration(duration_ms)),
            duration_ms,
        );
        Self {
            phases: Self::default_phases(),
            duration_ms,
            effects: Self::default_effects(),
            target_outcome,
            mode: RenderMode::default(),
            fps,
        }
    }

    /// Spin-up, deceleration, stop.
    pub fn default_phases() -> Vec<PhaseSpan> {
        vec![
            PhaseSpan {
                phase: Phase::SpinUp,
                weight: 0.15,
            },
            PhaseSpan {
                phase: Phase::Decelerate,
                weight: 0.70,
            },
            PhaseSpan {
                phase: Phase::Stop,
                weight: 0.15,
            },
        ]
    }

    /// Every effect, with a four-ghost trail.
    pub fn default_effects() -> Vec<Effect> {
        vec![
            Effect::MotionBlur { trail: 4 },
            Effect::Specular,
            Effect::Vignette,
            Effect::WinnerGlow,
            Effect::ResultPopup,
        ]
    }

    /// Replace the effect list.
    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    /// Replace the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// `ceil(duration_ms / 1000 · fps)`, at least one.
    pub fn frame_count(&self) -> usize {
        let exact = self.duration_ms as f64 / 1000.0 * self.fps;
        ((exact - 1e-9).ceil() as usize).max(1)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// Whether an effect of the same kind is enabled.
    pub fn has_effect(&self, effect: Effect) -> bool {
        self.effects
            .iter()
            .any(|e| std::mem::discriminant(e) == std::mem::discriminant(&effect))
    }

    /// Trail length of the motion-blur effect, zero when disabled.
    pub fn motion_blur_trail(&self) -> u8 {
        self.effects
            .iter()
            .find_map(|e| match e {
                Effect::MotionBlur { trail } => Some(*trail),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Reject plans the renderer cannot draw.
    pub fn validate(&self) -> SpinResult<()> {
        if self.phases.is_empty() {
            return Err(SpinError::validation(
                "animation plan has no phase sequence",
            ));
        }
        for span in &self.phases {
            if !span.weight.is_finite() || span.weight <= 0.0 {
                return Err(SpinError::validation(format!(
                    "phase {:?} weight must be finite and > 0",
                    span.phase
                )));
            }
        }
        if self.duration_ms == 0 {
            return Err(SpinError::validation("duration_ms must be > 0"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(SpinError::validation("fps must be finite and > 0"));
        }
        if self.motion_blur_trail() > MAX_TRAIL {
            return Err(SpinError::validation(format!(
                "motion blur trail must be <= {MAX_TRAIL}"
            )));
        }
        Ok(())
    }

    /// Phase active at normalized progress `p` and the local progress within it.
    pub fn phase_at(&self, p: f64) -> Option<(Phase, f64)> {
        let total: f64 = self.phases.iter().map(|s| s.weight).sum();
        if self.phases.is_empty() || total <= 0.0 {
            return None;
        }
        let p = p.clamp(0.0, 1.0);
        let mut t0 = 0.0;
        for (i, span) in self.phases.iter().enumerate() {
            let t1 = t0 + span.weight / total;
            let last = i + 1 == self.phases.len();
            if p < t1 || last {
                let local = if t1 > t0 { (p - t0) / (t1 - t0) } else { 1.0 };
                return Some((span.phase, local.clamp(0.0, 1.0)));
            }
            t0 = t1;
        }
        None
    }

    /// Fraction of the total wheel travel covered at normalized progress `p`.
    ///
    /// The wheel speed follows each phase's curve between its [`Phase::speed_levels`]; the
    /// fraction is the integral of that speed. Monotonic non-decreasing, `0` at `p = 0` and `1` at
    /// `p = 1`.
    pub fn travel_fraction(&self, p: f64) -> f64 {
        let total_w: f64 = self.phases.iter().map(|s| s.weight).sum();
        if self.phases.is_empty() || total_w <= 0.0 {
            return p.clamp(0.0, 1.0);
        }
        let span_distance = |span: &PhaseSpan, u: f64| span.weight / total_w * span.phase.distance(u);
        let total: f64 = self.phases.iter().map(|s| span_distance(s, 1.0)).sum();
        if total <= 0.0 {
            return p.clamp(0.0, 1.0);
        }
        if p >= 1.0 {
            return 1.0;
        }
        let p = p.max(0.0);
        let (mut t0, mut covered) = (0.0, 0.0);
        for (i, span) in self.phases.iter().enumerate() {
            let t1 = t0 + span.weight / total_w;
            if p < t1 || i + 1 == self.phases.len() {
                let local = if t1 > t0 { (p - t0) / (t1 - t0) } else { 1.0 };
                let d = covered + span_distance(span, local.clamp(0.0, 1.0));
                return (d / total).clamp(0.0, 1.0);
            }
            covered += span_distance(span, 1.0);
            t0 = t1;
        }
        1.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
