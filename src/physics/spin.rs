use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::{circular_distance, wrap_angle};
use crate::wheel::layout::{LayoutKind, PocketLabel};

/// Deviations above this fraction of a pocket's angular width are reported.
pub const PRECISION_TOLERANCE_FRACTION: f64 = 0.001;

/// Default ball speed, in RPM, below which the ball leaves the outer track.
pub const DEFAULT_DROP_THRESHOLD_RPM: f64 = 12.0;

/// Number of trailing frames that absorb the landing correction.
pub const CORRECTION_SPREAD_FRAMES: usize = 4;

const MAX_LAPS: u32 = 64;
const MAX_TOTAL_FRAMES: f64 = 100_000.0;

/// Numeric inputs of [`compute_spin_plan`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpinParams {
    /// Frames per second of the sampled trajectory.
    pub fps: f64,
    /// Animation length in seconds.
    pub duration_secs: f64,
    /// Initial wheel speed in revolutions per minute.
    pub wheel_rpm0: f64,
    /// Initial ball speed in revolutions per minute.
    pub ball_rpm0: f64,
    /// Exponential decay constant of the wheel, per second.
    pub wheel_friction: f64,
    /// Exponential decay constant of the ball, per second.
    pub ball_friction: f64,
    /// Extra laps the ball travels relative to the wheel before settling.
    pub laps: u32,
    /// Ball speed in RPM at which it drops off the track.
    pub drop_threshold_rpm: f64,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            fps: 30.0,
            duration_secs: 5.0,
            wheel_rpm0: 10.0,
            ball_rpm0: 40.0,
            wheel_friction: 0.1,
            ball_friction: 0.2,
            laps: 3,
            drop_threshold_rpm: DEFAULT_DROP_THRESHOLD_RPM,
        }
    }
}

impl SpinParams {
    /// Check every precondition. Runs before any trajectory buffer is allocated.
    pub fn validate(&self) -> SpinResult<()> {
        let finite = [
            ("fps", self.fps),
            ("duration_secs", self.duration_secs),
            ("wheel_rpm0", self.wheel_rpm0),
            ("ball_rpm0", self.ball_rpm0),
            ("wheel_friction", self.wheel_friction),
            ("ball_friction", self.ball_friction),
            ("drop_threshold_rpm", self.drop_threshold_rpm),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(SpinError::validation(format!("{name} must be finite")));
            }
        }
        if self.fps <= 0.0 {
            return Err(SpinError::validation("fps must be > 0"));
        }
        if self.duration_secs <= 0.0 {
            return Err(SpinError::validation("duration_secs must be > 0"));
        }
        if self.fps * self.duration_secs > MAX_TOTAL_FRAMES {
            return Err(SpinError::validation(format!(
                "fps * duration_secs exceeds {MAX_TOTAL_FRAMES} frames"
            )));
        }
        if self.wheel_rpm0 < 0.0 || self.ball_rpm0 < 0.0 {
            return Err(SpinError::validation("initial RPM must be >= 0"));
        }
        if self.wheel_friction < 0.0 || self.ball_friction < 0.0 {
            return Err(SpinError::validation("friction must be >= 0"));
        }
        if self.drop_threshold_rpm <= 0.0 {
            return Err(SpinError::validation("drop_threshold_rpm must be > 0"));
        }
        if self.laps > MAX_LAPS {
            return Err(SpinError::validation(format!("laps must be <= {MAX_LAPS}")));
        }
        Ok(())
    }

    /// `ceil(fps · duration)`, guarded so exact products do not round up.
    pub fn total_frames(&self) -> usize {
        ((self.fps * self.duration_secs - 1e-9).ceil() as usize).max(1)
    }
}

/// Angular velocity in rad/s at time `t` for exponential decay.
pub fn angular_velocity(omega0: f64, k: f64, t: f64) -> f64 {
    omega0 * (-k * t).exp()
}

/// Closed-form angular position, the integral of [`angular_velocity`] from `0` to `t`.
pub fn angular_position(omega0: f64, k: f64, t: f64) -> f64 {
    if k == 0.0 {
        omega0 * t
    } else {
        (omega0 / k) * (1.0 - (-k * t).exp())
    }
}

/// Convert revolutions per minute into radians per second.
pub fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    rpm * TAU / 60.0
}

/// Precomputed deterministic trajectory for one spin.
///
/// Immutable after construction. Angles are in radians, normalized to `[0, 2π)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SpinPlan {
    wheel_angles: Vec<f64>,
    ball_angles: Vec<f64>,
    drop_frame: usize,
    total_frames: usize,
    winning_pocket_index: usize,
    pocket_angular_width: f64,
    layout: LayoutKind,
    wheel_travel: f64,
    fps: f64,
}

impl SpinPlan {
    /// Wheel angle per frame.
    pub fn wheel_angles(&self) -> &[f64] {
        &self.wheel_angles
    }

    /// Absolute ball angle per frame.
    pub fn ball_angles(&self) -> &[f64] {
        &self.ball_angles
    }

    /// Frame at which the ball leaves the outer track.
    pub fn drop_frame(&self) -> usize {
        self.drop_frame
    }

    /// Number of frames in the trajectory.
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Physical index of the requested outcome.
    pub fn winning_pocket_index(&self) -> usize {
        self.winning_pocket_index
    }

    /// Angular width of one pocket.
    pub fn pocket_angular_width(&self) -> f64 {
        self.pocket_angular_width
    }

    /// Wheel arrangement the plan was computed for.
    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    /// Unwrapped wheel rotation from the first to the last frame.
    pub fn wheel_travel(&self) -> f64 {
        self.wheel_travel
    }

    /// Sampling rate of the trajectory.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Label of the winning pocket.
    pub fn winning_label(&self) -> PocketLabel {
        self.layout.layout().labels()[self.winning_pocket_index]
    }

    /// Ball angle relative to the wheel at `frame`, in `[0, 2π)`.
    pub fn ball_relative_angle(&self, frame: usize) -> Option<f64> {
        let w = self.wheel_angles.get(frame)?;
        let b = self.ball_angles.get(frame)?;
        Some(wrap_angle(b - w))
    }

    /// Pocket the ball rests in on the last frame.
    pub fn landing_pocket(&self) -> usize {
        let rel = self
            .ball_relative_angle(self.total_frames - 1)
            .unwrap_or_default();
        self.layout.layout().pocket_at_angle(rel)
    }
}

/// Compute a frame-indexed trajectory that lands exactly on `outcome`.
///
/// Wheel motion follows the closed-form exponential-decay integral. The ball is expressed relative
/// to the wheel, eased with a quadratic ease-out from `laps` extra turns down to the winning
/// pocket's center, so the landing is independent of where the wheel stops.
#[tracing::instrument(level = "debug", skip(params, sink))]
pub fn compute_spin_plan(
    outcome: &str,
    layout: LayoutKind,
    params: &SpinParams,
    sink: &dyn DiagnosticsSink,
) -> SpinResult<SpinPlan> {
    params.validate()?;
    let table = layout.layout();
    let winning = table.index_of_str(outcome)?;

    let total = params.total_frames();
    let fps = params.fps;
    let width = table.pocket_angular_width();
    let center = table.pocket_center_angle(winning);

    let wheel_w0 = rpm_to_rad_per_sec(params.wheel_rpm0);
    let mut wheel_angles = Vec::with_capacity(total);
    for i in 0..total {
        let t = i as f64 / fps;
        wheel_angles.push(wrap_angle(angular_position(
            wheel_w0,
            params.wheel_friction,
            t,
        )));
    }
    let wheel_travel = angular_position(
        wheel_w0,
        params.wheel_friction,
        (total - 1) as f64 / fps,
    );

    let drop_frame = drop_frame(params, total);

    let start_rel = f64::from(params.laps) * TAU + center;
    let end_rel = center;
    let denom = (total.saturating_sub(1)).max(1) as f64;
    let mut ball_angles = Vec::with_capacity(total);
    for (i, wheel) in wheel_angles.iter().enumerate() {
        let p = Ease::OutQuad.apply(i as f64 / denom);
        let rel = start_rel + (end_rel - start_rel) * p;
        ball_angles.push(wrap_angle(wheel + rel));
    }

    apply_landing_correction(&wheel_angles, &mut ball_angles, center);

    let last = total - 1;
    report_landing_deviation(
        wheel_angles[last],
        ball_angles[last],
        winning,
        center,
        width,
        sink,
    );

    tracing::debug!(total, drop_frame, winning, "spin plan computed");
    Ok(SpinPlan {
        wheel_angles,
        ball_angles,
        drop_frame,
        total_frames: total,
        winning_pocket_index: winning,
        pocket_angular_width: width,
        layout,
        wheel_travel,
        fps,
    })
}

fn drop_frame(params: &SpinParams, total: usize) -> usize {
    let omega0 = rpm_to_rad_per_sec(params.ball_rpm0);
    let threshold = rpm_to_rad_per_sec(params.drop_threshold_rpm);
    let last = total - 1;
    if omega0 <= threshold {
        return 0;
    }
    if params.ball_friction == 0.0 {
        return last;
    }
    let t = (omega0 / threshold).ln() / params.ball_friction;
    let f = (t * params.fps).round();
    if !f.is_finite() || f < 0.0 {
        return 0;
    }
    (f as usize).min(last)
}

// Measures the drift at the last frame, spreads it linearly over the trailing frames, then pins
// the last frame to the exact pocket center.
fn apply_landing_correction(wheel: &[f64], ball: &mut [f64], center: f64) {
    let last = ball.len() - 1;
    let ideal = wrap_angle(wheel[last] + center);
    let drift = signed_delta(ideal, ball[last]);
    if drift != 0.0 {
        let spread = CORRECTION_SPREAD_FRAMES.min(ball.len());
        let first = ball.len() - spread;
        for (k, b) in ball[first..last].iter_mut().enumerate() {
            let share = (k + 1) as f64 / spread as f64;
            *b = wrap_angle(*b + drift * share);
        }
    }
    ball[last] = ideal;
}

/// Deviation of the final relative ball angle from the pocket center. Records a
/// [`Diagnostic::PrecisionDeviation`] when it exceeds [`PRECISION_TOLERANCE_FRACTION`] of the
/// pocket width.
pub(crate) fn report_landing_deviation(
    wheel_last: f64,
    ball_last: f64,
    pocket_index: usize,
    center: f64,
    width: f64,
    sink: &dyn DiagnosticsSink,
) -> f64 {
    let deviation = circular_distance(wrap_angle(ball_last - wheel_last), center);
    let tolerance = PRECISION_TOLERANCE_FRACTION * width;
    if deviation > tolerance {
        sink.record(Diagnostic::PrecisionDeviation {
            pocket_index,
            deviation_rad: deviation,
            tolerance_rad: tolerance,
        });
    }
    deviation
}

fn signed_delta(to: f64, from: f64) -> f64 {
    let d = wrap_angle(to - from);
    if d > std::f64::consts::PI { d - TAU } else { d }
}

/// Independently recompute the final relative ball angle and check it lies within half a pocket
/// of the winning pocket's center.
pub fn verify_spin_plan(plan: &SpinPlan) -> bool {
    let n = plan.total_frames;
    if n == 0 || plan.wheel_angles.len() != n || plan.ball_angles.len() != n {
        return false;
    }
    let layout = plan.layout.layout();
    if plan.winning_pocket_index >= layout.len() {
        return false;
    }
    if plan.drop_frame >= n {
        return false;
    }
    if plan
        .wheel_angles
        .iter()
        .chain(plan.ball_angles.iter())
        .any(|a| !a.is_finite())
    {
        return false;
    }
    let width = std::f64::consts::TAU / layout.len() as f64;
    let center = (plan.winning_pocket_index as f64 + 0.5) * width;
    let rel = (plan.ball_angles[n - 1] - plan.wheel_angles[n - 1]).rem_euclid(TAU);
    circular_distance(rel, center) <= width / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/physics/spin.rs"]
mod tests;
