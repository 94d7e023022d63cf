use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;

use crate::diagnostics::{Diagnostic, DiagnosticsSink, NullSink};
use crate::foundation::core::{Affine, Canvas, Point};
use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::{smoothstep, wrap_angle};
use crate::physics::spin::SpinPlan;
use crate::render::effects::{glow, over_in_place, screen_in_place, vignette_in_place};
use crate::render::layers::{GLOW_COLOR, RenderAssets, StaticLayers, wheel_diameter_for};
use crate::render::plan::{AnimationPlan, Effect, GLOW_TAIL, POPUP_TAIL, RenderMode, SETTLE_TAIL};
use crate::wheel::geometry::{ball_radius_fraction, polar, radii};

/// A rendered frame as RGBA8 pixels.
///
/// Frames leave the renderer premultiplied and fully opaque.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Everything about one frame that depends on time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FramePose {
    /// Wheel rotation, clockwise radians.
    pub wheel_angle: f64,
    /// Absolute ball angle, clockwise radians.
    pub ball_angle: f64,
    /// Ball distance from the wheel center as a fraction of the wheel radius.
    pub ball_radius: f64,
    /// Winning-pocket glow strength in `[0, 1]`.
    pub glow: f64,
    /// Result popup opacity in `[0, 1]`.
    pub popup: f64,
}

/// Threading controls for multi-frame rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

/// Side channels of a render: threading, cancellation and diagnostics.
#[derive(Clone, Copy)]
pub struct RenderControl<'a> {
    /// Threading controls.
    pub threading: &'a RenderThreading,
    /// Set to abandon the render; checked before every frame.
    pub cancel: Option<&'a AtomicBool>,
    /// Receives progress records.
    pub sink: &'a dyn DiagnosticsSink,
}

impl Default for RenderControl<'_> {
    fn default() -> Self {
        static DEFAULT_THREADING: RenderThreading = RenderThreading {
            parallel: true,
            threads: None,
        };
        Self {
            threading: &DEFAULT_THREADING,
            cancel: None,
            sink: &NullSink,
        }
    }
}

fn progress(frame: usize, count: usize) -> f64 {
    if count <= 1 {
        1.0
    } else {
        frame as f64 / (count - 1) as f64
    }
}

/// Reject animation/spin pairs that cannot be drawn together.
pub fn check_alignment(anim: &AnimationPlan, spin: &SpinPlan) -> SpinResult<()> {
    anim.validate()?;
    if anim.target_outcome != spin.winning_label() {
        return Err(SpinError::validation(format!(
            "animation targets '{}' but the spin plan lands on '{}'",
            anim.target_outcome,
            spin.winning_label()
        )));
    }
    if anim.mode == RenderMode::PhysicsAccurate && anim.frame_count() != spin.total_frames() {
        return Err(SpinError::validation(format!(
            "physics-accurate render needs {} frames but the spin plan has {}",
            anim.frame_count(),
            spin.total_frames()
        )));
    }
    Ok(())
}

/// Pose of `frame` without rasterising anything.
///
/// In [`RenderMode::PhysicsAccurate`] the wheel and ball angles are the spin plan's values for the
/// same frame index, bit for bit.
pub fn frame_pose(anim: &AnimationPlan, spin: &SpinPlan, frame: usize) -> SpinResult<FramePose> {
    let count = anim.frame_count();
    if frame >= count {
        return Err(SpinError::validation(format!(
            "frame {frame} out of range for {count} frames"
        )));
    }
    let p = progress(frame, count);
    let plan_last = spin.total_frames() - 1;

    let (wheel_angle, ball_angle, drop_p) = match anim.mode {
        RenderMode::PhysicsAccurate => {
            if count != spin.total_frames() {
                return Err(SpinError::validation(
                    "physics-accurate render frame count differs from the spin plan",
                ));
            }
            (
                spin.wheel_angles()[frame],
                spin.ball_angles()[frame],
                progress(spin.drop_frame(), spin.total_frames()),
            )
        }
        RenderMode::Stylized => {
            let start = spin.wheel_angles()[0];
            let wheel = wrap_angle(start + spin.wheel_travel() * anim.travel_fraction(p));
            let j = ((p * plan_last as f64).round() as usize).min(plan_last);
            let rel = spin.ball_relative_angle(j).unwrap_or_default();
            (
                wheel,
                wrap_angle(wheel + rel),
                progress(spin.drop_frame(), spin.total_frames()),
            )
        }
    };

    // The ball leaves the track at the drop frame, or SETTLE_TAIL before the end at the latest.
    let settle = smoothstep(drop_p.min(1.0 - SETTLE_TAIL), 1.0, p);

    let glow = if anim.has_effect(Effect::WinnerGlow) && p >= 1.0 - GLOW_TAIL {
        let local = (p - (1.0 - GLOW_TAIL)) / GLOW_TAIL;
        let pulse = 0.65 + 0.35 * (std::f64::consts::TAU * 3.0 * local).cos();
        (smoothstep(0.0, 0.2, local) * pulse).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let popup = if anim.has_effect(Effect::ResultPopup) && p >= 1.0 - POPUP_TAIL {
        smoothstep(0.0, 0.35, (p - (1.0 - POPUP_TAIL)) / POPUP_TAIL)
    } else {
        0.0
    };

    Ok(FramePose {
        wheel_angle,
        ball_angle,
        ball_radius: ball_radius_fraction(settle),
        glow,
        popup,
    })
}

struct Progress<'a> {
    done: AtomicU64,
    total: u64,
    step: u64,
    sink: &'a dyn DiagnosticsSink,
}

impl Progress<'_> {
    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.step == 0 || done == self.total {
            self.sink.record(Diagnostic::RenderProgress {
                frames_done: done,
                frames_total: self.total,
            });
        }
    }
}

/// Render every frame of `anim`, drawing the wheel and ball where `spin` puts them.
///
/// Static layers are prepared once; frames are then drawn independently, in parallel when
/// `ctrl.threading.parallel` is set. A set cancel flag aborts with [`SpinError::Cancelled`] and
/// discards every finished frame.
#[tracing::instrument(level = "debug", skip_all, fields(frames = anim.frame_count()))]
pub fn render_frames(
    anim: &AnimationPlan,
    spin: &SpinPlan,
    assets: &RenderAssets,
    canvas: Canvas,
    ctrl: RenderControl<'_>,
) -> SpinResult<Vec<FrameRGBA>> {
    canvas.validate()?;
    assets.validate()?;
    check_alignment(anim, spin)?;
    if assets.layout() != spin.layout() {
        return Err(SpinError::validation(format!(
            "assets depict a {} wheel but the spin plan is {}",
            assets.layout(),
            spin.layout()
        )));
    }
    if assets.wheel_px() != wheel_diameter_for(canvas) {
        return Err(SpinError::validation(format!(
            "assets are {} px but a {}x{} canvas needs {} px",
            assets.wheel_px(),
            canvas.width,
            canvas.height,
            wheel_diameter_for(canvas)
        )));
    }

    let layers = StaticLayers::build(anim, assets, canvas, spin.winning_pocket_index())?;
    let count = anim.frame_count();
    let progress = Progress {
        done: AtomicU64::new(0),
        total: count as u64,
        step: (count as u64).div_ceil(10).max(1),
        sink: ctrl.sink,
    };
    let w = u16::try_from(canvas.width)
        .map_err(|_| SpinError::validation("canvas width exceeds u16"))?;
    let h = u16::try_from(canvas.height)
        .map_err(|_| SpinError::validation("canvas height exceeds u16"))?;

    let draw = |ctx: &mut vello_cpu::RenderContext, f: usize| -> SpinResult<FrameRGBA> {
        if ctrl.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(SpinError::cancelled(format!("render abandoned at frame {f}")));
        }
        let frame = draw_frame(ctx, &layers, anim, spin, f)?;
        progress.tick();
        Ok(frame)
    };

    if !ctrl.threading.parallel {
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let mut out = Vec::with_capacity(count);
        for f in 0..count {
            out.push(draw(&mut ctx, f)?);
        }
        return Ok(out);
    }

    let pool = build_thread_pool(ctrl.threading.threads)?;
    let rendered = pool.install(|| {
        (0..count)
            .into_par_iter()
            .map_init(|| vello_cpu::RenderContext::new(w, h), |ctx, f| draw(ctx, f))
            .collect::<Vec<_>>()
    });

    let mut out = Vec::with_capacity(rendered.len());
    for item in rendered {
        out.push(item?);
    }
    Ok(out)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn draw_ball(ctx: &mut vello_cpu::RenderContext, layers: &StaticLayers, at: Point, opacity: f32) {
    let s = f64::from(layers.ball_px);
    ctx.set_transform(affine_to_cpu(Affine::translate((
        at.x - s / 2.0,
        at.y - s / 2.0,
    ))));
    ctx.set_paint(layers.ball.clone());
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, s, s));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn ball_point(layers: &StaticLayers, pose: &FramePose) -> Point {
    let r = f64::from(layers.wheel_px) / 2.0;
    polar(layers.center, r * pose.ball_radius, pose.ball_angle)
}

fn draw_frame(
    ctx: &mut vello_cpu::RenderContext,
    layers: &StaticLayers,
    anim: &AnimationPlan,
    spin: &SpinPlan,
    frame: usize,
) -> SpinResult<FrameRGBA> {
    let pose = frame_pose(anim, spin, frame)?;
    let canvas = layers.canvas;
    let d = f64::from(layers.wheel_px);
    let c = layers.center;

    ctx.reset();
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let wheel_xf =
        Affine::rotate_about(pose.wheel_angle, c) * Affine::translate((c.x - d / 2.0, c.y - d / 2.0));
    ctx.set_transform(affine_to_cpu(wheel_xf));
    ctx.set_paint(layers.wheel.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, d, d));
    ctx.set_paint(layers.numerals.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, d, d));

    draw_ball(ctx, layers, ball_point(layers, &pose), 1.0);

    let trail = anim.motion_blur_trail();
    if pose.ball_radius > radii::BALL_REST {
        for k in 1..=usize::from(trail) {
            let Some(prev) = frame.checked_sub(k) else {
                break;
            };
            let ghost = frame_pose(anim, spin, prev)?;
            let opacity = 0.45 * 0.6f32.powi(k as i32 - 1);
            draw_ball(ctx, layers, ball_point(layers, &ghost), opacity);
        }
    }

    ctx.flush();
    // Canvas edges are validated against MAX_CANVAS_EDGE, well inside u16.
    let mut pixmap = vello_cpu::Pixmap::new(canvas.width as u16, canvas.height as u16);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = layers.background.clone();
    over_in_place(&mut data, pixmap.data_as_u8_slice(), 1.0)?;
    if let Some(spec) = &layers.specular {
        screen_in_place(&mut data, spec, 1.0)?;
    }
    if let Some(mask) = &layers.vignette {
        vignette_in_place(&mut data, mask)?;
    }
    if pose.glow > 0.0 {
        apply_winner_glow(&mut data, layers, pose.wheel_angle, pose.glow as f32);
    }
    if pose.popup > 0.0
        && let Some(popup) = &layers.popup
    {
        over_in_place(&mut data, popup, pose.popup as f32)?;
    }

    Ok(FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
        premultiplied: true,
    })
}

// Inverse-rotates every screen pixel near the pocket bands into wheel-local space and samples the
// hit mask there.
fn apply_winner_glow(data: &mut [u8], layers: &StaticLayers, wheel_angle: f64, amount: f32) {
    let canvas = layers.canvas;
    let mask = &layers.hit_mask;
    let c = layers.center;
    let half = f64::from(layers.wheel_px) / 2.0;
    let reach = half * radii::TRACK_INNER;
    let (sin, cos) = wheel_angle.sin_cos();

    let y0 = (c.y - reach).floor().max(0.0) as u32;
    let y1 = ((c.y + reach).ceil() as u32).min(canvas.height);
    let x0 = (c.x - reach).floor().max(0.0) as u32;
    let x1 = ((c.x + reach).ceil() as u32).min(canvas.width);
    for y in y0..y1 {
        let dy = f64::from(y) + 0.5 - c.y;
        for x in x0..x1 {
            let dx = f64::from(x) + 0.5 - c.x;
            let lx = dx * cos + dy * sin + half;
            let ly = -dx * sin + dy * cos + half;
            if lx < 0.0 || ly < 0.0 {
                continue;
            }
            let m = mask.pixel(lx as u32, ly as u32);
            if m[3] != 255 || m[0] != layers.winning_index {
                continue;
            }
            let i = ((y as usize) * (canvas.width as usize) + (x as usize)) * 4;
            let out = glow(
                [data[i], data[i + 1], data[i + 2], data[i + 3]],
                GLOW_COLOR,
                amount * 0.6,
            );
            data[i..i + 4].copy_from_slice(&out);
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> SpinResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpinError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SpinError::generation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
