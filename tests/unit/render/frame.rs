use std::sync::Arc;

use super::*;
use crate::assets::cache::AssetCache;
use crate::diagnostics::CollectingSink;
use crate::physics::spin::{SpinParams, compute_spin_plan};
use crate::render::plan::TimingLimits;
use crate::wheel::layout::{LayoutKind, PocketLabel};

fn spin(outcome: &str, fps: f64, duration_secs: f64) -> SpinPlan {
    let params = SpinParams {
        fps,
        duration_secs,
        ..SpinParams::default()
    };
    compute_spin_plan(outcome, LayoutKind::European, &params, &NullSink).unwrap()
}

fn anim(label: PocketLabel, duration_ms: u64, fps: f64) -> AnimationPlan {
    AnimationPlan::new(label, duration_ms, Some(fps), &TimingLimits::default())
}

fn assets(canvas: Canvas) -> RenderAssets {
    let cache = AssetCache::new().with_fontdb(Arc::new(usvg::fontdb::Database::new()));
    RenderAssets::from_cache(&cache, LayoutKind::European, wheel_diameter_for(canvas)).unwrap()
}

fn sequential() -> RenderThreading {
    RenderThreading {
        parallel: false,
        threads: None,
    }
}

#[test]
fn accurate_pose_reproduces_plan_angles_exactly() {
    let s = spin("17", 30.0, 5.0);
    let a = anim(PocketLabel::Number(17), 5_000, 30.0);
    assert_eq!(a.frame_count(), s.total_frames());
    for f in 0..a.frame_count() {
        let pose = frame_pose(&a, &s, f).unwrap();
        assert_eq!(pose.wheel_angle.to_bits(), s.wheel_angles()[f].to_bits());
        assert_eq!(pose.ball_angle.to_bits(), s.ball_angles()[f].to_bits());
    }
    assert!(frame_pose(&a, &s, a.frame_count()).is_err());
}

#[test]
fn accurate_mode_rejects_frame_count_mismatch() {
    let s = spin("17", 30.0, 5.0);
    let a = anim(PocketLabel::Number(17), 5_000, 24.0);
    assert!(check_alignment(&a, &s).unwrap_err().is_validation());
    assert!(frame_pose(&a, &s, 0).is_err());

    let wrong_target = anim(PocketLabel::Number(3), 5_000, 30.0);
    assert!(check_alignment(&wrong_target, &s).is_err());
}

#[test]
fn stylized_mode_lands_on_the_plan() {
    let s = spin("8", 30.0, 5.0);
    let a = anim(PocketLabel::Number(8), 4_000, 24.0).with_mode(RenderMode::Stylized);
    check_alignment(&a, &s).unwrap();
    let last = frame_pose(&a, &s, a.frame_count() - 1).unwrap();
    let plan_last = s.total_frames() - 1;
    assert!(crate::foundation::math::circular_distance(last.wheel_angle, s.wheel_angles()[plan_last]) < 1e-9);
    let rel = wrap_angle(last.ball_angle - last.wheel_angle);
    let layout = LayoutKind::European.layout();
    assert_eq!(layout.pocket_at_angle(rel), s.winning_pocket_index());
}

#[test]
fn ball_settles_and_overlays_appear_late() {
    let s = spin("0", 30.0, 5.0);
    let a = anim(PocketLabel::Zero, 5_000, 30.0);
    let n = a.frame_count();
    let first = frame_pose(&a, &s, 0).unwrap();
    assert_eq!(first.ball_radius, radii::BALL_TRACK);
    assert_eq!(first.glow, 0.0);
    assert_eq!(first.popup, 0.0);

    let mid = frame_pose(&a, &s, n / 2).unwrap();
    assert_eq!(mid.glow, 0.0);

    let last = frame_pose(&a, &s, n - 1).unwrap();
    assert_eq!(last.ball_radius, radii::BALL_REST);
    assert!((last.glow - 1.0).abs() < 1e-9);
    assert!(last.popup > 0.99);

    let late = frame_pose(&a, &s, (n as f64 * 0.75) as usize).unwrap();
    assert!(late.glow > 0.0);
    assert_eq!(late.popup, 0.0);

    let plain = a.clone().with_effects(vec![]);
    let last = frame_pose(&plain, &s, n - 1).unwrap();
    assert_eq!((last.glow, last.popup), (0.0, 0.0));
}

#[test]
fn ball_spirals_in_gradually_with_default_timing() {
    let cfg = crate::config::SpinConfig::default();
    let a = AnimationPlan::new(
        PocketLabel::Number(17),
        cfg.render.duration_ms,
        cfg.render.fps_hint,
        &cfg.encode.timing,
    );
    let params = cfg.physics.to_params(a.fps, a.duration_secs());
    let s = compute_spin_plan("17", LayoutKind::European, &params, &NullSink).unwrap();
    let n = a.frame_count();
    // Default physics keeps the ball above the drop threshold for the whole clip.
    assert_eq!(s.drop_frame(), n - 1);

    let r: Vec<f64> = (0..n)
        .map(|f| frame_pose(&a, &s, f).unwrap().ball_radius)
        .collect();
    assert_eq!(r[0], radii::BALL_TRACK);
    assert_eq!(r[n - 1], radii::BALL_REST);
    for (f, w) in r.windows(2).enumerate() {
        assert!(w[1] <= w[0] + 1e-12, "ball moved outward at frame {}", f + 1);
    }
    let span = radii::BALL_TRACK - radii::BALL_REST;
    let max_step = r.windows(2).map(|w| w[0] - w[1]).fold(0.0, f64::max);
    assert!(max_step < 0.1 * span, "largest per-frame drop {max_step}");
    let in_flight = r
        .iter()
        .filter(|&&x| x < radii::BALL_TRACK && x > radii::BALL_REST)
        .count();
    assert!(in_flight >= n / 5, "only {in_flight} of {n} frames between track and pocket");
    assert!(r[n - 2] < radii::BALL_TRACK - 0.5 * span);
}

#[test]
fn renders_opaque_frames_and_reports_progress() {
    let canvas = Canvas::square(48).unwrap();
    let s = spin("17", 8.0, 0.5);
    let a = anim(PocketLabel::Number(17), 500, 8.0);
    let bundle = assets(canvas);
    let sink = CollectingSink::new();
    let threading = sequential();
    let frames = render_frames(
        &a,
        &s,
        &bundle,
        canvas,
        RenderControl {
            threading: &threading,
            cancel: None,
            sink: &sink,
        },
    )
    .unwrap();
    assert_eq!(frames.len(), 4);
    for f in &frames {
        assert_eq!((f.width, f.height), (48, 48));
        assert_eq!(f.data.len(), 48 * 48 * 4);
        assert!(f.premultiplied);
        assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));
    }
    assert_eq!(sink.count_kind("render_progress"), 4);
}

#[test]
fn parallel_and_sequential_renders_match() {
    let canvas = Canvas::square(40).unwrap();
    let s = spin("5", 8.0, 0.5);
    let a = anim(PocketLabel::Number(5), 500, 8.0);
    let bundle = assets(canvas);
    let seq_threading = sequential();
    let par_threading = RenderThreading {
        parallel: true,
        threads: Some(2),
    };
    let seq = render_frames(
        &a,
        &s,
        &bundle,
        canvas,
        RenderControl {
            threading: &seq_threading,
            ..RenderControl::default()
        },
    )
    .unwrap();
    let par = render_frames(
        &a,
        &s,
        &bundle,
        canvas,
        RenderControl {
            threading: &par_threading,
            ..RenderControl::default()
        },
    )
    .unwrap();
    assert_eq!(seq.len(), par.len());
    for (x, y) in seq.iter().zip(&par) {
        assert_eq!(x.data, y.data);
    }
}

#[test]
fn winner_glow_brightens_the_winning_pocket() {
    let canvas = Canvas::square(120).unwrap();
    let s = spin("17", 8.0, 0.5);
    let bundle = assets(canvas);
    let threading = sequential();
    let ctrl = RenderControl {
        threading: &threading,
        ..RenderControl::default()
    };
    let with = anim(PocketLabel::Number(17), 500, 8.0).with_effects(vec![Effect::WinnerGlow]);
    let without = with.clone().with_effects(vec![]);
    let lit = render_frames(&with, &s, &bundle, canvas, ctrl).unwrap();
    let dark = render_frames(&without, &s, &bundle, canvas, ctrl).unwrap();

    let last = s.total_frames() - 1;
    let layout = LayoutKind::European.layout();
    let angle = s.wheel_angles()[last] + layout.pocket_center_angle(s.winning_pocket_index());
    let half = f64::from(wheel_diameter_for(canvas)) / 2.0;
    let p = polar(canvas.center(), half * 0.77, angle);
    let i = ((p.y as usize) * 120 + p.x as usize) * 4;
    let sum = |f: &FrameRGBA| -> u32 { f.data[i..i + 3].iter().map(|&v| u32::from(v)).sum() };
    assert!(sum(&lit[last]) > sum(&dark[last]));
    assert_eq!(lit[0].data, dark[0].data);
}

#[test]
fn cancelled_render_returns_no_frames() {
    let canvas = Canvas::square(32).unwrap();
    let s = spin("1", 8.0, 0.5);
    let a = anim(PocketLabel::Number(1), 500, 8.0);
    let bundle = assets(canvas);
    let cancel = AtomicBool::new(true);
    let threading = RenderThreading::default();
    let err = render_frames(
        &a,
        &s,
        &bundle,
        canvas,
        RenderControl {
            threading: &threading,
            cancel: Some(&cancel),
            sink: &NullSink,
        },
    )
    .unwrap_err();
    assert!(matches!(err, SpinError::Cancelled(_)));
}

#[test]
fn mismatched_asset_size_is_rejected_before_drawing() {
    let s = spin("1", 8.0, 0.5);
    let a = anim(PocketLabel::Number(1), 500, 8.0);
    let bundle = assets(Canvas::square(32).unwrap());
    let err = render_frames(
        &a,
        &s,
        &bundle,
        Canvas::square(64).unwrap(),
        RenderControl::default(),
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(1)).is_ok());
}
