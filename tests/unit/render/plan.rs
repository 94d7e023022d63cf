use super::*;

fn plan(duration_ms: u64, fps: Option<f64>) -> AnimationPlan {
    AnimationPlan::new(PocketLabel::Zero, duration_ms, fps, &TimingLimits::default())
}

#[test]
fn fps_tiers_follow_duration() {
    assert_eq!(fps_for_duration(2_000), 30.0);
    assert_eq!(fps_for_duration(3_000), 30.0);
    assert_eq!(fps_for_duration(5_000), 24.0);
    assert_eq!(fps_for_duration(8_000), 20.0);
    assert_eq!(fps_for_duration(12_000), 15.0);
}

#[test]
fn frame_count_is_ceil_of_duration_times_fps() {
    assert_eq!(plan(5_000, Some(30.0)).frame_count(), 150);
    assert_eq!(plan(1_000, Some(12.5)).frame_count(), 13);
    assert_eq!(plan(5_000, None).frame_count(), 120);
}

#[test]
fn timing_is_clamped_before_frame_arithmetic() {
    let p = plan(1_000_000, Some(1_000.0));
    assert_eq!(p.duration_ms, 20_000);
    assert_eq!(p.fps, 50.0);
    let p = plan(10, Some(f64::NAN));
    assert_eq!(p.duration_ms, 500);
    assert_eq!(p.fps, 30.0);
    let p = plan(5_000, Some(1.0));
    assert_eq!(p.fps, 8.0);
}

#[test]
fn empty_phase_sequence_is_rejected() {
    let mut p = plan(5_000, None);
    p.phases.clear();
    assert!(p.validate().unwrap_err().is_validation());

    let mut p = plan(5_000, None);
    p.phases[1].weight = 0.0;
    assert!(p.validate().is_err());

    let p = plan(5_000, None).with_effects(vec![Effect::MotionBlur { trail: 200 }]);
    assert!(p.validate().is_err());
    assert!(plan(5_000, None).validate().is_ok());
}

#[test]
fn travel_fraction_is_monotonic_and_spans_zero_to_one() {
    let p = plan(5_000, None);
    assert_eq!(p.travel_fraction(0.0), 0.0);
    assert!((p.travel_fraction(1.0) - 1.0).abs() < 1e-12);
    let mut prev = 0.0;
    for i in 1..=1000 {
        let f = p.travel_fraction(i as f64 / 1000.0);
        assert!(f > prev, "not strictly increasing at {i}");
        prev = f;
    }
}

#[test]
fn wheel_speed_never_rises_after_spin_up() {
    let p = plan(5_000, Some(30.0));
    let n = p.frame_count();
    let at = |f: usize| p.travel_fraction(f as f64 / (n - 1) as f64);
    let deltas: Vec<f64> = (0..n - 1).map(|f| at(f + 1) - at(f)).collect();
    let spin_up_end = p.phases[0].weight / p.phases.iter().map(|s| s.weight).sum::<f64>();

    for (f, w) in deltas.windows(2).enumerate() {
        let start = f as f64 / (n - 1) as f64;
        if start >= spin_up_end {
            assert!(w[1] <= w[0] + 1e-12, "wheel sped up after frame {}", f + 1);
        }
        if f >= 1 {
            assert!(w[1] <= 2.0 * w[0] + 1e-12, "speed jump after frame {}", f + 1);
        }
    }
}

#[test]
fn phase_speed_levels_chain() {
    let phases = AnimationPlan::default_phases();
    for w in phases.windows(2) {
        assert_eq!(w[0].phase.speed_levels().1, w[1].phase.speed_levels().0);
    }
    assert_eq!(phases[0].phase.speed_levels().0, 0.0);
    assert_eq!(phases[phases.len() - 1].phase.speed_levels().1, 0.0);
}

#[test]
fn phase_at_walks_the_sequence() {
    let p = plan(5_000, None);
    assert_eq!(p.phase_at(0.0).map(|x| x.0), Some(Phase::SpinUp));
    assert_eq!(p.phase_at(0.5).map(|x| x.0), Some(Phase::Decelerate));
    let (phase, local) = p.phase_at(1.0).unwrap();
    assert_eq!(phase, Phase::Stop);
    assert!((local - 1.0).abs() < 1e-9);
}

#[test]
fn effect_queries() {
    let p = plan(5_000, None).with_effects(vec![Effect::Vignette, Effect::MotionBlur { trail: 3 }]);
    assert!(p.has_effect(Effect::Vignette));
    assert!(p.has_effect(Effect::MotionBlur { trail: 0 }));
    assert!(!p.has_effect(Effect::WinnerGlow));
    assert_eq!(p.motion_blur_trail(), 3);
}

#[test]
fn effects_serialize_with_kind_tag() {
    let json = serde_json::to_value(Effect::MotionBlur { trail: 2 }).unwrap();
    assert_eq!(json["kind"], "motion_blur");
    let back: Effect = serde_json::from_str(r#"{"kind":"winner_glow"}"#).unwrap();
    assert_eq!(back, Effect::WinnerGlow);
}
