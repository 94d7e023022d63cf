use super::*;
use crate::diagnostics::{CollectingSink, NullSink};

fn scenario_a() -> SpinParams {
    SpinParams {
        fps: 30.0,
        duration_secs: 5.0,
        wheel_rpm0: 10.0,
        ball_rpm0: 40.0,
        wheel_friction: 0.1,
        ball_friction: 0.2,
        laps: 3,
        ..SpinParams::default()
    }
}

#[test]
fn scenario_a_smaller_layout_zero() {
    let plan = compute_spin_plan("0", LayoutKind::European, &scenario_a(), &NullSink).unwrap();
    assert_eq!(plan.total_frames(), 150);
    assert_eq!(plan.wheel_angles().len(), 150);
    assert_eq!(plan.ball_angles().len(), 150);
    assert_eq!(plan.winning_pocket_index(), 0);
    assert!(verify_spin_plan(&plan));
    assert_eq!(plan.landing_pocket(), 0);
}

#[test]
fn every_outcome_on_both_layouts_verifies() {
    for kind in [LayoutKind::European, LayoutKind::American] {
        for label in kind.layout().labels() {
            let outcome = label.to_string();
            let sink = CollectingSink::new();
            let plan = compute_spin_plan(&outcome, kind, &scenario_a(), &sink).unwrap();
            assert!(verify_spin_plan(&plan), "{kind} {outcome}");
            assert_eq!(plan.winning_label(), *label);
            assert_eq!(plan.landing_pocket(), plan.winning_pocket_index());
            assert_eq!(sink.count_kind("precision_deviation"), 0);
        }
    }
}

#[test]
fn identical_inputs_produce_bit_identical_angles() {
    let a = compute_spin_plan("17", LayoutKind::American, &scenario_a(), &NullSink).unwrap();
    let b = compute_spin_plan("17", LayoutKind::American, &scenario_a(), &NullSink).unwrap();
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(a.wheel_angles()), bits(b.wheel_angles()));
    assert_eq!(bits(a.ball_angles()), bits(b.ball_angles()));
}

#[test]
fn final_relative_angle_is_the_pocket_center() {
    let plan = compute_spin_plan("26", LayoutKind::European, &scenario_a(), &NullSink).unwrap();
    let layout = LayoutKind::European.layout();
    let center = layout.pocket_center_angle(plan.winning_pocket_index());
    let rel = plan.ball_relative_angle(plan.total_frames() - 1).unwrap();
    assert!(circular_distance(rel, center) < 1e-9);
}

#[test]
fn angles_are_normalized() {
    let plan = compute_spin_plan("5", LayoutKind::European, &scenario_a(), &NullSink).unwrap();
    for a in plan.wheel_angles().iter().chain(plan.ball_angles()) {
        assert!((0.0..TAU).contains(a));
    }
}

#[test]
fn wheel_position_matches_closed_form() {
    let p = scenario_a();
    let plan = compute_spin_plan("0", LayoutKind::European, &p, &NullSink).unwrap();
    let w0 = rpm_to_rad_per_sec(p.wheel_rpm0);
    for i in [0usize, 1, 42, 149] {
        let t = i as f64 / p.fps;
        let expected = wrap_angle((w0 / p.wheel_friction) * (1.0 - (-p.wheel_friction * t).exp()));
        assert_eq!(plan.wheel_angles()[i], expected);
    }
}

#[test]
fn zero_friction_degenerates_to_linear_motion() {
    assert_eq!(angular_position(2.0, 0.0, 3.0), 6.0);
    assert!((angular_velocity(2.0, 0.5, 0.0) - 2.0).abs() < 1e-12);
    let p = SpinParams {
        wheel_friction: 0.0,
        ball_friction: 0.0,
        ..scenario_a()
    };
    let plan = compute_spin_plan("9", LayoutKind::European, &p, &NullSink).unwrap();
    assert!(verify_spin_plan(&plan));
    assert_eq!(plan.drop_frame(), plan.total_frames() - 1);
}

#[test]
fn drop_frame_solves_threshold_crossing() {
    let p = SpinParams {
        ball_rpm0: 40.0,
        ball_friction: 1.0,
        drop_threshold_rpm: 10.0,
        ..scenario_a()
    };
    let plan = compute_spin_plan("0", LayoutKind::European, &p, &NullSink).unwrap();
    let expected = ((40.0f64 / 10.0).ln() * 30.0).round() as usize;
    assert_eq!(plan.drop_frame(), expected);

    let slow = SpinParams {
        ball_rpm0: 5.0,
        ..p
    };
    let plan = compute_spin_plan("0", LayoutKind::European, &slow, &NullSink).unwrap();
    assert_eq!(plan.drop_frame(), 0);
}

#[test]
fn invalid_inputs_are_rejected() {
    let bad = [
        SpinParams {
            fps: 0.0,
            ..scenario_a()
        },
        SpinParams {
            duration_secs: -1.0,
            ..scenario_a()
        },
        SpinParams {
            wheel_rpm0: f64::NAN,
            ..scenario_a()
        },
        SpinParams {
            ball_friction: f64::INFINITY,
            ..scenario_a()
        },
        SpinParams {
            laps: 1000,
            ..scenario_a()
        },
    ];
    for p in bad {
        let err = compute_spin_plan("0", LayoutKind::European, &p, &NullSink).unwrap_err();
        assert!(err.is_validation(), "{p:?}");
    }
    let err = compute_spin_plan("00", LayoutKind::European, &scenario_a(), &NullSink).unwrap_err();
    assert!(err.is_validation());
    let err = compute_spin_plan("x", LayoutKind::American, &scenario_a(), &NullSink).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn verify_rejects_a_tampered_landing() {
    let mut plan = compute_spin_plan("0", LayoutKind::European, &scenario_a(), &NullSink).unwrap();
    let last = plan.total_frames() - 1;
    plan.ball_angles[last] = wrap_angle(plan.wheel_angles[last] + std::f64::consts::PI);
    assert!(!verify_spin_plan(&plan));
}

#[test]
fn correction_never_moves_the_last_frame_off_center() {
    let wheel = vec![0.1, 0.2, 0.3, 0.4, 0.5];
    let mut ball = vec![1.0, 1.1, 1.2, 1.3, 1.45];
    apply_landing_correction(&wheel, &mut ball, 0.9);
    assert!((ball[4] - 1.4).abs() < 1e-12);
    assert!((ball[3] - (1.3 - 0.05 * 0.75)).abs() < 1e-12);
    assert_eq!(ball[0], 1.0);
}

#[test]
fn single_frame_plan_is_valid() {
    let p = SpinParams {
        fps: 1.0,
        duration_secs: 0.5,
        ..scenario_a()
    };
    let plan = compute_spin_plan("3", LayoutKind::European, &p, &NullSink).unwrap();
    assert_eq!(plan.total_frames(), 1);
    assert!(verify_spin_plan(&plan));
}

#[test]
fn drifted_landing_is_reported_as_precision_deviation() {
    let layout = LayoutKind::European.layout();
    let width = layout.pocket_angular_width();
    let center = layout.pocket_center_angle(5);
    let sink = CollectingSink::new();

    let exact = report_landing_deviation(1.0, 1.0 + center, 5, center, width, &sink);
    assert!(exact < 1e-12);
    assert_eq!(sink.count_kind("precision_deviation"), 0);

    let drift = 0.01 * width;
    let off = report_landing_deviation(1.0, 1.0 + center + drift, 5, center, width, &sink);
    assert!((off - drift).abs() < 1e-12);
    let records = sink.records();
    assert_eq!(records.len(), 1);
    match &records[0] {
        Diagnostic::PrecisionDeviation {
            pocket_index,
            deviation_rad,
            tolerance_rad,
        } => {
            assert_eq!(*pocket_index, 5);
            assert!((deviation_rad - drift).abs() < 1e-12);
            assert!((tolerance_rad - PRECISION_TOLERANCE_FRACTION * width).abs() < 1e-15);
        }
        other => panic!("unexpected record {other:?}"),
    }
}
