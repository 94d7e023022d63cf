use super::*;

const ALL: [Ease; 6] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::OutCubic,
    Ease::OutQuart,
    Ease::InOutCubic,
];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert_eq!(e.apply(1.0), 1.0, "{e:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutQuart.apply(-3.0), 0.0);
    assert_eq!(Ease::OutQuart.apply(7.0), 1.0);
}

#[test]
fn out_curves_are_strictly_increasing() {
    for e in [Ease::OutQuad, Ease::OutCubic, Ease::OutQuart] {
        let mut prev = e.apply(0.0);
        for i in 1..=100 {
            let v = e.apply(i as f64 / 100.0);
            assert!(v > prev, "{e:?} not increasing at step {i}");
            prev = v;
        }
    }
}

#[test]
fn quartic_front_loads_more_than_cubic() {
    assert!(Ease::OutQuart.apply(0.3) > Ease::OutCubic.apply(0.3));
}

#[test]
fn integral_matches_numeric_area() {
    for e in ALL {
        for end in [0.25, 0.5, 0.8, 1.0] {
            let steps = 4_000;
            let h = end / steps as f64;
            let area: f64 = (0..steps).map(|i| e.apply((i as f64 + 0.5) * h) * h).sum();
            assert!((e.integral(end) - area).abs() < 1e-6, "{e:?} up to {end}");
        }
        assert_eq!(e.integral(0.0), 0.0, "{e:?}");
    }
    assert!((Ease::OutCubic.integral(1.0) - 0.75).abs() < 1e-12);
    assert!((Ease::InOutCubic.integral(1.0) - 0.5).abs() < 1e-12);
}
