use std::f64::consts::{FRAC_PI_2, PI};

use super::*;

#[test]
fn polar_measures_clockwise_from_top() {
    let c = Point::new(100.0, 100.0);
    let top = polar(c, 10.0, 0.0);
    assert!((top.x - 100.0).abs() < 1e-9 && (top.y - 90.0).abs() < 1e-9);
    let right = polar(c, 10.0, FRAC_PI_2);
    assert!((right.x - 110.0).abs() < 1e-9 && (right.y - 100.0).abs() < 1e-9);
}

#[test]
fn angle_of_inverts_polar() {
    let c = Point::new(0.0, 0.0);
    for a in [0.0, 0.3, FRAC_PI_2, PI, 4.0, 6.2] {
        let p = polar(c, 5.0, a);
        assert!((angle_of(p.x, p.y) - a).abs() < 1e-9, "{a}");
    }
}

#[test]
fn ball_radius_moves_inward_and_clamps() {
    assert_eq!(ball_radius_fraction(0.0), radii::BALL_TRACK);
    assert_eq!(ball_radius_fraction(2.0), radii::BALL_REST);
    assert!(ball_radius_fraction(0.5) < radii::BALL_TRACK);
}
