use kurbo::Point;

use crate::foundation::math::wrap_angle;

/// Radii of the painted wheel bands, as fractions of the wheel radius.
///
/// Outer to inner: wooden rim, ball track, numeral band, pocket bins, cone.
pub mod radii {
    /// Inner edge of the wooden rim.
    pub const RIM_INNER: f64 = 0.93;
    /// Inner edge of the ball track; outer edge of the numeral band.
    pub const TRACK_INNER: f64 = 0.84;
    /// Inner edge of the numeral band; outer edge of the pocket bins.
    pub const NUMERAL_INNER: f64 = 0.70;
    /// Inner edge of the pocket bins.
    pub const POCKET_INNER: f64 = 0.56;
    /// Baseline radius of the numeral text.
    pub const NUMERAL_TEXT: f64 = 0.77;
    /// Ball center while it circles the track.
    pub const BALL_TRACK: f64 = 0.885;
    /// Ball center once it rests in a pocket bin.
    pub const BALL_REST: f64 = 0.63;
    /// Central turret.
    pub const TURRET: f64 = 0.08;
}

/// Screen point at `radius` from `center`, `angle` radians clockwise from 12 o'clock.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        center.x + radius * angle.sin(),
        center.y - radius * angle.cos(),
    )
}

/// Inverse of [`polar`]: clockwise angle from 12 o'clock of the offset `(dx, dy)`, in `[0, 2π)`.
pub fn angle_of(dx: f64, dy: f64) -> f64 {
    wrap_angle(dx.atan2(-dy))
}

/// Ball radius on screen as a fraction of the wheel radius, interpolating from the track to the
/// resting bin as `drop` goes from `0` to `1`.
pub fn ball_radius_fraction(drop: f64) -> f64 {
    let t = drop.clamp(0.0, 1.0);
    radii::BALL_TRACK * (1.0 - t) + radii::BALL_REST * t
}

#[cfg(test)]
#[path = "../../tests/unit/wheel/geometry.rs"]
mod tests;
