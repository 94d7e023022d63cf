use std::f64::consts::TAU;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Normalize an angle in radians into `[0, 2π)`.
pub fn wrap_angle(a: f64) -> f64 {
    let w = a.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs.
    if w >= TAU { 0.0 } else { w }
}

/// Shortest unsigned distance between two angles on the circle.
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = wrap_angle(a - b);
    d.min(TAU - d)
}

pub(crate) fn smoothstep(a: f64, b: f64, x: f64) -> f64 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

pub(crate) fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
