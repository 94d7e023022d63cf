use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over with an extra opacity multiplier on `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Screen blend on premultiplied channels: `s + d − s·d`, with `src` scaled by `opacity`.
pub fn screen(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let mut out = [0u8; 4];
    for i in 0..4 {
        let s = u16::from(mul_div255_u8(u16::from(src[i]), op));
        let d = u16::from(dst[i]);
        let sd = u16::from(mul_div255_u8(s, d));
        out[i] = (s + d - sd).min(255) as u8;
    }
    out
}

fn check_pair(dst: &[u8], src: &[u8], what: &str) -> SpinResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SpinError::generation(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// [`over`] applied pixel-wise over whole buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SpinResult<()> {
    check_pair(dst, src, "over_in_place")?;
    if opacity <= 0.0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// [`screen`] applied pixel-wise over whole buffers.
pub fn screen_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SpinResult<()> {
    check_pair(dst, src, "screen_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = screen([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply color channels by a one-byte-per-pixel mask (`255` leaves the pixel untouched).
pub fn vignette_in_place(dst: &mut [u8], mask: &[u8]) -> SpinResult<()> {
    if dst.len() != mask.len() * 4 {
        return Err(SpinError::generation(
            "vignette mask must have one byte per pixel",
        ));
    }
    for (d, &m) in dst.chunks_exact_mut(4).zip(mask) {
        if m == 255 {
            continue;
        }
        for c in &mut d[..3] {
            *c = mul_div255_u8(u16::from(*c), u16::from(m));
        }
    }
    Ok(())
}

/// Screen an opaque glow color onto one pixel with strength `amount`.
pub fn glow(dst: PremulRgba8, color: [u8; 3], amount: f32) -> PremulRgba8 {
    screen(dst, [color[0], color[1], color[2], 255], amount)
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
