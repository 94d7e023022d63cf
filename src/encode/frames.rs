use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Background color used when flattening translucent pixels.
pub const FLATTEN_BG: [u8; 3] = [0, 0, 0];

/// Opaque, straight-alpha frames ready for an encoder, plus their timing.
#[derive(Clone, Debug)]
pub struct PreparedFrames {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Opaque RGBA8 frames in playback order.
    pub frames: Vec<Vec<u8>>,
    /// Total animation duration after clamping.
    pub duration_ms: u64,
}

impl PreparedFrames {
    /// Flatten every frame over [`FLATTEN_BG`]. Rejects empty or ragged sequences.
    pub fn from_frames(frames: &[FrameRGBA], duration_ms: u64) -> SpinResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| SpinError::validation("cannot encode an empty frame sequence"))?;
        let (width, height) = (first.width, first.height);
        let expected = (width as usize) * (height as usize) * 4;
        let mut out = Vec::with_capacity(frames.len());
        for (i, f) in frames.iter().enumerate() {
            if f.width != width || f.height != height || f.data.len() != expected {
                return Err(SpinError::validation(format!(
                    "frame {i} is {}x{} ({} bytes), expected {width}x{height}",
                    f.width,
                    f.height,
                    f.data.len()
                )));
            }
            let mut opaque = vec![0u8; expected];
            if f.premultiplied {
                flatten_premul_over_bg_to_opaque_rgba8(&mut opaque, &f.data, FLATTEN_BG)?;
            } else {
                flatten_straight_over_bg_to_opaque_rgba8(&mut opaque, &f.data, FLATTEN_BG)?;
            }
            out.push(opaque);
        }
        Ok(Self {
            width,
            height,
            frames: out,
            duration_ms,
        })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false` for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Indices of the frames kept when reducing to `keep_percent` of `n`, spread evenly and always
/// starting with frame `0`. The last frame is always kept so the landing stays visible.
pub fn subsample_indices(n: usize, keep_percent: u8) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let keep = ((n as f64 * f64::from(keep_percent.min(100)) / 100.0).round() as usize).clamp(1, n);
    if keep == n {
        return (0..n).collect();
    }
    if keep == 1 {
        return vec![n - 1];
    }
    (0..keep)
        .map(|i| (i * (n - 1) + (keep - 1) / 2) / (keep - 1))
        .collect()
}

/// Per-frame delay as a `(numerator, denominator)` millisecond ratio that keeps the total
/// duration constant for `frames` frames.
pub fn frame_delay_ms(duration_ms: u64, frames: usize) -> (u32, u32) {
    let frames = frames.max(1) as u64;
    let g = gcd(duration_ms.max(1), frames);
    let (n, d) = (duration_ms.max(1) / g, frames / g);
    (
        u32::try_from(n).unwrap_or(u32::MAX),
        u32::try_from(d).unwrap_or(u32::MAX).max(1),
    )
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Keep the top `bits` bits of each color channel, rounding to the nearest level.
pub fn posterize_in_place(rgba: &mut [u8], bits: u8) {
    if bits >= 8 || bits == 0 {
        return;
    }
    let levels = (1u16 << bits) - 1;
    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let q = (u16::from(*c) * levels + 127) / 255;
            *c = ((q * 255 + levels / 2) / levels) as u8;
        }
    }
}

/// Flatten premultiplied RGBA8 over an opaque background.
pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgb: [u8; 3],
) -> SpinResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(SpinError::encoding(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(u16::from(bg_rgb[c]), inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn flatten_straight_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    bg_rgb: [u8; 3],
) -> SpinResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SpinError::encoding(
            "flatten_straight_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(u16::from(bg_rgb[c]), inv))
                .min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
