use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::frames::{PreparedFrames, frame_delay_ms, posterize_in_place};
use crate::foundation::error::{SpinError, SpinResult};

/// Lowest accepted quality.
pub const MIN_QUALITY: u8 = 1;
/// Highest accepted quality.
pub const MAX_QUALITY: u8 = 100;

/// Bits kept per color channel for a quality level.
pub fn posterize_bits(quality: u8) -> u8 {
    match quality {
        85.. => 8,
        70..=84 => 6,
        50..=69 => 5,
        30..=49 => 4,
        _ => 3,
    }
}

/// NeuQuant sampling speed for a quality level: `1` is slowest and best, `30` fastest.
pub fn quantizer_speed(quality: u8) -> i32 {
    let q = i32::from(quality.clamp(MIN_QUALITY, MAX_QUALITY));
    (1 + (100 - q) / 4).clamp(1, 30)
}

/// Encode the frames at `keep` as an infinitely looping GIF.
///
/// Per-frame delay is stretched so the kept frames still span `frames.duration_ms`.
pub fn encode_gif(frames: &PreparedFrames, keep: &[usize], quality: u8) -> SpinResult<Vec<u8>> {
    if keep.is_empty() {
        return Err(SpinError::encoding("gif: no frames selected"));
    }
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(SpinError::validation(format!(
            "gif quality must be in {MIN_QUALITY}..={MAX_QUALITY}, got {quality}"
        )));
    }
    let bits = posterize_bits(quality);
    let (numer, denom) = frame_delay_ms(frames.duration_ms, keep.len());
    let delay = Delay::from_numer_denom_ms(numer, denom);

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, quantizer_speed(quality));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| SpinError::encoding(format!("gif: {e}")))?;
        for &i in keep {
            let src = frames
                .frames
                .get(i)
                .ok_or_else(|| SpinError::encoding(format!("gif: frame index {i} out of range")))?;
            let mut rgba = src.clone();
            posterize_in_place(&mut rgba, bits);
            let buf = RgbaImage::from_raw(frames.width, frames.height, rgba)
                .ok_or_else(|| SpinError::encoding("gif: frame buffer size mismatch"))?;
            encoder
                .encode_frame(Frame::from_parts(buf, 0, 0, delay))
                .map_err(|e| SpinError::encoding(format!("gif: {e}")))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
