use crate::encode::frames::{PreparedFrames, frame_delay_ms};
use crate::foundation::error::{SpinError, SpinResult};

fn apng_delay(duration_ms: u64, frames: usize) -> (u16, u16) {
    let (numer, denom) = frame_delay_ms(duration_ms, frames);
    match (u16::try_from(numer), u16::try_from(denom)) {
        (Ok(n), Ok(d)) => (n, d),
        _ => {
            let per = (duration_ms as f64 / frames.max(1) as f64).round();
            (per.clamp(1.0, f64::from(u16::MAX)) as u16, 1000)
        }
    }
}

fn png_err(e: png::EncodingError) -> SpinError {
    SpinError::encoding(format!("apng: {e}"))
}

/// Encode the frames at `keep` as a lossless, infinitely looping APNG.
pub fn encode_apng(frames: &PreparedFrames, keep: &[usize]) -> SpinResult<Vec<u8>> {
    if keep.is_empty() {
        return Err(SpinError::encoding("apng: no frames selected"));
    }
    let count = u32::try_from(keep.len())
        .map_err(|_| SpinError::encoding("apng: too many frames"))?;
    let (numer, denom) = apng_delay(frames.duration_ms, keep.len());

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, frames.width, frames.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_animated(count, 0).map_err(png_err)?;
        encoder.set_frame_delay(numer, denom).map_err(png_err)?;
        let mut writer = encoder.write_header().map_err(png_err)?;
        for &i in keep {
            let src = frames
                .frames
                .get(i)
                .ok_or_else(|| SpinError::encoding(format!("apng: frame index {i} out of range")))?;
            writer.write_image_data(src).map_err(png_err)?;
        }
        writer.finish().map_err(png_err)?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/apng.rs"]
mod tests;
