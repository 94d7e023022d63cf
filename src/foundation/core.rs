use crate::foundation::error::{SpinError, SpinResult};

pub use kurbo::{Affine, Point, Vec2};

/// Largest accepted frame edge in pixels. `vello_cpu` surfaces are addressed with `u16`.
pub const MAX_CANVAS_EDGE: u32 = 4096;

/// Output frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with both edges in `1..=MAX_CANVAS_EDGE`.
    pub fn new(width: u32, height: u32) -> SpinResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Square canvas helper.
    pub fn square(edge: u32) -> SpinResult<Self> {
        Self::new(edge, edge)
    }

    /// Check edge bounds.
    pub fn validate(self) -> SpinResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpinError::validation("canvas width/height must be non-zero"));
        }
        if self.width > MAX_CANVAS_EDGE || self.height > MAX_CANVAS_EDGE {
            return Err(SpinError::validation(format!(
                "canvas {}x{} exceeds {MAX_CANVAS_EDGE}x{MAX_CANVAS_EDGE}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Bytes of one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Center point in pixel space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Shorter edge, used to size the wheel.
    pub fn min_edge(self) -> u32 {
        self.width.min(self.height)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Opaque color from straight RGB.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channel array in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbb` form of the color (alpha dropped), for SVG fills.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
