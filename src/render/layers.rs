use std::collections::BTreeMap;
use std::sync::Arc;

use kurbo::Point;

use crate::assets::cache::{AssetCache, AssetKey, AssetKind, RasterImage};
use crate::assets::svg_raster::{parse_svg_str, rasterize_svg_to_premul_rgba8};
use crate::foundation::core::Canvas;
use crate::foundation::error::{SpinError, SpinResult};
use crate::foundation::math::{smoothstep, unit_to_u8};
use crate::render::plan::{AnimationPlan, Effect};
use crate::wheel::layout::LayoutKind;

/// Wheel diameter drawn on a canvas: 92 % of the shorter edge, at least 8 px.
pub fn wheel_diameter_for(canvas: Canvas) -> u32 {
    ((f64::from(canvas.min_edge()) * 0.92).round() as u32).max(8)
}

/// Complete set of cached layers for one layout and wheel size.
#[derive(Clone, Debug)]
pub struct RenderAssets {
    layout: LayoutKind,
    wheel_px: u32,
    layers: BTreeMap<AssetKind, Arc<RasterImage>>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl RenderAssets {
    /// Wrap an explicit kind→raster mapping. Rejects missing kinds and mis-sized rasters.
    pub fn new(
        layout: LayoutKind,
        wheel_px: u32,
        layers: BTreeMap<AssetKind, Arc<RasterImage>>,
    ) -> SpinResult<Self> {
        let out = Self {
            layout,
            wheel_px,
            layers,
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        };
        out.validate()?;
        Ok(out)
    }

    /// Pull every layer from `cache`, generating what is missing.
    pub fn from_cache(cache: &AssetCache, layout: LayoutKind, wheel_px: u32) -> SpinResult<Self> {
        let mut layers = BTreeMap::new();
        for kind in AssetKind::ALL {
            layers.insert(kind, cache.get(AssetKey::new(kind, layout, wheel_px))?);
        }
        let out = Self {
            layout,
            wheel_px,
            layers,
            fontdb: cache.fontdb().clone(),
        };
        out.validate()?;
        Ok(out)
    }

    /// Fonts used for the result popup.
    pub fn with_fontdb(mut self, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        self.fontdb = fontdb;
        self
    }

    /// Layout the layers depict.
    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    /// Wheel diameter the layers were generated for.
    pub fn wheel_px(&self) -> u32 {
        self.wheel_px
    }

    /// Raster of one kind.
    pub fn get(&self, kind: AssetKind) -> Option<&Arc<RasterImage>> {
        self.layers.get(&kind)
    }

    /// Check that every kind is present and matches its descriptor.
    pub fn validate(&self) -> SpinResult<()> {
        for kind in AssetKind::ALL {
            let img = self.layers.get(&kind).ok_or_else(|| {
                SpinError::validation(format!("asset bundle is missing {kind}"))
            })?;
            let d = kind.descriptor(self.layout, self.wheel_px);
            if (img.width, img.height) != (d.width, d.height) {
                return Err(SpinError::validation(format!(
                    "asset {kind} is {}x{}, expected {}x{}",
                    img.width, img.height, d.width, d.height
                )));
            }
            if img.rgba8_premul.len() as u64 != img.byte_estimate() {
                return Err(SpinError::validation(format!(
                    "asset {kind} pixel buffer has the wrong length"
                )));
            }
        }
        Ok(())
    }

    fn layer(&self, kind: AssetKind) -> SpinResult<&Arc<RasterImage>> {
        self.get(kind)
            .ok_or_else(|| SpinError::validation(format!("asset bundle is missing {kind}")))
    }
}

/// Per-render layers: built once, shared read-only by every frame worker.
pub(crate) struct StaticLayers {
    pub(crate) canvas: Canvas,
    pub(crate) center: Point,
    pub(crate) wheel_px: u32,
    pub(crate) wheel: vello_cpu::Image,
    pub(crate) numerals: vello_cpu::Image,
    pub(crate) ball: vello_cpu::Image,
    pub(crate) ball_px: u32,
    pub(crate) hit_mask: Arc<RasterImage>,
    pub(crate) winning_index: u8,
    pub(crate) background: Vec<u8>,
    pub(crate) specular: Option<Vec<u8>>,
    pub(crate) vignette: Option<Vec<u8>>,
    pub(crate) popup: Option<Vec<u8>>,
}

pub(crate) const GLOW_COLOR: [u8; 3] = [255, 215, 96];

impl StaticLayers {
    pub(crate) fn build(
        anim: &AnimationPlan,
        assets: &RenderAssets,
        canvas: Canvas,
        winning_index: usize,
    ) -> SpinResult<Self> {
        let ball = assets.layer(AssetKind::BallSprite)?;
        let winning_index = u8::try_from(winning_index)
            .map_err(|_| SpinError::validation("winning pocket index exceeds hit-mask range"))?;
        Ok(Self {
            canvas,
            center: canvas.center(),
            wheel_px: assets.wheel_px(),
            wheel: image_paint(assets.layer(AssetKind::WheelBase)?)?,
            numerals: image_paint(assets.layer(AssetKind::NumeralOverlay)?)?,
            ball: image_paint(ball)?,
            ball_px: ball.width,
            hit_mask: assets.layer(AssetKind::HitMask)?.clone(),
            winning_index,
            background: background_gradient(canvas),
            specular: anim
                .has_effect(Effect::Specular)
                .then(|| specular_layer(canvas, assets.wheel_px())),
            vignette: anim
                .has_effect(Effect::Vignette)
                .then(|| vignette_mask(canvas)),
            popup: if anim.has_effect(Effect::ResultPopup) {
                Some(popup_layer(anim, canvas, &assets.fontdb)?)
            } else {
                None
            },
        })
    }
}

fn pixmap_from_raster(raster: &RasterImage) -> SpinResult<vello_cpu::Pixmap> {
    let w: u16 = raster
        .width
        .try_into()
        .map_err(|_| SpinError::generation("pixmap width exceeds u16"))?;
    let h: u16 = raster
        .height
        .try_into()
        .map_err(|_| SpinError::generation("pixmap height exceeds u16"))?;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (raster.width as usize) * (raster.height as usize),
    );
    let mut may_have_opacities = false;
    for px in raster.rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint(raster: &RasterImage) -> SpinResult<vello_cpu::Image> {
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_raster(raster)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn half_diagonal(canvas: Canvas) -> f64 {
    (f64::from(canvas.width)).hypot(f64::from(canvas.height)) / 2.0
}

// Opaque felt-green radial gradient.
fn background_gradient(canvas: Canvas) -> Vec<u8> {
    const INNER: [f64; 3] = [0x1f as f64, 0x66 as f64, 0x3f as f64];
    const OUTER: [f64; 3] = [0x08 as f64, 0x22 as f64, 0x14 as f64];
    let c = canvas.center();
    let hd = half_diagonal(canvas);
    let mut out = Vec::with_capacity(canvas.rgba_len());
    for y in 0..canvas.height {
        let dy = f64::from(y) + 0.5 - c.y;
        for x in 0..canvas.width {
            let dx = f64::from(x) + 0.5 - c.x;
            let t = (dx.hypot(dy) / hd).clamp(0.0, 1.0);
            for ch in 0..3 {
                out.push((INNER[ch] + (OUTER[ch] - INNER[ch]) * t).round() as u8);
            }
            out.push(255);
        }
    }
    out
}

// Two soft white highlights, premultiplied, meant for screen blending.
fn specular_layer(canvas: Canvas, wheel_px: u32) -> Vec<u8> {
    let c = canvas.center();
    let r = f64::from(wheel_px) / 2.0;
    let blobs = [
        (Point::new(c.x - 0.25 * r, c.y - 0.30 * r), 0.55 * r, 0.30),
        (Point::new(c.x + 0.30 * r, c.y + 0.35 * r), 0.30 * r, 0.12),
    ];
    let mut out = Vec::with_capacity(canvas.rgba_len());
    for y in 0..canvas.height {
        let py = f64::from(y) + 0.5;
        for x in 0..canvas.width {
            let px = f64::from(x) + 0.5;
            let mut a = 0.0f64;
            for (p, radius, peak) in blobs {
                let d = (px - p.x).hypot(py - p.y) / radius.max(1.0);
                a += peak * (1.0 - smoothstep(0.0, 1.0, d));
            }
            let v = unit_to_u8(a);
            out.extend_from_slice(&[v, v, v, v]);
        }
    }
    out
}

fn vignette_mask(canvas: Canvas) -> Vec<u8> {
    let c = canvas.center();
    let hd = half_diagonal(canvas);
    let mut out = Vec::with_capacity((canvas.width as usize) * (canvas.height as usize));
    for y in 0..canvas.height {
        let dy = f64::from(y) + 0.5 - c.y;
        for x in 0..canvas.width {
            let dx = f64::from(x) + 0.5 - c.x;
            let t = dx.hypot(dy) / hd;
            out.push(unit_to_u8(1.0 - 0.55 * smoothstep(0.55, 1.0, t)));
        }
    }
    out
}

fn popup_layer(
    anim: &AnimationPlan,
    canvas: Canvas,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> SpinResult<Vec<u8>> {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let label = anim.target_outcome;
    let color = label.color();
    let (bw, bh) = (w * 0.56, h * 0.2);
    let (bx, by) = ((w - bw) / 2.0, (h - bh) / 2.0);
    let font_px = (bh * 0.42).max(4.0);
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{cw}" height="{ch}" viewBox="0 0 {cw} {ch}"><rect x="{bx:.3}" y="{by:.3}" width="{bw:.3}" height="{bh:.3}" rx="{rx:.3}" fill="{fill}" fill-opacity="0.92" stroke="#d4af37" stroke-width="{sw:.3}"/><text x="{tx:.3}" y="{ty:.3}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-weight="bold" font-size="{font_px:.3}" fill="#ffffff">{label} {name}</text></svg>"##,
        cw = canvas.width,
        ch = canvas.height,
        rx = bh * 0.25,
        fill = color.fill().to_hex_rgb(),
        sw = (bh * 0.05).max(1.0),
        tx = w / 2.0,
        ty = h / 2.0,
        name = color.name().to_ascii_uppercase(),
    );
    let tree = parse_svg_str(&svg, fontdb)?;
    rasterize_svg_to_premul_rgba8(&tree, canvas.width, canvas.height)
}

#[cfg(test)]
#[path = "../../tests/unit/render/layers.rs"]
mod tests;
