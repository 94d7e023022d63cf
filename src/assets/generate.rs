use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::{Arc, OnceLock};

use kurbo::Point;

use crate::assets::cache::{AssetDescriptor, AssetKey, AssetKind, RasterImage};
use crate::assets::svg_raster::{parse_svg_str, rasterize_svg_to_premul_rgba8, system_fontdb};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SpinError, SpinResult};
use crate::wheel::geometry::{angle_of, polar, radii};

/// Everything a generator may look at.
pub(crate) struct GenContext<'a> {
    pub(crate) key: AssetKey,
    pub(crate) descriptor: AssetDescriptor,
    pub(crate) deps: &'a HashMap<AssetKind, Arc<RasterImage>>,
    pub(crate) fonts: &'a OnceLock<Arc<usvg::fontdb::Database>>,
}

impl GenContext<'_> {
    fn dep(&self, kind: AssetKind) -> SpinResult<&RasterImage> {
        self.deps.get(&kind).map(|a| a.as_ref()).ok_or_else(|| {
            SpinError::generation(format!("{} requires {kind} to be resident", self.key))
        })
    }

    fn fontdb(&self) -> &Arc<usvg::fontdb::Database> {
        self.fonts.get_or_init(system_fontdb)
    }

    fn center(&self) -> Point {
        Point::new(
            f64::from(self.descriptor.width) / 2.0,
            f64::from(self.descriptor.height) / 2.0,
        )
    }
}

pub(crate) type GeneratorFn = fn(&GenContext<'_>) -> SpinResult<RasterImage>;

/// Generator of each asset kind. Exhaustive over [`AssetKind`].
pub(crate) fn generator_for(kind: AssetKind) -> GeneratorFn {
    match kind {
        AssetKind::WheelBase => gen_wheel_base,
        AssetKind::NumeralOverlay => gen_numeral_overlay,
        AssetKind::HitMask => gen_hit_mask,
        AssetKind::BallSprite => gen_ball_sprite,
        AssetKind::ColorMap => gen_color_map,
    }
}

const GOLD: &str = "#d4af37";

fn svg_open(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
}

fn rasterize(ctx: &GenContext<'_>, svg: &str) -> SpinResult<RasterImage> {
    let d = ctx.descriptor;
    let tree = parse_svg_str(svg, ctx.fontdb())
        .map_err(|e| SpinError::generation(format!("{}: {e}", ctx.key)))?;
    let px = rasterize_svg_to_premul_rgba8(&tree, d.width, d.height)?;
    RasterImage::new(d.width, d.height, px)
}

// Annular sector between `r0` and `r1` spanning `[a0, a1]` clockwise.
fn sector_path(c: Point, r0: f64, r1: f64, a0: f64, a1: f64) -> String {
    let o0 = polar(c, r1, a0);
    let o1 = polar(c, r1, a1);
    let i1 = polar(c, r0, a1);
    let i0 = polar(c, r0, a0);
    format!(
        "M{:.3} {:.3} A{r1:.3} {r1:.3} 0 0 1 {:.3} {:.3} L{:.3} {:.3} A{r0:.3} {r0:.3} 0 0 0 {:.3} {:.3} Z",
        o0.x, o0.y, o1.x, o1.y, i1.x, i1.y, i0.x, i0.y
    )
}

fn shade(c: [u8; 4], factor: f64) -> Rgba8Premul {
    let s = |v: u8| (f64::from(v) * factor).round().clamp(0.0, 255.0) as u8;
    Rgba8Premul::opaque(s(c[0]), s(c[1]), s(c[2]))
}

fn gen_color_map(ctx: &GenContext<'_>) -> SpinResult<RasterImage> {
    let layout = ctx.key.layout.layout();
    let mut px = Vec::with_capacity(layout.len() * 4);
    for pocket in layout.pockets() {
        px.extend_from_slice(&pocket.color.fill().to_array());
    }
    RasterImage::new(ctx.descriptor.width, 1, px)
}

fn gen_wheel_base(ctx: &GenContext<'_>) -> SpinResult<RasterImage> {
    let colors = ctx.dep(AssetKind::ColorMap)?;
    let n = colors.width as usize;
    if n == 0 {
        return Err(SpinError::generation("color map is empty"));
    }
    let d = ctx.descriptor;
    let c = ctx.center();
    let r = f64::from(d.width.min(d.height)) / 2.0;
    let w = TAU / n as f64;
    let stroke = (r / 100.0).max(0.75);

    let mut svg = svg_open(d.width, d.height);
    svg.push_str(
        r##"<defs>
<radialGradient id="rim" cx="50%" cy="50%" r="50%"><stop offset="0.9" stop-color="#6b3f1d"/><stop offset="1" stop-color="#2e1a0c"/></radialGradient>
<radialGradient id="cone" cx="45%" cy="40%" r="60%"><stop offset="0" stop-color="#d9b870"/><stop offset="1" stop-color="#6b4a1f"/></radialGradient>
</defs>"##,
    );
    svg.push_str(&format!(
        r#"<circle cx="{:.3}" cy="{:.3}" r="{r:.3}" fill="url(#rim)"/>"#,
        c.x, c.y
    ));
    svg.push_str(&format!(
        r##"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="#8a5a2b"/>"##,
        c.x,
        c.y,
        r * radii::RIM_INNER
    ));

    for i in 0..n {
        let fill = colors.pixel(i as u32, 0);
        let a0 = i as f64 * w;
        let a1 = a0 + w;
        svg.push_str(&format!(
            r#"<path d="{}" fill="{}"/>"#,
            sector_path(c, r * radii::NUMERAL_INNER, r * radii::TRACK_INNER, a0, a1),
            shade(fill, 1.0).to_hex_rgb()
        ));
        svg.push_str(&format!(
            r#"<path d="{}" fill="{}"/>"#,
            sector_path(c, r * radii::POCKET_INNER, r * radii::NUMERAL_INNER, a0, a1),
            shade(fill, 0.72).to_hex_rgb()
        ));
    }

    for i in 0..n {
        let a = i as f64 * w;
        let p0 = polar(c, r * radii::POCKET_INNER, a);
        let p1 = polar(c, r * radii::TRACK_INNER, a);
        svg.push_str(&format!(
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{GOLD}" stroke-width="{stroke:.3}"/>"#,
            p0.x, p0.y, p1.x, p1.y
        ));
    }
    for band in [radii::TRACK_INNER, radii::NUMERAL_INNER] {
        svg.push_str(&format!(
            r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="none" stroke="{GOLD}" stroke-width="{stroke:.3}"/>"#,
            c.x,
            c.y,
            r * band
        ));
    }
    svg.push_str(&format!(
        r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="url(#cone)"/>"#,
        c.x,
        c.y,
        r * radii::POCKET_INNER
    ));
    svg.push_str(&format!(
        r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="{GOLD}"/>"#,
        c.x,
        c.y,
        r * radii::TURRET
    ));
    svg.push_str("</svg>");

    rasterize(ctx, &svg)
}

fn gen_numeral_overlay(ctx: &GenContext<'_>) -> SpinResult<RasterImage> {
    let layout = ctx.key.layout.layout();
    let d = ctx.descriptor;
    let c = ctx.center();
    let r = f64::from(d.width.min(d.height)) / 2.0;
    let font_px = (r * 0.085).max(4.0);

    let mut svg = svg_open(d.width, d.height);
    for (i, label) in layout.labels().iter().enumerate() {
        let a = layout.pocket_center_angle(i);
        let p = polar(c, r * radii::NUMERAL_TEXT, a);
        svg.push_str(&format!(
            r##"<text x="{:.3}" y="{:.3}" transform="rotate({:.4} {:.3} {:.3})" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-weight="bold" font-size="{font_px:.3}" fill="#f5f0e1">{label}</text>"##,
            p.x,
            p.y,
            a.to_degrees(),
            p.x,
            p.y
        ));
    }
    svg.push_str("</svg>");

    rasterize(ctx, &svg)
}

fn gen_hit_mask(ctx: &GenContext<'_>) -> SpinResult<RasterImage> {
    let layout = ctx.key.layout.layout();
    let d = ctx.descriptor;
    if d.width == 0 || d.height == 0 {
        return Err(SpinError::generation(format!(
            "{} has an empty raster",
            ctx.key
        )));
    }
    let c = ctx.center();
    let r = f64::from(d.width.min(d.height)) / 2.0;
    let (inner, outer) = (r * radii::POCKET_INNER, r * radii::TRACK_INNER);

    let mut px = vec![0u8; (d.width as usize) * (d.height as usize) * 4];
    for y in 0..d.height {
        let dy = f64::from(y) + 0.5 - c.y;
        for x in 0..d.width {
            let dx = f64::from(x) + 0.5 - c.x;
            let dist = dx.hypot(dy);
            if dist < inner || dist > outer {
                continue;
            }
            let idx = layout.pocket_at_angle(angle_of(dx, dy));
            let o = ((y as usize) * (d.width as usize) + (x as usize)) * 4;
            px[o] = idx as u8;
            px[o + 3] = 255;
        }
    }
    RasterImage::new(d.width, d.height, px)
}

fn gen_ball_sprite(ctx: &GenContext<'_>) -> SpinResult<RasterImage> {
    let d = ctx.descriptor;
    let s = f64::from(d.width);
    let mut svg = svg_open(d.width, d.height);
    svg.push_str(&format!(
        r##"<defs><radialGradient id="ball" cx="38%" cy="35%" r="65%"><stop offset="0" stop-color="#ffffff"/><stop offset="0.55" stop-color="#dcdcdc"/><stop offset="1" stop-color="#7d7d7d"/></radialGradient></defs><circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="url(#ball)"/></svg>"##,
        s / 2.0,
        s / 2.0,
        (s / 2.0 - 0.5).max(0.5)
    ));
    rasterize(ctx, &svg)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/generate.rs"]
mod tests;
