use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{SpinError, SpinResult};

/// Parse an in-memory SVG document with the shared font database.
pub(crate) fn parse_svg_str(
    svg: &str,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> SpinResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb: fontdb.clone(),
        ..Default::default()
    };
    usvg::Tree::from_str(svg, &opts)
        .context("parse generated svg")
        .map_err(|e| SpinError::generation(format!("{e:#}")))
}

/// Rasterize `tree` into a `width`×`height` premultiplied RGBA8 buffer, stretching the SVG
/// viewport to fill it.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> SpinResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SpinError::generation("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    if !sx.is_finite() || !sy.is_finite() {
        return Err(SpinError::generation("svg has invalid width/height"));
    }
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

/// Load system fonts once; numeral and popup text resolve against this database.
pub(crate) fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
}
