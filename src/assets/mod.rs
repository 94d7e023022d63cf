//! Static raster layers and the cache that shares them across renders.
//!
//! Every layer a frame needs apart from the moving ball position is generated once per
//! `(kind, layout, wheel diameter)` and reused by reference.

/// Keyed, lazily generated raster store.
pub mod cache;
/// One generator per asset kind.
pub(crate) mod generate;
/// SVG parsing and rasterization helpers.
pub(crate) mod svg_raster;
