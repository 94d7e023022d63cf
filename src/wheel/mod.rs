//! Static wheel geometry.

/// Pocket tables for the supported wheel arrangements.
pub mod layout;
/// Band radii and polar helpers shared by asset generation and frame rendering.
pub mod geometry;
