//! Adaptive encoding of rendered frames into a size-bounded animation.
//!
//! [`ladder::EncodeLadder`] walks an ordered list of strategies (quality steps, frame reduction,
//! format fallback) and stops at the first result that fits the byte budget.

/// Lossless APNG fallback.
pub mod apng;
/// Encoded bytes, format tags and saving to disk.
pub mod artifact;
/// Flattening, subsampling and posterization of frames before encoding.
pub mod frames;
/// Palette GIF encoding.
pub mod gif;
/// Strategy list and the generic attempt loop.
pub mod ladder;
/// Size shortfall analysis.
pub mod report;
