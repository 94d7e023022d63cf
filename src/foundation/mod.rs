//! Shared value types, error taxonomy and small numeric helpers.

/// Canvas and color value types.
pub mod core;
/// Error taxonomy.
pub mod error;
/// Angle and 8-bit arithmetic helpers.
pub mod math;
