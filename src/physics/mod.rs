//! Deterministic wheel and ball trajectories.

/// Spin planning, closed-form decay and landing verification.
pub mod spin;
