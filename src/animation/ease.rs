/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Cubic ease-out.
    OutCubic,
    /// Quartic ease-out.
    OutQuart,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Area under the curve from `0` to `t`, with `t` clamped to `[0, 1]`.
    ///
    /// Used when the curve shapes a speed rather than a position.
    pub fn integral(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let r = 1.0 - t;
        match self {
            Self::Linear => t * t / 2.0,
            Self::InQuad => t * t * t / 3.0,
            Self::OutQuad => t + (r.powi(3) - 1.0) / 3.0,
            Self::OutCubic => t + (r.powi(4) - 1.0) / 4.0,
            Self::OutQuart => t + (r.powi(5) - 1.0) / 5.0,
            Self::InOutCubic => {
                if t < 0.5 {
                    t.powi(4)
                } else {
                    t - 0.5 + r.powi(4)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
