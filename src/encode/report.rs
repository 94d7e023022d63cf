use crate::encode::artifact::{EncodedArtifact, FormatTag};

/// Frame count above which an animation is flagged as long.
pub const FRAME_COUNT_HIGH: usize = 120;
/// Frame rate above which an animation is flagged as fast.
pub const FPS_HIGH: f64 = 24.0;

/// One reason an artifact is larger than wanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeIssue {
    /// Size is above the non-negotiable ceiling.
    ExceedsHardCap,
    /// Size is above the soft budget.
    ExceedsTarget,
    /// More frames than an attachment usually needs.
    FrameCountHigh,
    /// Frame rate above what the eye gains from.
    FpsHigh,
    /// The lossless fallback format was used.
    InefficientFormat,
}

impl SizeIssue {
    fn suggestion(self) -> &'static str {
        match self {
            Self::ExceedsHardCap => "reduce the frame size; no encoder setting reached the hard cap",
            Self::ExceedsTarget => "raise the byte budget or shorten the animation",
            Self::FrameCountHigh => "shorten the duration or lower the fps hint",
            Self::FpsHigh => "lower the fps hint; motion above 24 fps rarely survives GIF delays",
            Self::InefficientFormat => "disable effects with fine gradients so the palette format fits",
        }
    }
}

/// Shortfall analysis of an encoded artifact. Informational only.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SizeReport {
    /// Artifact size in bytes.
    pub size: u64,
    /// Soft byte budget.
    pub budget: u64,
    /// Hard byte ceiling.
    pub hard_cap: u64,
    /// Frames encoded.
    pub frame_count: usize,
    /// Effective frames per second of the encoded animation.
    pub fps: f64,
    /// Container format.
    pub format: FormatTag,
    /// Detected issues, most severe first.
    pub issues: Vec<SizeIssue>,
    /// One human-readable hint per issue.
    pub suggestions: Vec<String>,
}

impl SizeReport {
    /// `true` when nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// `true` when the size fits the hard cap.
    pub fn within_hard_cap(&self) -> bool {
        self.size <= self.hard_cap
    }
}

/// Describe why `artifact` is (or is not) larger than wanted.
pub fn analyze_size(
    artifact: &EncodedArtifact,
    frame_count: usize,
    fps: f64,
    budget: u64,
    hard_cap: u64,
) -> SizeReport {
    let size = artifact.size();
    let mut issues = Vec::new();
    if size > hard_cap {
        issues.push(SizeIssue::ExceedsHardCap);
    }
    if size > budget {
        issues.push(SizeIssue::ExceedsTarget);
    }
    if frame_count > FRAME_COUNT_HIGH {
        issues.push(SizeIssue::FrameCountHigh);
    }
    if fps > FPS_HIGH {
        issues.push(SizeIssue::FpsHigh);
    }
    if artifact.format() == FormatTag::Apng {
        issues.push(SizeIssue::InefficientFormat);
    }
    let suggestions = issues.iter().map(|i| i.suggestion().to_owned()).collect();
    SizeReport {
        size,
        budget,
        hard_cap,
        frame_count,
        fps,
        format: artifact.format(),
        issues,
        suggestions,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/report.rs"]
mod tests;
