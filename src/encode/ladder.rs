use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EncodeConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, NullSink};
use crate::encode::apng::encode_apng;
use crate::encode::artifact::{EncodedArtifact, FormatTag};
use crate::encode::frames::{PreparedFrames, subsample_indices};
use crate::encode::gif::encode_gif;
use crate::encode::report::{SizeReport, analyze_size};
use crate::foundation::error::{SpinError, SpinResult};
use crate::render::frame::FrameRGBA;
use crate::render::plan::TimingLimits;

/// One rung of the degradation ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodeStrategy {
    /// Every frame as GIF at `quality`.
    Quality {
        /// Quality in `1..=100`.
        quality: u8,
    },
    /// An evenly spread subset of frames as GIF, delays stretched to keep the duration.
    ReduceFrames {
        /// Percentage of frames kept.
        keep_percent: u8,
        /// Quality in `1..=100`.
        quality: u8,
    },
    /// Lossless APNG of an evenly spread subset of frames.
    Apng {
        /// Percentage of frames kept.
        keep_percent: u8,
    },
}

impl EncodeStrategy {
    /// Format this strategy produces.
    pub fn format(self) -> FormatTag {
        match self {
            Self::Quality { .. } | Self::ReduceFrames { .. } => FormatTag::Gif,
            Self::Apng { .. } => FormatTag::Apng,
        }
    }

    fn keep_percent(self) -> u8 {
        match self {
            Self::Quality { .. } => 100,
            Self::ReduceFrames { keep_percent, .. } | Self::Apng { keep_percent } => keep_percent,
        }
    }

    fn validate(self) -> SpinResult<()> {
        let keep = self.keep_percent();
        if keep == 0 || keep > 100 {
            return Err(SpinError::validation(format!(
                "{self}: keep percent must be in 1..=100"
            )));
        }
        match self {
            Self::Quality { quality } | Self::ReduceFrames { quality, .. }
                if quality == 0 || quality > 100 =>
            {
                Err(SpinError::validation(format!(
                    "{self}: quality must be in 1..=100"
                )))
            }
            _ => Ok(()),
        }
    }

    fn attempt(self, frames: &PreparedFrames) -> SpinResult<(EncodedArtifact, usize)> {
        let keep = subsample_indices(frames.len(), self.keep_percent());
        let bytes = match self {
            Self::Quality { quality } | Self::ReduceFrames { quality, .. } => {
                encode_gif(frames, &keep, quality)?
            }
            Self::Apng { .. } => encode_apng(frames, &keep)?,
        };
        Ok((EncodedArtifact::new(bytes, self.format()), keep.len()))
    }
}

impl std::fmt::Display for EncodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quality { quality } => write!(f, "gif q{quality}"),
            Self::ReduceFrames {
                keep_percent,
                quality,
            } => write!(f, "gif q{quality} keep {keep_percent}%"),
            Self::Apng { keep_percent } => write!(f, "apng keep {keep_percent}%"),
        }
    }
}

/// Record of one ladder attempt.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LadderStep {
    /// Position in the ladder.
    pub index: usize,
    /// Human-readable strategy, e.g. `gif q60`.
    pub strategy: String,
    /// Format attempted.
    pub format: FormatTag,
    /// Frames encoded.
    pub frames: usize,
    /// Output size; `0` when the attempt failed.
    pub size: u64,
    /// Whether the output fit the effective budget.
    pub accepted: bool,
    /// Codec error message of a failed attempt.
    pub error: Option<String>,
}

/// Result of running the ladder.
#[derive(Clone, Debug)]
pub struct EncodeOutcome {
    /// Accepted artifact, or the smallest one obtained.
    pub artifact: EncodedArtifact,
    /// Every attempt in order.
    pub steps: Vec<LadderStep>,
    /// Size analysis of `artifact`.
    pub report: SizeReport,
    /// `true` when no rung fit the hard cap.
    pub exhausted: bool,
}

/// Side channels of an encode.
#[derive(Clone, Copy)]
pub struct EncodeControl<'a> {
    /// Set to abandon the encode; checked before each rung.
    pub cancel: Option<&'a AtomicBool>,
    /// Receives ladder steps and exhaustion records.
    pub sink: &'a dyn DiagnosticsSink,
}

impl Default for EncodeControl<'_> {
    fn default() -> Self {
        Self {
            cancel: None,
            sink: &NullSink,
        }
    }
}

/// Ordered encoding strategies plus the limits they are evaluated under.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeLadder {
    strategies: Vec<EncodeStrategy>,
    hard_cap: u64,
    timing: TimingLimits,
}

impl EncodeLadder {
    /// Build a ladder from explicit strategies.
    pub fn new(
        strategies: Vec<EncodeStrategy>,
        hard_cap: u64,
        timing: TimingLimits,
    ) -> SpinResult<Self> {
        if strategies.is_empty() {
            return Err(SpinError::validation("encode ladder needs at least one strategy"));
        }
        if hard_cap == 0 {
            return Err(SpinError::validation("encode hard cap must be non-zero"));
        }
        timing.validate()?;
        for s in &strategies {
            s.validate()?;
        }
        Ok(Self {
            strategies,
            hard_cap,
            timing,
        })
    }

    /// Default quality, then each quality step, then each frame reduction at the lowest quality,
    /// then APNG at the lowest keep ratio.
    pub fn from_config(cfg: &EncodeConfig) -> SpinResult<Self> {
        let mut strategies = vec![EncodeStrategy::Quality {
            quality: cfg.default_quality,
        }];
        strategies.extend(
            cfg.quality_steps
                .iter()
                .map(|&quality| EncodeStrategy::Quality { quality }),
        );
        let floor = cfg
            .quality_steps
            .iter()
            .copied()
            .min()
            .unwrap_or(cfg.default_quality);
        strategies.extend(cfg.keep_percents.iter().map(|&keep_percent| {
            EncodeStrategy::ReduceFrames {
                keep_percent,
                quality: floor,
            }
        }));
        strategies.push(EncodeStrategy::Apng {
            keep_percent: cfg.keep_percents.iter().copied().min().unwrap_or(100),
        });
        Self::new(strategies, cfg.hard_cap, cfg.timing)
    }

    /// Strategies in evaluation order.
    pub fn strategies(&self) -> &[EncodeStrategy] {
        &self.strategies
    }

    /// Non-negotiable size ceiling.
    pub fn hard_cap(&self) -> u64 {
        self.hard_cap
    }

    /// Encode `frames` played back at `fps`, walking the ladder until an attempt fits
    /// `byte_budget` (itself bounded by the hard cap).
    ///
    /// When nothing fits, the smallest artifact is returned with `exhausted` set if it is still
    /// above the hard cap. Fails only when every attempt errors or the caller cancels.
    #[tracing::instrument(level = "debug", skip_all, fields(frames = frames.len(), byte_budget = byte_budget))]
    pub fn encode(
        &self,
        frames: &[FrameRGBA],
        fps: f64,
        byte_budget: u64,
        ctrl: EncodeControl<'_>,
    ) -> SpinResult<EncodeOutcome> {
        if byte_budget == 0 {
            return Err(SpinError::validation("byte budget must be non-zero"));
        }
        let n = frames.len();
        let guess_ms = if fps.is_finite() && fps > 0.0 {
            (n as f64 * 1000.0 / fps).round() as u64
        } else {
            0
        };
        let fps = self
            .timing
            .clamp_fps(fps, self.timing.clamp_duration_ms(guess_ms));
        let duration_ms = self
            .timing
            .clamp_duration_ms((n as f64 * 1000.0 / fps).round() as u64);
        let prepared = PreparedFrames::from_frames(frames, duration_ms)?;
        let budget = byte_budget.min(self.hard_cap);

        let mut steps = Vec::with_capacity(self.strategies.len());
        let mut best: Option<(EncodedArtifact, usize)> = None;
        let mut last_err = None;
        for (index, &strategy) in self.strategies.iter().enumerate() {
            if ctrl.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(SpinError::cancelled("encode abandoned by caller"));
            }
            let step = match strategy.attempt(&prepared) {
                Ok((artifact, kept)) => {
                    let size = artifact.size();
                    let accepted = size <= budget;
                    if best.as_ref().is_none_or(|(b, _)| size < b.size()) {
                        best = Some((artifact, kept));
                    }
                    LadderStep {
                        index,
                        strategy: strategy.to_string(),
                        format: strategy.format(),
                        frames: kept,
                        size,
                        accepted,
                        error: None,
                    }
                }
                Err(e) => {
                    let step = LadderStep {
                        index,
                        strategy: strategy.to_string(),
                        format: strategy.format(),
                        frames: 0,
                        size: 0,
                        accepted: false,
                        error: Some(e.to_string()),
                    };
                    last_err = Some(e);
                    step
                }
            };
            let accepted = step.accepted;
            ctrl.sink.record(Diagnostic::LadderStep(step.clone()));
            steps.push(step);
            if accepted {
                break;
            }
        }

        let Some((artifact, kept)) = best else {
            return Err(last_err.unwrap_or_else(|| SpinError::encoding("no encode attempt ran")));
        };
        // The ladder stops at the first fit, so the smallest artifact is the accepted one.
        let kept_fps = kept as f64 * 1000.0 / duration_ms as f64;
        let report = analyze_size(&artifact, kept, kept_fps, byte_budget, self.hard_cap);
        let exhausted = artifact.size() > self.hard_cap;
        if exhausted {
            ctrl.sink.record(Diagnostic::EncodingExhaustion(report.clone()));
        }
        tracing::debug!(
            size = artifact.size(),
            format = %artifact.format(),
            attempts = steps.len(),
            exhausted,
            "encode finished"
        );
        Ok(EncodeOutcome {
            artifact,
            steps,
            report,
            exhausted,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ladder.rs"]
mod tests;
