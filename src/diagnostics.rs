//! Structured diagnostic records and the sinks that receive them.
//!
//! Nothing in the pipeline logs into global state. Planner, renderer, encoder and session all take
//! a `&dyn DiagnosticsSink` and push typed records into it; the caller decides whether they end up
//! in `tracing`, in a channel, or in memory.

use std::sync::mpsc;

use parking_lot::Mutex;

use crate::assets::cache::CacheHealthReport;
use crate::encode::ladder::LadderStep;
use crate::encode::report::SizeReport;

/// One structured diagnostic record.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The corrected final ball angle still misses the pocket-center tolerance window.
    PrecisionDeviation {
        /// Winning pocket index.
        pocket_index: usize,
        /// Absolute deviation from the ideal pocket center, radians.
        deviation_rad: f64,
        /// Tolerance the deviation was compared against, radians.
        tolerance_rad: f64,
    },
    /// Render progress, emitted roughly every tenth of the frame count.
    RenderProgress {
        /// Frames finished so far.
        frames_done: u64,
        /// Total frames in the render.
        frames_total: u64,
    },
    /// One attempt of the encoding ladder.
    LadderStep(LadderStep),
    /// Every ladder rung exceeded the hard cap; the smallest artifact was returned anyway.
    EncodingExhaustion(SizeReport),
    /// Asset cache snapshot taken after a request.
    CacheHealth(CacheHealthReport),
}

impl Diagnostic {
    /// Short stable name of the record kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PrecisionDeviation { .. } => "precision_deviation",
            Self::RenderProgress { .. } => "render_progress",
            Self::LadderStep(_) => "ladder_step",
            Self::EncodingExhaustion(_) => "encoding_exhaustion",
            Self::CacheHealth(_) => "cache_health",
        }
    }
}

/// Receiver of diagnostic records. Must tolerate calls from render worker threads.
pub trait DiagnosticsSink: Send + Sync {
    /// Accept one record. Must not block for long; the render loop calls this inline.
    fn record(&self, diagnostic: Diagnostic);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Sink that forwards records to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::PrecisionDeviation {
                pocket_index,
                deviation_rad,
                tolerance_rad,
            } => tracing::warn!(
                pocket_index,
                deviation_rad,
                tolerance_rad,
                "spin plan landing deviates from pocket center"
            ),
            Diagnostic::RenderProgress {
                frames_done,
                frames_total,
            } => tracing::debug!(frames_done, frames_total, "render progress"),
            Diagnostic::LadderStep(step) => tracing::debug!(
                strategy = %step.strategy,
                size = step.size,
                accepted = step.accepted,
                "encode attempt"
            ),
            Diagnostic::EncodingExhaustion(report) => tracing::warn!(
                size = report.size,
                hard_cap = report.hard_cap,
                issues = ?report.issues,
                "every encode rung exceeded the hard cap"
            ),
            Diagnostic::CacheHealth(h) => {
                if h.verdict.is_healthy() {
                    tracing::debug!(
                        hit_rate = h.stats.hit_rate(),
                        bytes = h.stats.total_bytes,
                        "asset cache healthy"
                    );
                } else {
                    tracing::warn!(reasons = ?h.reasons, "asset cache degraded");
                }
            }
        }
    }
}

/// In-memory sink for tests and for callers that attach diagnostics to a reply.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().clone()
    }

    /// Take and clear the recorded list.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Count records of one kind (see [`Diagnostic::kind`]).
    pub fn count_kind(&self, kind: &str) -> usize {
        self.records.lock().iter().filter(|d| d.kind() == kind).count()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        self.records.lock().push(diagnostic);
    }
}

/// Sink that forwards records over a channel. A disconnected receiver silently drops records.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Mutex<mpsc::Sender<Diagnostic>>,
}

impl ChannelSink {
    /// Build a sink and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::Receiver<Diagnostic>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }
}

impl DiagnosticsSink for ChannelSink {
    fn record(&self, diagnostic: Diagnostic) {
        let _ = self.tx.lock().send(diagnostic);
    }
}

/// Fan a record out to two sinks.
pub struct TeeSink<'a> {
    first: &'a dyn DiagnosticsSink,
    second: &'a dyn DiagnosticsSink,
}

impl<'a> TeeSink<'a> {
    /// Forward to `first`, then `second`.
    pub fn new(first: &'a dyn DiagnosticsSink, second: &'a dyn DiagnosticsSink) -> Self {
        Self { first, second }
    }
}

impl DiagnosticsSink for TeeSink<'_> {
    fn record(&self, diagnostic: Diagnostic) {
        self.first.record(diagnostic.clone());
        self.second.record(diagnostic);
    }
}

#[cfg(test)]
#[path = "../tests/unit/diagnostics.rs"]
mod tests;
