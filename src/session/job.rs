use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::foundation::error::{SpinError, SpinResult};
use crate::session::engine::{ResolvedRequest, SpinEngine, SpinOutput};

/// Handle to a spin rendering on a background thread.
///
/// Dropping the handle cancels the job. A cancelled job writes nothing to disk. Layers it finished
/// generating before the cancel stay in the asset cache and are reused by later requests for the
/// same layout and size. Partially generated layers are never inserted.
#[derive(Debug)]
pub struct RenderJob {
    cancel: Arc<AtomicBool>,
    rx: mpsc::Receiver<SpinResult<SpinOutput>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderJob {
    pub(crate) fn start(engine: SpinEngine, req: ResolvedRequest) -> SpinResult<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::sync_channel(1);
        let flag = Arc::clone(&cancel);
        let handle = std::thread::Builder::new()
            .name(format!("wheelspin-{}", req.outcome))
            .spawn(move || {
                let result = engine.run(&req, Some(&flag));
                if let Err(e) = &result {
                    tracing::debug!(error = %e, "spin job failed");
                }
                // The receiver is gone when the handle was dropped.
                let _ = tx.send(result);
            })
            .context("failed to spawn spin job thread")?;
        Ok(Self {
            cancel,
            rx,
            handle: Some(handle),
        })
    }

    /// Ask the job to stop. Rendering checks before every frame and encoding before every rung.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether [`RenderJob::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Block until the job ends and return its result.
    pub fn wait(mut self) -> SpinResult<SpinOutput> {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            return Err(SpinError::generation("spin job panicked"));
        }
        self.rx
            .recv()
            .map_err(|_| SpinError::generation("spin job ended without a result"))?
    }
}

impl Drop for RenderJob {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
