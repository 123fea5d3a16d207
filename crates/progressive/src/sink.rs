use std::time::Duration;

use crate::pixel::PixelBatch;
use crate::progress::ProgressSample;

/// How a session's render loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The scene emitted every pixel and returned.
    Completed,
    /// The scene returned early after `stop()`.
    Cancelled,
    /// The scene returned an error, panicked, or lost its consumer.
    Failed(String),
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RenderOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RenderOutcome::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Final report delivered with [`PixelSink::on_complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub outcome: RenderOutcome,
    /// Render time with paused intervals excluded.
    pub elapsed: Duration,
    pub pixels_rendered: u64,
    pub pixels_total: u64,
}

/// Receives the pixel stream of a session.
///
/// Batches arrive in the order the worker flushed them and complete with a
/// single `on_complete` once the last batch has been applied.
pub trait PixelSink {
    fn apply_batch(&mut self, batch: PixelBatch);
    fn on_complete(&mut self, summary: &RenderSummary);
}

/// Receives periodic progress estimates while a session renders.
pub trait ProgressSink {
    fn on_progress(&mut self, sample: &ProgressSample);
}

impl<T: PixelSink + ?Sized> PixelSink for &mut T {
    fn apply_batch(&mut self, batch: PixelBatch) {
        (**self).apply_batch(batch)
    }

    fn on_complete(&mut self, summary: &RenderSummary) {
        (**self).on_complete(summary)
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn on_progress(&mut self, sample: &ProgressSample) {
        (**self).on_progress(sample)
    }
}

/// Progress sink that ignores every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _sample: &ProgressSample) {}
}
