use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::control::WorkerControl;
use crate::pixel::{PixelBatch, PixelSample, DEFAULT_BATCH_CAPACITY};
use crate::sink::RenderOutcome;
use crate::source::PixelControl;

/// Default age at which a pending batch is handed to the consumer.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(250);

/// What happens to buffered pixels when a render is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Deliver the pending batch before signalling completion.
    #[default]
    Flush,
    /// Drop the pending batch; only already flushed batches reach the sink.
    Discard,
}

/// Batching behaviour of the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// A batch older than this is flushed on the next emitted pixel.
    pub flush_interval: Duration,
    /// Capacity reserved for each fresh batch.
    pub batch_capacity: usize,
    /// Optional size trigger: flush as soon as a batch holds this many pixels.
    pub max_batch_pixels: Option<usize>,
    pub cancel_policy: CancelPolicy,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            max_batch_pixels: None,
            cancel_policy: CancelPolicy::default(),
        }
    }
}

/// Messages sent from the worker thread to the controller.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    Batch(PixelBatch),
    Finished(RenderOutcome),
}

/// Per-pixel callback handed to [`ScenePixelSource::render`].
///
/// Owns the batch under construction. Full batches are moved onto the
/// delivery channel without waiting for the consumer.
///
/// [`ScenePixelSource::render`]: crate::ScenePixelSource::render
#[derive(Debug)]
pub struct PixelEmitter {
    batch: PixelBatch,
    last_flush: Instant,
    settings: WorkerSettings,
    control: Arc<WorkerControl>,
    events: Sender<WorkerEvent>,
    accepted: u64,
    delivery_failed: bool,
}

impl PixelEmitter {
    pub(crate) fn new(
        settings: WorkerSettings,
        control: Arc<WorkerControl>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            batch: PixelBatch::with_capacity(settings.batch_capacity),
            last_flush: Instant::now(),
            settings,
            control,
            events,
            accepted: 0,
            delivery_failed: false,
        }
    }

    /// Hands one finished pixel to the session.
    ///
    /// Blocks while the session is paused. Once the session is stopped the
    /// pixel is rejected and [`PixelControl::Stop`] is returned.
    pub fn emit(&mut self, sample: PixelSample) -> PixelControl {
        if self.should_stop() {
            return PixelControl::Stop;
        }

        if self.control.is_paused() {
            // Show everything produced so far while parked.
            self.flush();
            self.control.wait_while_paused();
        }

        if self.should_stop() {
            return PixelControl::Stop;
        }

        self.batch.push(sample);
        self.accepted += 1;

        if self.batch_due() && !self.flush() {
            return PixelControl::Stop;
        }
        PixelControl::Continue
    }

    /// True once cancellation was requested or the consumer went away.
    pub fn should_stop(&self) -> bool {
        self.delivery_failed || self.control.is_cancelled()
    }

    /// Number of pixels accepted into batches so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    fn batch_due(&self) -> bool {
        if let Some(limit) = self.settings.max_batch_pixels {
            if self.batch.len() >= limit {
                return true;
            }
        }
        self.last_flush.elapsed() > self.settings.flush_interval
    }

    /// Moves the pending batch onto the channel. Returns false when the
    /// consumer has disconnected.
    fn flush(&mut self) -> bool {
        self.last_flush = Instant::now();
        if self.batch.is_empty() || self.delivery_failed {
            return !self.delivery_failed;
        }

        let batch = self.batch.take(self.settings.batch_capacity);
        let len = batch.len();
        if self.events.send(WorkerEvent::Batch(batch)).is_err() {
            warn!(pixels = len, "pixel consumer disconnected; stopping render");
            self.delivery_failed = true;
            return false;
        }
        true
    }

    /// Final flush followed by the completion message. Consumes the emitter so
    /// it runs exactly once per session.
    pub(crate) fn finish(mut self, outcome: RenderOutcome) {
        let discard = self.settings.cancel_policy == CancelPolicy::Discard
            && self.control.is_cancelled();
        if discard {
            debug!(pixels = self.batch.len(), "discarding pending batch after stop");
        } else {
            self.flush();
        }

        let outcome = if self.delivery_failed && outcome.is_success() {
            RenderOutcome::Failed("pixel consumer disconnected".into())
        } else {
            outcome
        };

        if self.events.send(WorkerEvent::Finished(outcome)).is_err() {
            debug!("completion dropped; controller already gone");
        }
    }
}
