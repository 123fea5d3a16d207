use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

use crate::control::WorkerControl;
use crate::emitter::{PixelEmitter, WorkerEvent, WorkerSettings};
use crate::sink::RenderOutcome;
use crate::source::BoxedPixelSource;

/// Background thread running one scene's render loop.
pub(crate) struct RenderWorker {
    control: Arc<WorkerControl>,
    join_handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    pub fn spawn(
        source: BoxedPixelSource,
        pixels_total: u64,
        settings: WorkerSettings,
        events: Sender<WorkerEvent>,
    ) -> io::Result<Self> {
        let control = Arc::new(WorkerControl::new());
        let thread_control = Arc::clone(&control);
        let handle = thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || run_worker(source, pixels_total, settings, thread_control, events))?;

        Ok(Self {
            control,
            join_handle: Some(handle),
        })
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    /// Requests cooperative cancellation. Also reopens the pause gate so a
    /// parked worker can observe the flag.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Waits for the thread to exit. Only called after the completion message
    /// was received, so the wait is at most the tail of `run_worker`.
    pub fn join(mut self) {
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                error!("render worker thread panicked after reporting completion");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            self.control.cancel();
            let _ = handle.join();
        }
    }
}

fn run_worker(
    mut source: BoxedPixelSource,
    pixels_total: u64,
    settings: WorkerSettings,
    control: Arc<WorkerControl>,
    events: Sender<WorkerEvent>,
) {
    info!(pixels = pixels_total, "render worker started");
    let mut emitter = PixelEmitter::new(settings, Arc::clone(&control), events);

    let result = panic::catch_unwind(AssertUnwindSafe(|| source.render(&mut emitter)));
    let outcome = match result {
        Ok(Ok(())) if control.is_cancelled() => RenderOutcome::Cancelled,
        Ok(Ok(())) => RenderOutcome::Completed,
        Ok(Err(err)) => {
            let message = format!("{err:#}");
            warn!(error = %message, "scene render loop failed");
            RenderOutcome::Failed(message)
        }
        Err(payload) => {
            let message = format!("scene panicked: {}", panic_message(payload.as_ref()));
            error!(error = %message, "scene render loop panicked");
            RenderOutcome::Failed(message)
        }
    };

    debug!(
        accepted = emitter.accepted(),
        expected = pixels_total,
        ?outcome,
        "render worker exiting"
    );
    emitter.finish(outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
