//! Progressive render coordination.
//!
//! A scene renders on a dedicated worker thread while the caller's thread
//! applies partial results, reports progress, and pauses, resumes or stops the
//! render. The overall flow is:
//!
//! ```text
//!   RenderController::start ──▶ SceneBuilder ──▶ RenderWorker thread
//!          ▲                                          │ ScenePixelSource::render
//!          │ pause/resume/stop                        ▼
//!   caller (CLI / UI)                          PixelEmitter::emit ── batches ──┐
//!          │                                                                   │
//!          └── run / process_events ◀──────────── crossbeam channel ◀─────────┘
//!                  │ PixelSink::apply_batch, PixelSink::on_complete
//!                  └ ProgressSink::on_progress (on a fixed cadence)
//! ```
//!
//! Batches travel over a single channel per session, so the consumer sees
//! them in flush order and always sees the completion notice last. Pausing
//! parks the worker on a condition variable between two pixels and freezes
//! the elapsed-time clock; stopping is cooperative and checked once per pixel.

mod control;
mod controller;
mod emitter;
mod error;
mod pixel;
mod progress;
mod sink;
mod source;
mod state;
mod worker;

pub use controller::{ControlCommand, RenderController};
pub use emitter::{CancelPolicy, PixelEmitter, WorkerSettings, DEFAULT_FLUSH_INTERVAL};
pub use error::RenderError;
pub use pixel::{PixelBatch, PixelSample, Rgb8, DEFAULT_BATCH_CAPACITY};
pub use progress::{
    estimate, format_clock, ProgressEstimator, ProgressSample, Stopwatch,
    DEFAULT_PROGRESS_INTERVAL,
};
pub use sink::{NoProgress, PixelSink, ProgressSink, RenderOutcome, RenderSummary};
pub use source::{
    BoxedPixelSource, PixelControl, SamplerConfig, SamplerKind, SceneBuilder, SceneParams,
    ScenePixelSource, MAX_SAMPLES,
};
pub use state::{RenderState, Transition};
