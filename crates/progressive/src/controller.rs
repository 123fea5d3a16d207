use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, unbounded, Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::emitter::{WorkerEvent, WorkerSettings};
use crate::error::RenderError;
use crate::progress::{ProgressEstimator, ProgressSample, DEFAULT_PROGRESS_INTERVAL};
use crate::sink::{PixelSink, ProgressSink, RenderOutcome, RenderSummary};
use crate::source::{SamplerConfig, SceneBuilder, SceneParams};
use crate::state::{RenderState, Transition};
use crate::worker::RenderWorker;

/// Control requests accepted while a session is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Ok(ControlCommand::Pause),
            "r" | "resume" => Ok(ControlCommand::Resume),
            "s" | "stop" => Ok(ControlCommand::Stop),
            other => Err(format!(
                "unknown command '{other}'; expected pause, resume, or stop"
            )),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
            ControlCommand::Stop => "stop",
        })
    }
}

struct RenderSession {
    worker: RenderWorker,
    events: Receiver<WorkerEvent>,
    estimator: ProgressEstimator,
    pixels_rendered: u64,
    params: SceneParams,
    started_at: Instant,
}

/// Owns the render lifecycle: one session at a time, driven from a single
/// consumer thread.
///
/// Control calls are checked against [`RenderState::next`]; pixel batches and
/// the completion notice are pulled from the worker with
/// [`process_events`](Self::process_events), [`wait_event`](Self::wait_event)
/// or [`run`](Self::run) and handed to the caller's sinks on this thread.
pub struct RenderController {
    settings: WorkerSettings,
    progress_interval: Duration,
    state: RenderState,
    session: Option<RenderSession>,
}

impl RenderController {
    pub fn new(settings: WorkerSettings) -> Self {
        Self {
            settings,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            state: RenderState::Waiting,
            session: None,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Pixels delivered to the sink during the live session.
    pub fn pixels_rendered(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.pixels_rendered)
    }

    pub fn pixels_total(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.params.pixel_count())
    }

    pub fn scene_params(&self) -> Option<&SceneParams> {
        self.session.as_ref().map(|s| &s.params)
    }

    /// Builds a scene and starts rendering it on a new worker thread.
    pub fn start<B>(
        &mut self,
        builder: &B,
        sampler: SamplerConfig,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>
    where
        B: SceneBuilder + ?Sized,
    {
        let next = self.transition(Transition::Start)?;
        debug_assert!(self.session.is_none());

        let params = SceneParams::new(width, height, sampler);
        let source = builder.build(&params).map_err(RenderError::SceneBuild)?;

        let (sender, receiver) = unbounded();
        let worker = RenderWorker::spawn(source, params.pixel_count(), self.settings.clone(), sender)?;
        let now = Instant::now();

        self.session = Some(RenderSession {
            worker,
            events: receiver,
            estimator: ProgressEstimator::start(params.pixel_count(), now),
            pixels_rendered: 0,
            params,
            started_at: now,
        });
        info!(
            width,
            height,
            sampler = %sampler.kind,
            samples = sampler.samples,
            "render started"
        );
        self.set_state(next);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), RenderError> {
        let next = self.transition(Transition::Pause)?;
        if let Some(session) = self.session.as_mut() {
            session.worker.pause();
            session.estimator.pause(Instant::now());
        }
        self.set_state(next);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), RenderError> {
        let next = self.transition(Transition::Resume)?;
        if let Some(session) = self.session.as_mut() {
            session.estimator.resume(Instant::now());
            session.worker.resume();
        }
        self.set_state(next);
        Ok(())
    }

    /// Requests cancellation. The session stays live until the worker reports
    /// completion through the event queue.
    pub fn stop(&mut self) -> Result<(), RenderError> {
        let next = self.transition(Transition::Stop)?;
        if let Some(session) = self.session.as_mut() {
            session.worker.cancel();
            session.estimator.pause(Instant::now());
        }
        self.set_state(next);
        Ok(())
    }

    pub fn apply(&mut self, command: ControlCommand) -> Result<RenderState, RenderError> {
        match command {
            ControlCommand::Pause => self.pause()?,
            ControlCommand::Resume => self.resume()?,
            ControlCommand::Stop => self.stop()?,
        }
        Ok(self.state)
    }

    /// Current estimate for the live session.
    pub fn progress(&self) -> Option<ProgressSample> {
        self.session
            .as_ref()
            .map(|s| s.estimator.sample(s.pixels_rendered, Instant::now()))
    }

    /// Reports progress if the session is rendering. Returns true when a
    /// sample was delivered.
    pub fn tick<P>(&self, progress: &mut P) -> bool
    where
        P: ProgressSink + ?Sized,
    {
        if self.state != RenderState::Rendering {
            return false;
        }
        match self.progress() {
            Some(sample) => {
                progress.on_progress(&sample);
                true
            }
            None => false,
        }
    }

    /// Applies every event already queued by the worker without blocking.
    ///
    /// Returns the summary if the session finished.
    pub fn process_events<S>(&mut self, sink: &mut S) -> Option<RenderSummary>
    where
        S: PixelSink + ?Sized,
    {
        loop {
            let event = {
                let session = self.session.as_ref()?;
                match session.events.try_recv() {
                    Ok(event) => event,
                    Err(err) if err.is_disconnected() => vanished_worker(),
                    Err(_) => return None,
                }
            };
            if let Some(summary) = self.handle_event(event, sink) {
                return Some(summary);
            }
        }
    }

    /// Waits up to `timeout` for the next worker event and applies it.
    pub fn wait_event<S>(&mut self, sink: &mut S, timeout: Duration) -> Option<RenderSummary>
    where
        S: PixelSink + ?Sized,
    {
        let event = {
            let session = self.session.as_ref()?;
            match session.events.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Disconnected) => vanished_worker(),
                Err(RecvTimeoutError::Timeout) => return None,
            }
        };
        self.handle_event(event, sink)
    }

    /// Drives the live session to completion.
    ///
    /// Multiplexes worker events, control commands and the progress cadence on
    /// the calling thread. Invalid commands are logged and ignored.
    pub fn run<S, P>(
        &mut self,
        sink: &mut S,
        progress: &mut P,
        commands: &Receiver<ControlCommand>,
    ) -> Result<RenderSummary, RenderError>
    where
        S: PixelSink + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let events = match self.session.as_ref() {
            Some(session) => session.events.clone(),
            None => return Err(RenderError::NoSession),
        };
        let ticker = tick(self.progress_interval);
        let mut commands = commands.clone();

        loop {
            let mut commands_closed = false;
            select! {
                recv(events) -> message => {
                    let event = message.unwrap_or_else(|_| vanished_worker());
                    if let Some(summary) = self.handle_event(event, sink) {
                        return Ok(summary);
                    }
                }
                recv(commands) -> command => match command {
                    Ok(command) => {
                        if let Err(err) = self.apply(command) {
                            warn!(%command, error = %err, "ignoring control command");
                        }
                    }
                    Err(_) => commands_closed = true,
                },
                recv(ticker) -> _ => {
                    self.tick(progress);
                }
            }
            if commands_closed {
                debug!("control channel closed");
                commands = never();
            }
        }
    }

    fn handle_event<S>(&mut self, event: WorkerEvent, sink: &mut S) -> Option<RenderSummary>
    where
        S: PixelSink + ?Sized,
    {
        match event {
            WorkerEvent::Batch(batch) => {
                let delivered = batch.len() as u64;
                sink.apply_batch(batch);
                if let Some(session) = self.session.as_mut() {
                    session.pixels_rendered += delivered;
                }
                None
            }
            WorkerEvent::Finished(outcome) => {
                let summary = self.finish_session(outcome)?;
                sink.on_complete(&summary);
                Some(summary)
            }
        }
    }

    fn finish_session(&mut self, outcome: RenderOutcome) -> Option<RenderSummary> {
        let mut session = self.session.take()?;
        let now = Instant::now();
        let elapsed = session.estimator.finish(now);
        session.worker.join();

        let summary = RenderSummary {
            outcome,
            elapsed,
            pixels_rendered: session.pixels_rendered,
            pixels_total: session.params.pixel_count(),
        };
        match &summary.outcome {
            RenderOutcome::Failed(message) => warn!(
                error = %message,
                pixels = summary.pixels_rendered,
                "render finished with error"
            ),
            outcome => info!(
                ?outcome,
                pixels = summary.pixels_rendered,
                total = summary.pixels_total,
                elapsed_ms = elapsed.as_millis() as u64,
                wall_ms = now.saturating_duration_since(session.started_at).as_millis() as u64,
                "render finished"
            ),
        }

        match self.state.next(Transition::Complete) {
            Some(next) => self.set_state(next),
            None => self.set_state(RenderState::Waiting),
        }
        Some(summary)
    }

    fn transition(&self, transition: Transition) -> Result<RenderState, RenderError> {
        self.state.next(transition).ok_or_else(|| {
            warn!(%transition, state = %self.state, "rejected render control call");
            RenderError::invalid(transition, self.state)
        })
    }

    fn set_state(&mut self, next: RenderState) {
        debug!(from = %self.state, to = %next, "render state changed");
        self.state = next;
    }
}

impl Default for RenderController {
    fn default() -> Self {
        Self::new(WorkerSettings::default())
    }
}

impl fmt::Debug for RenderController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderController")
            .field("state", &self.state)
            .field("pixels_rendered", &self.pixels_rendered())
            .field("pixels_total", &self.pixels_total())
            .finish()
    }
}

/// The worker dropped its sender without a completion message. Only possible
/// if the thread died outside the scene's render loop.
fn vanished_worker() -> WorkerEvent {
    WorkerEvent::Finished(RenderOutcome::Failed(
        "render worker exited without reporting completion".into(),
    ))
}
