use std::fmt;
use std::time::{Duration, Instant};

/// Default cadence for progress estimates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Wall clock that only advances while running.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    pub fn started(now: Instant) -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: Some(now),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }
}

/// One progress estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub elapsed: Duration,
    /// Delivered pixels over total pixels, in `0.0..=1.0`.
    pub completed_fraction: f64,
    /// `None` until at least one pixel was delivered.
    pub eta: Option<Duration>,
    pub pixels_rendered: u64,
    pub pixels_total: u64,
}

impl ProgressSample {
    pub fn percent(&self) -> u32 {
        (self.completed_fraction * 100.0).floor() as u32
    }
}

impl fmt::Display for ProgressSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rendering...{}% Elapsed Time: {}",
            self.percent(),
            format_clock(self.elapsed)
        )?;
        if let Some(eta) = self.eta {
            write!(f, " / ETA: {}", format_clock(eta))?;
        }
        Ok(())
    }
}

/// Linear extrapolation of the remaining render time.
pub fn estimate(elapsed: Duration, pixels_rendered: u64, pixels_total: u64) -> ProgressSample {
    let completed_fraction = if pixels_total == 0 {
        0.0
    } else {
        (pixels_rendered as f64 / pixels_total as f64).clamp(0.0, 1.0)
    };

    let eta = if completed_fraction > 0.0 {
        let remaining =
            elapsed.as_secs_f64() / completed_fraction * (1.0 - completed_fraction);
        Some(Duration::from_secs_f64(remaining.max(0.0)))
    } else {
        None
    };

    ProgressSample {
        elapsed,
        completed_fraction,
        eta,
        pixels_rendered,
        pixels_total,
    }
}

/// Tracks render time for one session and turns pixel counts into estimates.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEstimator {
    stopwatch: Stopwatch,
    pixels_total: u64,
}

impl ProgressEstimator {
    pub fn start(pixels_total: u64, now: Instant) -> Self {
        Self {
            stopwatch: Stopwatch::started(now),
            pixels_total,
        }
    }

    pub fn pixels_total(&self) -> u64 {
        self.pixels_total
    }

    /// Freezes the elapsed-time clock.
    pub fn pause(&mut self, now: Instant) {
        self.stopwatch.pause(now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.stopwatch.resume(now);
    }

    pub fn is_paused(&self) -> bool {
        !self.stopwatch.is_running()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.stopwatch.elapsed(now)
    }

    pub fn sample(&self, pixels_rendered: u64, now: Instant) -> ProgressSample {
        estimate(self.elapsed(now), pixels_rendered, self.pixels_total)
    }

    /// Stops the clock for good and returns the final render time.
    pub fn finish(&mut self, now: Instant) -> Duration {
        self.stopwatch.pause(now);
        self.stopwatch.elapsed(now)
    }
}

/// Formats a duration as `HH:MM:SS`.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}
