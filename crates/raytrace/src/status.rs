use progressive::{format_clock, ProgressSample, ProgressSink, RenderOutcome, RenderSummary};
use tracing::{debug, info};

/// Logs progress whenever the whole-percent figure changes.
#[derive(Debug, Default)]
pub struct StatusLine {
    last_percent: Option<u32>,
    reports: u64,
}

impl StatusLine {
    pub fn reports(&self) -> u64 {
        self.reports
    }
}

impl ProgressSink for StatusLine {
    fn on_progress(&mut self, sample: &ProgressSample) {
        let percent = sample.percent();
        if self.last_percent == Some(percent) {
            debug!(
                pixels = sample.pixels_rendered,
                total = sample.pixels_total,
                "{sample}"
            );
            return;
        }
        self.last_percent = Some(percent);
        self.reports += 1;
        info!("{sample}");
    }
}

/// Final status message for a finished session.
pub fn completion_line(summary: &RenderSummary) -> String {
    let elapsed = format_clock(summary.elapsed);
    match &summary.outcome {
        RenderOutcome::Completed => format!("Rendering complete Elapsed Time: {elapsed}"),
        RenderOutcome::Cancelled => format!(
            "Rendering stopped at {}/{} pixels Elapsed Time: {elapsed}",
            summary.pixels_rendered, summary.pixels_total
        ),
        RenderOutcome::Failed(message) => {
            format!("Rendering failed: {message} Elapsed Time: {elapsed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progressive::estimate;
    use std::time::Duration;

    #[test]
    fn repeats_of_the_same_percent_are_not_reported() {
        let mut status = StatusLine::default();
        status.on_progress(&estimate(Duration::from_secs(1), 10, 100));
        status.on_progress(&estimate(Duration::from_secs(2), 10, 100));
        status.on_progress(&estimate(Duration::from_secs(3), 55, 100));
        assert_eq!(status.reports(), 2);
    }

    #[test]
    fn completion_lines_name_the_outcome() {
        let summary = RenderSummary {
            outcome: RenderOutcome::Completed,
            elapsed: Duration::from_secs(3_725),
            pixels_rendered: 4,
            pixels_total: 4,
        };
        assert_eq!(
            completion_line(&summary),
            "Rendering complete Elapsed Time: 01:02:05"
        );

        let stopped = RenderSummary {
            outcome: RenderOutcome::Cancelled,
            pixels_rendered: 2,
            ..summary.clone()
        };
        assert!(completion_line(&stopped).starts_with("Rendering stopped at 2/4 pixels"));

        let failed = RenderSummary {
            outcome: RenderOutcome::Failed("boom".into()),
            ..summary
        };
        assert!(completion_line(&failed).starts_with("Rendering failed: boom"));
    }
}
