use std::fmt;

/// Lifecycle of a render session as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderState {
    /// No session is live; a new render may be started.
    #[default]
    Waiting,
    /// The worker is producing pixels.
    Rendering,
    /// The worker is parked at its pause gate.
    Paused,
    /// Cancellation was requested; waiting for the worker to unwind.
    Stopped,
}

impl RenderState {
    /// True while a worker thread belongs to the session.
    pub fn is_live(self) -> bool {
        !matches!(self, RenderState::Waiting)
    }

    /// Transition table for the session lifecycle.
    ///
    /// Returns `None` when `transition` is not legal from `self`.
    pub fn next(self, transition: Transition) -> Option<RenderState> {
        use RenderState::*;
        use Transition::*;

        match (self, transition) {
            (Waiting, Start) => Some(Rendering),
            (Rendering, Pause) => Some(Paused),
            (Paused, Resume) => Some(Rendering),
            (Rendering | Paused, Stop) => Some(Stopped),
            // A completion can race with a pause request that was already
            // applied, so Paused finalises as well.
            (Rendering | Paused | Stopped, Complete) => Some(Waiting),
            _ => None,
        }
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderState::Waiting => "waiting",
            RenderState::Rendering => "rendering",
            RenderState::Paused => "paused",
            RenderState::Stopped => "stopped",
        })
    }
}

/// Events that drive [`RenderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
    /// The worker reported that the scene's render loop returned.
    Complete,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Stop => "stop",
            Transition::Complete => "complete",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RenderState::*;
    use super::Transition::*;
    use super::*;

    #[test]
    fn follows_lifecycle_table() {
        assert_eq!(Waiting.next(Start), Some(Rendering));
        assert_eq!(Rendering.next(Pause), Some(Paused));
        assert_eq!(Paused.next(Resume), Some(Rendering));
        assert_eq!(Rendering.next(Stop), Some(Stopped));
        assert_eq!(Paused.next(Stop), Some(Stopped));
        assert_eq!(Rendering.next(Complete), Some(Waiting));
        assert_eq!(Stopped.next(Complete), Some(Waiting));
    }

    #[test]
    fn rejects_illegal_control_calls() {
        assert_eq!(Waiting.next(Pause), None);
        assert_eq!(Stopped.next(Pause), None);
        assert_eq!(Waiting.next(Resume), None);
        assert_eq!(Rendering.next(Resume), None);
        assert_eq!(Stopped.next(Resume), None);
        assert_eq!(Waiting.next(Stop), None);
        assert_eq!(Stopped.next(Stop), None);
        for state in [Rendering, Paused, Stopped] {
            assert_eq!(state.next(Start), None, "start from {state}");
        }
        assert_eq!(Waiting.next(Complete), None);
    }
}
