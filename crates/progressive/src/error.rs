use crate::state::{RenderState, Transition};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot {transition} while {state}")]
    InvalidTransition {
        transition: Transition,
        state: RenderState,
    },
    #[error("failed to build scene: {0:#}")]
    SceneBuild(anyhow::Error),
    #[error("no render session is running")]
    NoSession,
    #[error("failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn invalid(transition: Transition, state: RenderState) -> Self {
        RenderError::InvalidTransition { transition, state }
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, RenderError::InvalidTransition { .. })
    }
}
