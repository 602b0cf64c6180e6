use thiserror::Error;

use crate::phase::RevealStage;

/// User-visible failures of a reveal. Every variant is recoverable by
/// retrying the action that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    #[error("Map is not available ({0})")]
    ViewportUnavailable(RevealStage),

    #[error("Failed to {action}: {message}")]
    ExternalCallFailed {
        action: &'static str,
        message: String,
    },

    #[error("Cannot compute bounds of an empty point set")]
    EmptyBounds,

    #[error("Reveal step out of order ({0})")]
    OutOfOrder(RevealStage),
}

impl RevealError {
    pub fn external(action: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalCallFailed {
            action,
            message: message.into(),
        }
    }
}
