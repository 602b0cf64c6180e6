//! External game-store callbacks the host must go through.

use async_trait::async_trait;
use reveal_core::Question;
use thiserror::Error;

/// A rejected external call. The message is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Persistence owned outside the reveal: finalizing a round before its
/// answers are shown, and moving the game on afterwards.
#[async_trait]
pub trait GameBackend: Send + Sync {
    async fn finalize_reveal(&self, round_index: usize, question: &Question)
        -> Result<(), BackendError>;

    async fn advance_round(&self, round_index: usize) -> Result<(), BackendError>;
}
