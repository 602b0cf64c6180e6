use reveal_core::{Answer, Epoch, Player, Question, ResetOutcome, RevealError, RoundSnapshot, StepOutcome};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::commands::RoundCommand;
use crate::error::SessionError;
use crate::events::RoundEvent;
use crate::sequencer::RevealHandle;

/// Cheap, cloneable handle to a round actor.
#[derive(Clone)]
pub struct RoundHandle {
    id: String,
    cmd_tx: mpsc::Sender<RoundCommand>,
}

impl RoundHandle {
    pub(crate) fn new(id: String, cmd_tx: mpsc::Sender<RoundCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start a fresh round. Ignored if `round_index` is already the current round.
    pub async fn reset_for_round(
        &self,
        round_index: usize,
        players: Vec<Player>,
    ) -> Result<ResetOutcome, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::ResetForRound {
            round_index,
            players,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn refresh_roster(&self, players: Vec<Player>) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::RefreshRoster { players, reply: tx })
            .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    /// Start the reveal timeline. The caller is responsible for checking that
    /// everyone has answered. A no-op (see [`RevealHandle::refusal`]) unless
    /// the round is idle with no reveal running.
    pub async fn begin_reveal(
        &self,
        question: Question,
        answers: Vec<Answer>,
        players: Vec<Player>,
    ) -> Result<RevealHandle, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::BeginReveal {
            question,
            answers,
            players,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn set_finalizing(
        &self,
        epoch: Epoch,
        finalizing: bool,
    ) -> Result<StepOutcome, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::SetFinalizing {
            epoch,
            finalizing,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn record_error(
        &self,
        epoch: Epoch,
        error: RevealError,
    ) -> Result<StepOutcome, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::RecordError {
            epoch,
            error,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn snapshot(&self) -> Result<RoundSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::GetSnapshot { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn subscribe(
        &self,
    ) -> Result<(RoundSnapshot, broadcast::Receiver<RoundEvent>), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoundCommand::Subscribe { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(RoundCommand::Shutdown).await;
    }

    async fn send(&self, cmd: RoundCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Closed)
    }
}
