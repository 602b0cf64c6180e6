//! Host-side gate in front of the round actor.
//!
//! The host owns the current round's inputs, decides when a reveal may be
//! requested, makes the external finalize call first, and advances the game
//! once the reveal is complete.

use reveal_core::{Answer, Epoch, Player, Question, ResetOutcome, RevealError, RevealPhase, MAX_ROUNDS};
use thiserror::Error;

use crate::backend::GameBackend;
use crate::error::SessionError;
use crate::handle::RoundHandle;
use crate::sequencer::RevealHandle;

/// Inputs for one round, as delivered by the game.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundProps {
    pub round_index: usize,
    pub question: Question,
    pub players: Vec<Player>,
    /// May include answers for other rounds; only this question's are revealed.
    pub answers: Vec<Answer>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateBlocked {
    #[error("no round loaded")]
    NoRound,
    #[error("no players in this round")]
    NoPlayers,
    #[error("{0} player(s) still answering")]
    PlayersPending(usize),
    #[error("a reveal is already in progress")]
    Busy,
    #[error("reveal not allowed in phase {0:?}")]
    NotIdle(RevealPhase),
}

#[derive(Debug)]
pub enum RequestOutcome {
    Started(RevealHandle),
    /// Nothing happened; no external call was made.
    Blocked(GateBlocked),
    /// The finalize call failed; the error is shown on the round.
    Failed(RevealError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    NextRound(usize),
    GameOver,
    Blocked(GateBlocked),
    Failed(RevealError),
}

pub struct RoundHost<B> {
    handle: RoundHandle,
    backend: B,
    props: Option<RoundProps>,
    /// Epoch whose finalize call already succeeded; retries skip it.
    finalized: Option<Epoch>,
}

impl<B: GameBackend> RoundHost<B> {
    pub fn new(handle: RoundHandle, backend: B) -> Self {
        Self {
            handle,
            backend,
            props: None,
            finalized: None,
        }
    }

    pub fn handle(&self) -> &RoundHandle {
        &self.handle
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn props(&self) -> Option<&RoundProps> {
        self.props.as_ref()
    }

    /// Deliver new inputs. A new round index resets the round; the same
    /// index only refreshes the roster.
    pub async fn apply_props(&mut self, props: RoundProps) -> Result<ResetOutcome, SessionError> {
        let outcome = self
            .handle
            .reset_for_round(props.round_index, props.players.clone())
            .await?;

        match outcome {
            ResetOutcome::Reset(_) => self.finalized = None,
            ResetOutcome::Unchanged => self.handle.refresh_roster(props.players.clone()).await?,
        }

        self.props = Some(props);
        Ok(outcome)
    }

    /// Reveal the current round once every player has answered.
    pub async fn request_reveal(&mut self) -> Result<RequestOutcome, SessionError> {
        let Some(props) = self.props.as_ref() else {
            return Ok(RequestOutcome::Blocked(GateBlocked::NoRound));
        };

        let snapshot = self.handle.snapshot().await?;
        if snapshot.finalizing || snapshot.sequence_active {
            return Ok(RequestOutcome::Blocked(GateBlocked::Busy));
        }
        let retryable = snapshot.phase == RevealPhase::Revealing && snapshot.error.is_some();
        if snapshot.phase != RevealPhase::Idle && !retryable {
            return Ok(RequestOutcome::Blocked(GateBlocked::NotIdle(snapshot.phase)));
        }
        if snapshot.players.is_empty() {
            return Ok(RequestOutcome::Blocked(GateBlocked::NoPlayers));
        }
        let pending = snapshot.players.iter().filter(|p| !p.has_answered).count();
        if pending > 0 {
            tracing::debug!(pending, "Reveal requested before everyone answered");
            return Ok(RequestOutcome::Blocked(GateBlocked::PlayersPending(pending)));
        }

        let epoch = snapshot.epoch;
        if self.finalized != Some(epoch) {
            self.handle.set_finalizing(epoch, true).await?;
            let busy = FinalizingGuard::new(self.handle.clone(), epoch);
            let result = self
                .backend
                .finalize_reveal(props.round_index, &props.question)
                .await;
            busy.clear().await?;

            if let Err(e) = result {
                let err = RevealError::external("finalize round", e.0);
                tracing::warn!(round_index = props.round_index, error = %err, "Finalize failed");
                self.handle.record_error(epoch, err.clone()).await?;
                return Ok(RequestOutcome::Failed(err));
            }
            self.finalized = Some(epoch);
        }

        let reveal = self
            .handle
            .begin_reveal(
                props.question.clone(),
                props.answers.clone(),
                props.players.clone(),
            )
            .await?;

        if !reveal.is_started() {
            return Ok(RequestOutcome::Blocked(GateBlocked::Busy));
        }
        Ok(RequestOutcome::Started(reveal))
    }

    /// Move the game on after a completed reveal. The caller delivers the
    /// next round's props via [`RoundHost::apply_props`].
    pub async fn advance_round(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let Some(round_index) = self.props.as_ref().map(|p| p.round_index) else {
            return Ok(AdvanceOutcome::Blocked(GateBlocked::NoRound));
        };

        let snapshot = self.handle.snapshot().await?;
        if !snapshot.reveal_complete() {
            return Ok(AdvanceOutcome::Blocked(GateBlocked::NotIdle(snapshot.phase)));
        }

        if let Err(e) = self.backend.advance_round(round_index).await {
            let err = RevealError::external("advance round", e.0);
            tracing::warn!(round_index, error = %err, "Advance failed");
            self.handle.record_error(snapshot.epoch, err.clone()).await?;
            return Ok(AdvanceOutcome::Failed(err));
        }

        let next = round_index + 1;
        if next >= MAX_ROUNDS {
            tracing::info!(round_index, "Final round complete");
            Ok(AdvanceOutcome::GameOver)
        } else {
            Ok(AdvanceOutcome::NextRound(next))
        }
    }
}

/// Clears the busy flag even when the request future is dropped mid-finalize.
struct FinalizingGuard {
    handle: Option<RoundHandle>,
    epoch: Epoch,
}

impl FinalizingGuard {
    fn new(handle: RoundHandle, epoch: Epoch) -> Self {
        Self {
            handle: Some(handle),
            epoch,
        }
    }

    async fn clear(mut self) -> Result<(), SessionError> {
        match self.handle.take() {
            Some(handle) => handle.set_finalizing(self.epoch, false).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

impl Drop for FinalizingGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let epoch = self.epoch;
        tracing::debug!(%epoch, "Reveal request dropped during finalize");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = handle.set_finalizing(epoch, false).await;
            });
        }
    }
}
