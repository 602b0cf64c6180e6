//! The timed reveal timeline.
//!
//! A sequencer runs in its own task and owns no round state. It paces itself
//! with fixed sleeps matching the animations it requests, checks the round
//! epoch before every viewport command, and hands each state change back to
//! the round actor tagged with the epoch it was started under.

use reveal_core::{BeginRefusal, Epoch, RevealError, RevealPlan, RevealStage, StageUpdate, StepOutcome};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use viewport_client::ViewportSlot;

use crate::commands::RoundCommand;
use crate::config::RevealConfig;
use crate::lifecycle::RoundSignal;

/// How a reveal sequence ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    Completed,
    /// Aborted with an error that was also recorded on the round.
    Failed(RevealError),
    /// The round moved on while the sequence was running.
    Cancelled,
    /// The sequence never started.
    Ignored(BeginRefusal),
}

enum HandleInner {
    Running {
        epoch: Epoch,
        task: JoinHandle<RevealOutcome>,
    },
    Finished {
        epoch: Epoch,
        outcome: RevealOutcome,
    },
    Ignored(BeginRefusal),
}

/// Returned by `begin_reveal`. Await [`RevealHandle::wait`] to observe how
/// the sequence ended; dropping the handle does not stop it.
pub struct RevealHandle {
    inner: HandleInner,
}

impl std::fmt::Debug for RevealHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealHandle")
            .field("epoch", &self.epoch())
            .field("refusal", &self.refusal())
            .finish()
    }
}

impl RevealHandle {
    pub(crate) fn running(epoch: Epoch, task: JoinHandle<RevealOutcome>) -> Self {
        Self {
            inner: HandleInner::Running { epoch, task },
        }
    }

    pub(crate) fn finished(epoch: Epoch, outcome: RevealOutcome) -> Self {
        Self {
            inner: HandleInner::Finished { epoch, outcome },
        }
    }

    pub(crate) fn ignored(refusal: BeginRefusal) -> Self {
        Self {
            inner: HandleInner::Ignored(refusal),
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.inner, HandleInner::Ignored(_))
    }

    /// Epoch the sequence runs under, if it started.
    pub fn epoch(&self) -> Option<Epoch> {
        match self.inner {
            HandleInner::Running { epoch, .. } | HandleInner::Finished { epoch, .. } => Some(epoch),
            HandleInner::Ignored(_) => None,
        }
    }

    pub fn refusal(&self) -> Option<BeginRefusal> {
        match self.inner {
            HandleInner::Ignored(refusal) => Some(refusal),
            _ => None,
        }
    }

    pub async fn wait(self) -> RevealOutcome {
        match self.inner {
            HandleInner::Running { task, .. } => task.await.unwrap_or_else(|e| {
                tracing::error!("Reveal task did not finish: {}", e);
                RevealOutcome::Cancelled
            }),
            HandleInner::Finished { outcome, .. } => outcome,
            HandleInner::Ignored(refusal) => RevealOutcome::Ignored(refusal),
        }
    }
}

enum Abort {
    /// Epoch moved on; stop without touching state.
    Stale,
    Failed(RevealError),
}

pub(crate) struct RevealSequencer {
    plan: RevealPlan,
    epoch: Epoch,
    signal_rx: watch::Receiver<RoundSignal>,
    viewport: ViewportSlot,
    config: RevealConfig,
    cmd_tx: mpsc::Sender<RoundCommand>,
}

impl RevealSequencer {
    pub(crate) fn new(
        plan: RevealPlan,
        epoch: Epoch,
        signal_rx: watch::Receiver<RoundSignal>,
        viewport: ViewportSlot,
        config: RevealConfig,
        cmd_tx: mpsc::Sender<RoundCommand>,
    ) -> Self {
        Self {
            plan,
            epoch,
            signal_rx,
            viewport,
            config,
            cmd_tx,
        }
    }

    pub(crate) async fn run(self) -> RevealOutcome {
        tracing::info!(epoch = %self.epoch, markers = self.plan.marker_count(), "Reveal started");

        match self.run_stages().await {
            Ok(()) => {
                tracing::info!(epoch = %self.epoch, "Reveal complete");
                RevealOutcome::Completed
            }
            Err(Abort::Stale) => {
                tracing::debug!(epoch = %self.epoch, "Reveal superseded by a newer round");
                RevealOutcome::Cancelled
            }
            Err(Abort::Failed(err)) => {
                tracing::warn!(epoch = %self.epoch, error = %err, "Reveal aborted");
                match self.apply(StageUpdate::Failed(err.clone()), RevealStage::Complete).await {
                    Ok(()) => RevealOutcome::Failed(err),
                    Err(_) => RevealOutcome::Cancelled,
                }
            }
        }
    }

    async fn run_stages(&self) -> Result<(), Abort> {
        self.ensure_current(RevealStage::FlyToCorrect)?;
        self.viewport
            .fly_to(
                self.plan.correct,
                self.config.close_zoom,
                self.config.fly_duration,
            )
            .map_err(|_| Abort::Failed(RevealError::ViewportUnavailable(RevealStage::FlyToCorrect)))?;
        self.apply(StageUpdate::FlightStarted, RevealStage::FlyToCorrect)
            .await?;
        tokio::time::sleep(self.config.fly_duration).await;

        self.ensure_current(RevealStage::ShowCorrect)?;
        self.apply(
            StageUpdate::CorrectShown(self.plan.correct_marker.clone()),
            RevealStage::ShowCorrect,
        )
        .await?;
        tokio::time::sleep(self.config.correct_dwell).await;

        self.ensure_current(RevealStage::ShowGuesses)?;
        self.apply(
            StageUpdate::GuessesShown(self.plan.guesses.clone()),
            RevealStage::ShowGuesses,
        )
        .await?;

        self.ensure_current(RevealStage::FitBounds)?;
        self.viewport
            .fit_bounds(
                self.plan.bounds,
                self.config.fit_padding,
                self.config.fit_duration,
            )
            .map_err(|_| Abort::Failed(RevealError::ViewportUnavailable(RevealStage::FitBounds)))?;
        tokio::time::sleep(self.config.fit_duration).await;

        self.ensure_current(RevealStage::Complete)?;
        self.apply(StageUpdate::Completed, RevealStage::Complete)
            .await
    }

    fn ensure_current(&self, stage: RevealStage) -> Result<(), Abort> {
        let current = self.signal_rx.borrow().epoch;
        if current != self.epoch {
            tracing::debug!(%stage, started = %self.epoch, %current, "Epoch advanced, stopping");
            return Err(Abort::Stale);
        }
        tracing::debug!(%stage, epoch = %self.epoch, "Reveal stage");
        Ok(())
    }

    async fn apply(&self, update: StageUpdate, stage: RevealStage) -> Result<(), Abort> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(RoundCommand::Stage {
                epoch: self.epoch,
                update,
                reply: tx,
            })
            .await
            .map_err(|_| Abort::Stale)?;

        match rx.await {
            Ok(StepOutcome::Applied) => Ok(()),
            Ok(StepOutcome::Stale) | Err(_) => Err(Abort::Stale),
            Ok(StepOutcome::Rejected) => Err(Abort::Failed(RevealError::OutOfOrder(stage))),
        }
    }
}
