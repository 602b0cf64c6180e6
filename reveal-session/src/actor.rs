use reveal_core::{
    answers_for_round, Answer, Player, Question, ResetOutcome, RevealPlan, RoundState,
    StageUpdate, StepOutcome,
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::Instrument;
use viewport_client::ViewportSlot;

use crate::commands::RoundCommand;
use crate::config::RevealConfig;
use crate::events::RoundEvent;
use crate::lifecycle::{recenter_after_reset, RoundSignal};
use crate::sequencer::{RevealHandle, RevealOutcome, RevealSequencer};

/// Everything the actor owns. RoundState is only ever touched here.
pub(crate) struct RoundActor {
    pub state: RoundState,
    pub config: RevealConfig,
    pub viewport: ViewportSlot,
    /// Live epoch and reveal-started flag for sequencer and recenter tasks.
    pub signal_tx: watch::Sender<RoundSignal>,
    pub event_tx: broadcast::Sender<RoundEvent>,
    /// Handed to sequencers so their updates come back through the queue.
    /// Weak so that dropping every handle still closes the channel.
    pub self_tx: mpsc::WeakSender<RoundCommand>,
}

/// The main round actor loop.
/// Processes commands sequentially until shutdown or until every handle is gone.
pub(crate) async fn run_round_actor(
    id: String,
    actor: RoundActor,
    cmd_rx: mpsc::Receiver<RoundCommand>,
) {
    run_round_actor_inner(actor, cmd_rx)
        .instrument(tracing::info_span!("round", id = %id))
        .await;
}

async fn run_round_actor_inner(mut actor: RoundActor, mut cmd_rx: mpsc::Receiver<RoundCommand>) {
    tracing::info!("Round actor started");

    while let Some(cmd) = cmd_rx.recv().await {
        if !actor.handle_command(cmd) {
            break;
        }
    }

    tracing::info!("Round actor exited");
}

impl RoundActor {
    /// Returns false once the actor should stop.
    fn handle_command(&mut self, cmd: RoundCommand) -> bool {
        match cmd {
            RoundCommand::ResetForRound {
                round_index,
                players,
                reply,
            } => {
                let outcome = self.reset_for_round(round_index, &players);
                let _ = reply.send(outcome);
            }
            RoundCommand::RefreshRoster { players, reply } => {
                self.state.refresh_roster(&players);
                self.broadcast_state();
                let _ = reply.send(());
            }
            RoundCommand::BeginReveal {
                question,
                answers,
                players,
                reply,
            } => {
                let handle = self.begin_reveal(question, answers, players);
                let _ = reply.send(handle);
            }
            RoundCommand::Stage {
                epoch,
                update,
                reply,
            } => {
                let error = match &update {
                    StageUpdate::Failed(err) => Some(err.to_string()),
                    _ => None,
                };
                let outcome = self.state.apply(epoch, update);
                match outcome {
                    StepOutcome::Applied => {
                        self.broadcast_state();
                        if let Some(message) = error {
                            let _ = self.event_tx.send(RoundEvent::Error(message));
                        }
                    }
                    StepOutcome::Stale => {
                        tracing::debug!(%epoch, "Dropped stale reveal update");
                    }
                    StepOutcome::Rejected => {
                        tracing::warn!(%epoch, phase = ?self.state.phase(), "Rejected reveal update");
                    }
                }
                let _ = reply.send(outcome);
            }
            RoundCommand::SetFinalizing {
                epoch,
                finalizing,
                reply,
            } => {
                let outcome = self.state.set_finalizing(epoch, finalizing);
                if outcome == StepOutcome::Applied {
                    self.broadcast_state();
                }
                let _ = reply.send(outcome);
            }
            RoundCommand::RecordError {
                epoch,
                error,
                reply,
            } => {
                let outcome = self.state.record_error(epoch, &error);
                if outcome == StepOutcome::Applied {
                    self.broadcast_state();
                    let _ = self.event_tx.send(RoundEvent::Error(error.to_string()));
                }
                let _ = reply.send(outcome);
            }
            RoundCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
            RoundCommand::Subscribe { reply } => {
                let rx = self.event_tx.subscribe();
                let _ = reply.send((self.state.snapshot(), rx));
            }
            RoundCommand::Shutdown => {
                tracing::info!("Round actor shutting down");
                return false;
            }
        }
        true
    }

    fn reset_for_round(&mut self, round_index: usize, players: &[Player]) -> ResetOutcome {
        let outcome = self.state.reset_for_round(round_index, players);
        let ResetOutcome::Reset(epoch) = outcome else {
            tracing::debug!(round_index, "Round already active, reset ignored");
            return outcome;
        };

        tracing::info!(round_index, %epoch, players = players.len(), "Round reset");
        self.signal_tx.send_replace(RoundSignal::new(epoch));

        let _ = self.event_tx.send(RoundEvent::ViewportRemount {
            key: self.state.viewport_key(),
        });
        self.broadcast_state();

        tokio::spawn(
            recenter_after_reset(
                self.viewport.clone(),
                self.signal_tx.subscribe(),
                epoch,
                self.config.world_view,
                self.config.ready_timeout,
            )
            .in_current_span(),
        );

        outcome
    }

    fn begin_reveal(
        &mut self,
        question: Question,
        answers: Vec<Answer>,
        players: Vec<Player>,
    ) -> RevealHandle {
        let epoch = match self.state.begin_sequence() {
            Ok(epoch) => epoch,
            Err(refusal) => {
                tracing::debug!(%refusal, "Reveal request ignored");
                return RevealHandle::ignored(refusal);
            }
        };
        self.signal_tx.send_modify(|signal| {
            if signal.epoch == epoch {
                signal.reveal_started = true;
            }
        });

        let answers = answers_for_round(&answers, question.round_id);
        let plan = match RevealPlan::new(&question, &answers, &players) {
            Ok(plan) => plan,
            Err(err) => {
                self.state.apply(epoch, StageUpdate::Failed(err.clone()));
                self.broadcast_state();
                return RevealHandle::finished(epoch, RevealOutcome::Failed(err));
            }
        };

        let Some(cmd_tx) = self.self_tx.upgrade() else {
            return RevealHandle::finished(epoch, RevealOutcome::Cancelled);
        };

        self.broadcast_state();

        let sequencer = RevealSequencer::new(
            plan,
            epoch,
            self.signal_tx.subscribe(),
            self.viewport.clone(),
            self.config.clone(),
            cmd_tx,
        );
        let task = tokio::spawn(sequencer.run().in_current_span());
        RevealHandle::running(epoch, task)
    }

    fn broadcast_state(&self) {
        let _ = self
            .event_tx
            .send(RoundEvent::StateChanged(self.state.snapshot()));
    }
}
