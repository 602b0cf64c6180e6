use reveal_core::{
    Answer, Epoch, Player, Question, ResetOutcome, RevealError, RoundSnapshot, StageUpdate,
    StepOutcome,
};
use tokio::sync::{broadcast, oneshot};

use crate::events::RoundEvent;
use crate::sequencer::RevealHandle;

/// Commands sent to the round actor. Each embeds a oneshot for the reply.
pub(crate) enum RoundCommand {
    ResetForRound {
        round_index: usize,
        players: Vec<Player>,
        reply: oneshot::Sender<ResetOutcome>,
    },
    RefreshRoster {
        players: Vec<Player>,
        reply: oneshot::Sender<()>,
    },
    BeginReveal {
        question: Question,
        answers: Vec<Answer>,
        players: Vec<Player>,
        reply: oneshot::Sender<RevealHandle>,
    },
    /// Sent by a running sequencer; applied only if `epoch` is current.
    Stage {
        epoch: Epoch,
        update: StageUpdate,
        reply: oneshot::Sender<StepOutcome>,
    },
    SetFinalizing {
        epoch: Epoch,
        finalizing: bool,
        reply: oneshot::Sender<StepOutcome>,
    },
    RecordError {
        epoch: Epoch,
        error: RevealError,
        reply: oneshot::Sender<StepOutcome>,
    },
    GetSnapshot {
        reply: oneshot::Sender<RoundSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(RoundSnapshot, broadcast::Receiver<RoundEvent>)>,
    },
    Shutdown,
}
