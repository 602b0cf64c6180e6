use serde::Serialize;

use crate::error::RevealError;
use crate::marker::RevealMarker;
use crate::phase::{Epoch, RevealPhase};
use crate::types::{Player, PlayerSnapshot};

/// A state change requested by a running reveal sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StageUpdate {
    /// The viewport accepted the fly-to; the reveal is now visible.
    FlightStarted,
    CorrectShown(RevealMarker),
    GuessesShown(Vec<RevealMarker>),
    Completed,
    Failed(RevealError),
}

/// Result of applying an epoch-tagged update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    /// The update belongs to an older epoch or a sequence that is no longer
    /// running. Nothing was changed.
    Stale,
    /// The update does not fit the current phase. Nothing was changed.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Reset(Epoch),
    /// Same round index as the current one; state left alone.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BeginRefusal {
    #[error("no round has been started")]
    NoRound,
    #[error("a reveal is already running")]
    SequenceActive,
    #[error("reveal not allowed in phase {0:?}")]
    NotIdle(RevealPhase),
}

/// Mutable per-round UI state. Owned by a single task; every mutation that
/// can arrive late carries the epoch it was started under.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    round_index: Option<usize>,
    epoch: Epoch,
    phase: RevealPhase,
    error: Option<String>,
    markers: Vec<RevealMarker>,
    players: Vec<PlayerSnapshot>,
    sequence_active: bool,
    finalizing: bool,
    viewport_key: u64,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn round_index(&self) -> Option<usize> {
        self.round_index
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn markers(&self) -> &[RevealMarker] {
        &self.markers
    }

    pub fn players(&self) -> &[PlayerSnapshot] {
        &self.players
    }

    pub fn is_sequence_active(&self) -> bool {
        self.sequence_active
    }

    pub fn is_finalizing(&self) -> bool {
        self.finalizing
    }

    pub fn viewport_key(&self) -> u64 {
        self.viewport_key
    }

    /// Hard reset for a new round. Repeated calls for the current round are
    /// ignored so that re-delivered props cannot wipe an in-flight reveal.
    pub fn reset_for_round(&mut self, round_index: usize, players: &[Player]) -> ResetOutcome {
        if self.round_index == Some(round_index) {
            return ResetOutcome::Unchanged;
        }

        self.round_index = Some(round_index);
        self.epoch = self.epoch.next();
        self.phase = RevealPhase::Idle;
        self.error = None;
        self.markers.clear();
        self.players = players.iter().map(PlayerSnapshot::capture).collect();
        self.sequence_active = false;
        self.finalizing = false;
        self.viewport_key += 1;

        ResetOutcome::Reset(self.epoch)
    }

    /// Update answered flags and scores without resetting the round.
    /// `last_score` is kept for known players.
    pub fn refresh_roster(&mut self, players: &[Player]) {
        self.players = players
            .iter()
            .map(|p| match self.players.iter().find(|s| s.id == p.id) {
                Some(existing) => PlayerSnapshot {
                    id: p.id.clone(),
                    initials: p.initials.clone(),
                    score: p.score,
                    last_score: existing.last_score,
                    has_answered: p.has_answered,
                },
                None => PlayerSnapshot::capture(p),
            })
            .collect();
    }

    /// Whether a new sequence may start now. A sequence that failed after
    /// the reveal became visible may be restarted.
    pub fn check_begin(&self) -> Result<(), BeginRefusal> {
        if self.round_index.is_none() {
            return Err(BeginRefusal::NoRound);
        }
        if self.sequence_active {
            return Err(BeginRefusal::SequenceActive);
        }
        match self.phase {
            RevealPhase::Idle => Ok(()),
            RevealPhase::Revealing if self.error.is_some() => Ok(()),
            phase => Err(BeginRefusal::NotIdle(phase)),
        }
    }

    /// Mark a sequence as running under the current epoch.
    pub fn begin_sequence(&mut self) -> Result<Epoch, BeginRefusal> {
        self.check_begin()?;
        self.sequence_active = true;
        self.error = None;
        Ok(self.epoch)
    }

    pub fn apply(&mut self, epoch: Epoch, update: StageUpdate) -> StepOutcome {
        if epoch != self.epoch || !self.sequence_active {
            return StepOutcome::Stale;
        }

        match update {
            StageUpdate::FlightStarted => match self.phase {
                RevealPhase::Idle => self.phase = RevealPhase::Revealing,
                RevealPhase::Revealing => {}
                RevealPhase::RevealComplete => return StepOutcome::Rejected,
            },
            StageUpdate::CorrectShown(marker) => {
                if self.phase != RevealPhase::Revealing || !marker.is_correct() {
                    return StepOutcome::Rejected;
                }
                if !self.has_correct_marker() {
                    self.markers.insert(0, marker);
                }
            }
            StageUpdate::GuessesShown(guesses) => {
                if self.phase != RevealPhase::Revealing || !self.has_correct_marker() {
                    return StepOutcome::Rejected;
                }
                self.markers.truncate(1);
                self.markers.extend(guesses);
            }
            StageUpdate::Completed => {
                if !self.phase.can_advance_to(RevealPhase::RevealComplete) {
                    return StepOutcome::Rejected;
                }
                self.phase = RevealPhase::RevealComplete;
                self.sequence_active = false;
            }
            StageUpdate::Failed(err) => {
                self.error = Some(err.to_string());
                self.sequence_active = false;
            }
        }

        StepOutcome::Applied
    }

    /// Busy flag shown while the host waits on an external call.
    pub fn set_finalizing(&mut self, epoch: Epoch, finalizing: bool) -> StepOutcome {
        if epoch != self.epoch {
            return StepOutcome::Stale;
        }
        self.finalizing = finalizing;
        StepOutcome::Applied
    }

    /// Surface an error without touching the phase.
    pub fn record_error(&mut self, epoch: Epoch, err: &RevealError) -> StepOutcome {
        if epoch != self.epoch {
            return StepOutcome::Stale;
        }
        self.error = Some(err.to_string());
        StepOutcome::Applied
    }

    fn has_correct_marker(&self) -> bool {
        self.markers.first().is_some_and(RevealMarker::is_correct)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round_index: self.round_index,
            epoch: self.epoch,
            phase: self.phase,
            error: self.error.clone(),
            markers: self.markers.clone(),
            players: self.players.clone(),
            sequence_active: self.sequence_active,
            finalizing: self.finalizing,
            viewport_key: self.viewport_key,
        }
    }
}

/// Immutable copy of [`RoundState`] handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSnapshot {
    pub round_index: Option<usize>,
    pub epoch: Epoch,
    pub phase: RevealPhase,
    pub error: Option<String>,
    pub markers: Vec<RevealMarker>,
    pub players: Vec<PlayerSnapshot>,
    pub sequence_active: bool,
    pub finalizing: bool,
    pub viewport_key: u64,
}

impl RoundSnapshot {
    pub fn reveal_complete(&self) -> bool {
        self.phase == RevealPhase::RevealComplete
    }
}
