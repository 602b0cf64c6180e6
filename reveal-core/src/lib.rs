//! Domain model for revealing a map-guessing round: players, answers,
//! markers, the reveal phase machine and the round state it drives.
//!
//! Nothing in this crate is async or performs I/O; timing and viewport
//! commands live in `reveal-session`.

pub mod bounds;
pub mod error;
pub mod marker;
pub mod phase;
pub mod state;
pub mod types;

pub use bounds::{calculate_bounds, Bounds, DEGENERATE_SPAN_DEG};
pub use error::RevealError;
pub use marker::{guess_markers, reveal_order, MarkerColor, MarkerKind, RevealMarker, RevealPlan};
pub use phase::{Epoch, RevealPhase, RevealStage};
pub use state::{
    BeginRefusal, ResetOutcome, RoundSnapshot, RoundState, StageUpdate, StepOutcome,
};
pub use types::{
    all_answered, answers_for_round, Answer, Coordinate, Player, PlayerId, PlayerSnapshot,
    Question, MAX_ROUNDS,
};
