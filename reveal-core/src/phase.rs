use serde::Serialize;
use std::fmt;

/// Where a round is in its reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RevealPhase {
    #[default]
    Idle,
    Revealing,
    RevealComplete,
}

impl RevealPhase {
    /// Forward transitions only. Going back to Idle is a reset, not a transition.
    pub fn can_advance_to(self, next: RevealPhase) -> bool {
        matches!(
            (self, next),
            (RevealPhase::Idle, RevealPhase::Revealing)
                | (RevealPhase::Revealing, RevealPhase::RevealComplete)
        )
    }
}

/// The ordered steps of a reveal timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RevealStage {
    FlyToCorrect,
    ShowCorrect,
    ShowGuesses,
    FitBounds,
    Complete,
}

impl fmt::Display for RevealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevealStage::FlyToCorrect => "fly to correct location",
            RevealStage::ShowCorrect => "show correct location",
            RevealStage::ShowGuesses => "show guesses",
            RevealStage::FitBounds => "fit all guesses",
            RevealStage::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Monotonic round version. Work started under an older epoch must not
/// touch state belonging to a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Epoch(pub u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
