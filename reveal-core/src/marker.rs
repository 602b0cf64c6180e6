//! Display-ready map markers and the ordering of guesses within a reveal.

use serde::Serialize;

use crate::bounds::{calculate_bounds, Bounds};
use crate::error::RevealError;
use crate::types::{Answer, Coordinate, Player, PlayerId, Question};

/// Number of distinct player colours before the palette repeats.
pub const PLAYER_PALETTE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerColor {
    Correct,
    Player(usize),
    /// Guess from someone not on the roster.
    Unknown,
}

impl MarkerColor {
    pub fn css_class(&self) -> String {
        match self {
            MarkerColor::Correct => "marker-correct".to_string(),
            MarkerColor::Player(slot) => format!("marker-player-{}", slot % PLAYER_PALETTE_SIZE),
            MarkerColor::Unknown => "marker-unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarkerKind {
    Correct,
    Guess { player_id: PlayerId, score: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealMarker {
    pub coordinate: Coordinate,
    pub color: MarkerColor,
    /// Filled markers are the correct location and guesses that scored.
    pub filled: bool,
    pub label: String,
    pub kind: MarkerKind,
}

impl RevealMarker {
    pub fn correct(question: &Question) -> Self {
        Self {
            coordinate: question.correct(),
            color: MarkerColor::Correct,
            filled: true,
            label: "\u{2713}".to_string(),
            kind: MarkerKind::Correct,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self.kind, MarkerKind::Correct)
    }
}

/// Answer indices ordered by score descending, then submission order.
pub fn reveal_order(answers: &[Answer]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..answers.len()).collect();
    order.sort_by_key(|&i| (std::cmp::Reverse(answers[i].score), i));
    order
}

/// One marker per answer, in reveal order.
pub fn guess_markers(answers: &[Answer], players: &[Player]) -> Vec<RevealMarker> {
    reveal_order(answers)
        .into_iter()
        .map(|i| {
            let answer = &answers[i];
            let slot = players.iter().position(|p| p.id == answer.player_id);
            let (color, label) = match slot {
                Some(slot) => (MarkerColor::Player(slot), players[slot].initials.clone()),
                None => (MarkerColor::Unknown, "?".to_string()),
            };
            RevealMarker {
                coordinate: answer.coordinate(),
                color,
                filled: answer.score > 0,
                label,
                kind: MarkerKind::Guess {
                    player_id: answer.player_id.clone(),
                    score: answer.score,
                },
            }
        })
        .collect()
}

/// Everything a reveal needs, computed up front from the round's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealPlan {
    pub correct: Coordinate,
    pub correct_marker: RevealMarker,
    pub guesses: Vec<RevealMarker>,
    pub bounds: Bounds,
}

impl RevealPlan {
    /// `answers` must already be limited to this question's round.
    pub fn new(
        question: &Question,
        answers: &[Answer],
        players: &[Player],
    ) -> Result<Self, RevealError> {
        let guesses = guess_markers(answers, players);
        let points: Vec<Coordinate> = std::iter::once(question.correct())
            .chain(guesses.iter().map(|m| m.coordinate))
            .collect();
        let bounds = calculate_bounds(&points)?;

        Ok(Self {
            correct: question.correct(),
            correct_marker: RevealMarker::correct(question),
            guesses,
            bounds,
        })
    }

    pub fn marker_count(&self) -> usize {
        1 + self.guesses.len()
    }
}
