//! Scripted games for the CLI host.
//!
//! A scenario fixes the roster and, for each round, the question and every
//! player's scored answer. Scores on the roster accumulate round by round the
//! way a game backend would report them.

use std::collections::HashSet;
use std::path::Path;

use reveal_core::{Answer, Player, PlayerId, Question, MAX_ROUNDS};
use reveal_session::RoundProps;
use serde::{Deserialize, Serialize};

const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.json");

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scenario has no players")]
    NoPlayers,

    #[error("scenario has no rounds")]
    NoRounds,

    #[error("scenario has {0} rounds, at most {MAX_ROUNDS} are played")]
    TooManyRounds(usize),

    #[error("round {round}: answer from unknown player {player}")]
    UnknownPlayer { round: usize, player: PlayerId },

    #[error("round {round}: answer tagged with round id {found}, expected {expected}")]
    RoundMismatch {
        round: usize,
        found: u32,
        expected: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedRound {
    pub question: Question,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub players: Vec<Player>,
    pub rounds: Vec<ScriptedRound>,
}

/// Which side of the finalize call a roster is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterPoint {
    /// Everyone has answered; this round's points are not yet counted.
    Answered,
    /// This round's points have been added.
    Scored,
}

impl Scenario {
    pub fn demo() -> Result<Self, ScenarioError> {
        Self::from_json(DEMO_SCENARIO)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.players.is_empty() {
            return Err(ScenarioError::NoPlayers);
        }
        if self.rounds.is_empty() {
            return Err(ScenarioError::NoRounds);
        }
        if self.rounds.len() > MAX_ROUNDS {
            return Err(ScenarioError::TooManyRounds(self.rounds.len()));
        }

        let known: HashSet<&PlayerId> = self.players.iter().map(|p| &p.id).collect();
        for (round, scripted) in self.rounds.iter().enumerate() {
            for answer in &scripted.answers {
                if !known.contains(&answer.player_id) {
                    return Err(ScenarioError::UnknownPlayer {
                        round,
                        player: answer.player_id.clone(),
                    });
                }
                if answer.round_id != scripted.question.round_id {
                    return Err(ScenarioError::RoundMismatch {
                        round,
                        found: answer.round_id,
                        expected: scripted.question.round_id,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Roster for `round_index`, with scores summed over earlier rounds (and
    /// this one when `point` is [`RosterPoint::Scored`]).
    pub fn roster(&self, round_index: usize, point: RosterPoint) -> Vec<Player> {
        let counted = match point {
            RosterPoint::Answered => round_index,
            RosterPoint::Scored => round_index + 1,
        };
        let current = self.rounds.get(round_index);

        self.players
            .iter()
            .map(|base| {
                let earned: i64 = self
                    .rounds
                    .iter()
                    .take(counted)
                    .flat_map(|r| r.answers.iter())
                    .filter(|a| a.player_id == base.id)
                    .map(|a| a.score)
                    .sum();
                let has_answered = current
                    .map(|r| r.answers.iter().any(|a| a.player_id == base.id))
                    .unwrap_or(false);
                Player {
                    score: base.score + earned,
                    has_answered,
                    ..base.clone()
                }
            })
            .collect()
    }

    /// Props delivered to the host for `round_index`. Every answer given so
    /// far is included, as a game backend would hand them over.
    pub fn props(&self, round_index: usize, point: RosterPoint) -> Option<RoundProps> {
        let scripted = self.rounds.get(round_index)?;
        let answers: Vec<Answer> = self
            .rounds
            .iter()
            .take(round_index + 1)
            .flat_map(|r| r.answers.iter().cloned())
            .collect();

        Some(RoundProps {
            round_index,
            question: scripted.question.clone(),
            players: self.roster(round_index, point),
            answers,
        })
    }
}
