use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rounds in one game.
pub const MAX_ROUNDS: usize = 5;

/// A point on the map in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a `[lng, lat]` pair, the order map widgets use.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player as delivered by the roster collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub initials: String,
    pub score: i64,
    #[serde(default)]
    pub has_answered: bool,
}

/// A submitted guess. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub player_id: PlayerId,
    pub round_id: u32,
    pub lat: f64,
    pub lng: f64,
    pub score: i64,
    /// Distance from the correct location, in kilometres.
    #[serde(default)]
    pub distance_km: f64,
}

impl Answer {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// The question for one round, including the correct location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub round_id: u32,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Question {
    pub fn correct(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// Answers tagged with the given round, in submission order.
pub fn answers_for_round(answers: &[Answer], round_id: u32) -> Vec<Answer> {
    answers
        .iter()
        .filter(|a| a.round_id == round_id)
        .cloned()
        .collect()
}

/// Per-round view of a player, with the score captured when the round began.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub initials: String,
    pub score: i64,
    pub last_score: i64,
    pub has_answered: bool,
}

impl PlayerSnapshot {
    pub fn capture(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            initials: player.initials.clone(),
            score: player.score,
            last_score: player.score,
            has_answered: player.has_answered,
        }
    }

    /// Points gained since the round started.
    pub fn score_delta(&self) -> i64 {
        self.score - self.last_score
    }
}

/// True when the roster is non-empty and everyone has submitted.
pub fn all_answered(players: &[Player]) -> bool {
    !players.is_empty() && players.iter().all(|p| p.has_answered)
}
