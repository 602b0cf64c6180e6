#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reveal_core::{Answer, Player, PlayerId, Question};
use reveal_session::{BackendError, GameBackend, RevealConfig, RoundHandle, RoundProps};
use viewport_client::{MockViewport, ViewportSlot};

pub const ROUND_ID: u32 = 7;

pub fn player(id: &str, score: i64, has_answered: bool) -> Player {
    Player {
        id: PlayerId::new(id),
        initials: id.to_uppercase(),
        score,
        has_answered,
    }
}

pub fn answer(id: &str, score: i64, lat: f64, lng: f64) -> Answer {
    Answer {
        player_id: PlayerId::new(id),
        round_id: ROUND_ID,
        lat,
        lng,
        score,
        distance_km: 0.0,
    }
}

pub fn question() -> Question {
    Question {
        round_id: ROUND_ID,
        lat: 35.68,
        lng: 139.69,
        prompt: "Where is this?".into(),
        image_url: None,
    }
}

/// Three players with scores [900, 500, 700], submitted P1, P2, P3.
pub fn three_players() -> (Vec<Player>, Vec<Answer>) {
    let players = vec![
        player("p1", 3000, true),
        player("p2", 2000, true),
        player("p3", 1000, true),
    ];
    let mut answers = vec![
        answer("p1", 900, 34.0, 135.0),
        answer("p2", 500, 10.0, 100.0),
        answer("p3", 700, 40.0, 145.0),
    ];
    // An answer from a previous round must not be revealed.
    answers.push(Answer {
        round_id: ROUND_ID - 1,
        ..answer("p1", 1000, 0.0, 0.0)
    });
    (players, answers)
}

pub fn props(round_index: usize) -> RoundProps {
    let (players, answers) = three_players();
    RoundProps {
        round_index,
        question: question(),
        players,
        answers,
    }
}

pub fn config() -> RevealConfig {
    RevealConfig::default()
}

pub fn spawn_with_viewport() -> (RoundHandle, MockViewport, ViewportSlot) {
    let mock = MockViewport::new();
    let slot = ViewportSlot::with_viewport(Arc::new(mock.clone()));
    let handle = reveal_session::spawn_round(config(), slot.clone());
    (handle, mock, slot)
}

pub fn spawn_without_viewport() -> (RoundHandle, ViewportSlot) {
    let slot = ViewportSlot::new();
    let handle = reveal_session::spawn_round(config(), slot.clone());
    (handle, slot)
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Finalize(usize),
    Advance(usize),
}

/// Recording backend. Clones share the same log and failure switches.
#[derive(Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    fail_finalize: Arc<Mutex<Option<String>>>,
    fail_advance: Arc<Mutex<Option<String>>>,
    finalize_delay: Arc<Mutex<Duration>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_finalize(self, message: &str) -> Self {
        *self.fail_finalize.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_advance(self, message: &str) -> Self {
        *self.fail_advance.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_finalize_delay(self, delay: Duration) -> Self {
        *self.finalize_delay.lock().unwrap() = delay;
        self
    }

    pub fn heal(&self) {
        *self.fail_finalize.lock().unwrap() = None;
        *self.fail_advance.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameBackend for MockBackend {
    async fn finalize_reveal(
        &self,
        round_index: usize,
        _question: &Question,
    ) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Finalize(round_index));
        let delay = *self.finalize_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let failure = self.fail_finalize.lock().unwrap().clone();
        match failure {
            Some(message) => Err(BackendError::new(message)),
            None => Ok(()),
        }
    }

    async fn advance_round(&self, round_index: usize) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Advance(round_index));
        let failure = self.fail_advance.lock().unwrap().clone();
        match failure {
            Some(message) => Err(BackendError::new(message)),
            None => Ok(()),
        }
    }
}
