//! Drives a scripted game through the reveal host round by round.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use reveal_core::{PlayerSnapshot, RevealMarker};
use reveal_session::{
    spawn_round, AdvanceOutcome, RequestOutcome, RevealConfig, RevealOutcome, RoundEvent, RoundHost,
};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use viewport_client::ViewportSlot;

use crate::config;
use crate::console::{ConsoleBackend, ConsoleViewport};
use crate::scenario::{RosterPoint, Scenario};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Zero-based round whose first finalize call is rejected.
    pub fail_finalize: Option<usize>,
    pub mount_delay: Duration,
}

#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub round_index: usize,
    pub round_id: u32,
    pub attempts: u32,
    pub markers: Vec<RevealMarker>,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct GameReport {
    pub rounds: Vec<RoundReport>,
    /// The backend reported the final round of the game.
    pub game_over: bool,
}

pub async fn play(
    scenario: &Scenario,
    reveal_config: RevealConfig,
    options: PlayOptions,
) -> anyhow::Result<GameReport> {
    let ready_timeout = reveal_config.ready_timeout;
    let slot = ViewportSlot::new();
    let handle = spawn_round(reveal_config, slot.clone());
    let (_, events) = handle.subscribe().await?;
    let printer = tokio::spawn(log_events(events));

    slot.attach(Arc::new(ConsoleViewport::new(options.mount_delay)));
    if let Err(e) = slot.wait_ready(ready_timeout).await {
        tracing::warn!(error = %e, "Map not ready, revealing anyway");
    }
    let mut host = RoundHost::new(handle.clone(), ConsoleBackend::new(options.fail_finalize));

    let mut report = GameReport {
        rounds: Vec::new(),
        game_over: false,
    };
    let mut round_index = 0;

    loop {
        let props = scenario
            .props(round_index, RosterPoint::Answered)
            .with_context(|| format!("scenario has no round {}", round_index + 1))?;
        let round_id = props.question.round_id;
        host.apply_props(props).await?;
        tracing::info!(round = round_index + 1, round_id, "Round loaded");

        let attempts = reveal_with_retry(&mut host, round_index).await?;

        // Scores land after the reveal; same round index, so only the roster refreshes.
        if let Some(scored) = scenario.props(round_index, RosterPoint::Scored) {
            host.apply_props(scored).await?;
        }
        let snapshot = host.handle().snapshot().await?;
        report.rounds.push(RoundReport {
            round_index,
            round_id,
            attempts,
            markers: snapshot.markers,
            players: snapshot.players,
        });

        match host.advance_round().await? {
            AdvanceOutcome::NextRound(next) if next < scenario.round_count() => round_index = next,
            AdvanceOutcome::NextRound(_) => break,
            AdvanceOutcome::GameOver => {
                report.game_over = true;
                break;
            }
            AdvanceOutcome::Blocked(reason) => {
                bail!("cannot advance past round {}: {}", round_index + 1, reason)
            }
            AdvanceOutcome::Failed(err) => return Err(err.into()),
        }
    }

    handle.shutdown().await;
    let _ = printer.await;
    Ok(report)
}

async fn reveal_with_retry(
    host: &mut RoundHost<ConsoleBackend>,
    round_index: usize,
) -> anyhow::Result<u32> {
    let max_attempts = config::get_reveal_attempts();

    for attempt in 1..=max_attempts {
        match host.request_reveal().await? {
            RequestOutcome::Started(reveal) => match reveal.wait().await {
                RevealOutcome::Completed => return Ok(attempt),
                RevealOutcome::Failed(err) => {
                    tracing::warn!(round = round_index + 1, attempt, error = %err, "Reveal failed")
                }
                other => bail!("reveal for round {} ended early: {:?}", round_index + 1, other),
            },
            RequestOutcome::Failed(err) => {
                tracing::warn!(round = round_index + 1, attempt, error = %err, "Reveal request failed")
            }
            RequestOutcome::Blocked(reason) => {
                bail!("reveal for round {} blocked: {}", round_index + 1, reason)
            }
        }
        tokio::time::sleep(RETRY_BACKOFF).await;
    }

    bail!(
        "round {} not revealed after {} attempts",
        round_index + 1,
        max_attempts
    )
}

async fn log_events(mut events: broadcast::Receiver<RoundEvent>) {
    loop {
        match events.recv().await {
            Ok(RoundEvent::StateChanged(snapshot)) => tracing::debug!(
                phase = ?snapshot.phase,
                markers = snapshot.markers.len(),
                finalizing = snapshot.finalizing,
                "Round state changed"
            ),
            Ok(RoundEvent::ViewportRemount { key }) => {
                tracing::debug!(key, "Viewport remounted")
            }
            Ok(RoundEvent::Error(message)) => tracing::warn!("Round error: {}", message),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event log fell behind")
            }
            Err(RecvError::Closed) => break,
        }
    }
}
