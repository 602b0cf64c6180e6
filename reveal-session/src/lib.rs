//! Async orchestration of the answer reveal.
//!
//! One actor task per game owns the [`reveal_core::RoundState`]. Reveal
//! sequencers and viewport recenters run as separate tasks and send their
//! state changes back tagged with the round epoch they started under, so a
//! round change cancels them without locks.

mod actor;
mod backend;
mod commands;
pub mod config;
mod error;
mod events;
mod handle;
mod host;
mod lifecycle;
mod sequencer;

use tokio::sync::{broadcast, mpsc, watch};
use uuid::Uuid;
use viewport_client::ViewportSlot;

use actor::{run_round_actor, RoundActor};
pub use backend::{BackendError, GameBackend};
pub use config::{RevealConfig, WorldView};
pub use error::SessionError;
pub use events::RoundEvent;
pub use handle::RoundHandle;
pub use host::{AdvanceOutcome, GateBlocked, RequestOutcome, RoundHost, RoundProps};
pub use lifecycle::RecenterOutcome;
pub use sequencer::{RevealHandle, RevealOutcome};

/// Spawn a round actor driving `viewport` and return a handle to it.
pub fn spawn_round(config: RevealConfig, viewport: ViewportSlot) -> RoundHandle {
    let id = Uuid::new_v4().to_string();
    let state = reveal_core::RoundState::new();

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(100);
    let (signal_tx, _) = watch::channel(lifecycle::RoundSignal::new(state.epoch()));

    let actor = RoundActor {
        state,
        config,
        viewport,
        signal_tx,
        event_tx,
        self_tx: cmd_tx.downgrade(),
    };

    let actor_id = id.clone();
    tokio::spawn(async move {
        run_round_actor(actor_id, actor, cmd_rx).await;
    });

    RoundHandle::new(id, cmd_tx)
}
