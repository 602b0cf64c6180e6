mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use reveal_core::{
    BeginRefusal, MarkerKind, ResetOutcome, RevealError, RevealPhase, RevealStage,
};
use reveal_session::{RevealOutcome, RoundEvent};
use tokio::time::sleep;
use viewport_client::{MockViewport, ViewportCall};

/// Let tasks woken at the same instant finish their round trips to the actor.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

fn guess_labels(markers: &[reveal_core::RevealMarker]) -> Vec<String> {
    markers.iter().map(|m| m.label.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn full_reveal_orders_guesses_by_score() {
    let (handle, mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();

    let reveal = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();
    assert!(reveal.is_started());
    assert_eq!(reveal.wait().await, RevealOutcome::Completed);

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::RevealComplete);
    assert!(snap.reveal_complete());
    assert!(snap.error.is_none());
    assert_eq!(snap.markers.len(), 4);
    assert!(matches!(snap.markers[0].kind, MarkerKind::Correct));
    assert_eq!(guess_labels(&snap.markers[1..]), vec!["P1", "P3", "P2"]);

    let fits = mock.fit_bounds_calls();
    assert_eq!(fits.len(), 1);
    let ViewportCall::FitBounds { bounds, padding, .. } = &fits[0] else {
        unreachable!()
    };
    assert_eq!(*padding, 50);
    for m in &snap.markers {
        assert!(bounds.contains(m.coordinate));
    }
}

#[tokio::test(start_paused = true)]
async fn stages_follow_the_timeline() {
    let (handle, mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();

    // Flying: revealing, but nothing shown yet.
    sleep(Duration::from_millis(1000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::Revealing);
    assert!(snap.markers.is_empty());
    assert!(mock.calls().contains(&ViewportCall::FlyTo {
        center: question().correct(),
        zoom: 6.0,
        duration: Duration::from_millis(2000),
    }));

    // Correct marker alone during the dwell.
    sleep(Duration::from_millis(1500)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.markers.len(), 1);
    assert!(snap.markers[0].is_correct());
    assert!(mock.fit_bounds_calls().is_empty());

    // Still alone at the last millisecond of the dwell.
    sleep(Duration::from_millis(499)).await;
    settle().await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.markers.len(), 1);
    assert!(mock.fit_bounds_calls().is_empty());

    // Guesses shown exactly when the dwell ends, fitting the map.
    sleep(Duration::from_millis(1)).await;
    settle().await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.markers.len(), 4);
    assert_eq!(snap.phase, RevealPhase::Revealing);
    assert_eq!(mock.fit_bounds_calls().len(), 1);

    sleep(Duration::from_millis(2000)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::RevealComplete);
}

#[tokio::test(start_paused = true)]
async fn begin_reveal_is_ignored_while_running() {
    let (handle, _mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    let first = handle
        .begin_reveal(question(), answers.clone(), players.clone())
        .await
        .unwrap();

    sleep(Duration::from_millis(2500)).await;
    let before = handle.snapshot().await.unwrap();
    let second = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();

    assert!(!second.is_started());
    assert_eq!(second.refusal(), Some(BeginRefusal::SequenceActive));
    assert_eq!(handle.snapshot().await.unwrap(), before);
    assert_eq!(first.wait().await, RevealOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn begin_reveal_is_ignored_after_completion() {
    let (handle, mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    let reveal = handle
        .begin_reveal(question(), answers.clone(), players.clone())
        .await
        .unwrap();
    reveal.wait().await;

    let before = handle.snapshot().await.unwrap();
    let calls_before = mock.calls().len();
    let again = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();

    assert_eq!(
        again.wait().await,
        RevealOutcome::Ignored(BeginRefusal::NotIdle(RevealPhase::RevealComplete))
    );
    assert_eq!(handle.snapshot().await.unwrap(), before);
    assert_eq!(mock.calls().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn missing_viewport_aborts_before_anything_is_shown() {
    let (handle, _slot) = spawn_without_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();

    let outcome = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap()
        .wait()
        .await;

    assert_eq!(
        outcome,
        RevealOutcome::Failed(RevealError::ViewportUnavailable(RevealStage::FlyToCorrect))
    );
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::Idle);
    assert!(snap.error.is_some());
    assert!(snap.markers.is_empty());
    assert!(!snap.sequence_active);
}

#[tokio::test(start_paused = true)]
async fn failed_reveal_can_be_retried_once_viewport_mounts() {
    let (handle, slot) = spawn_without_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    handle
        .begin_reveal(question(), answers.clone(), players.clone())
        .await
        .unwrap()
        .wait()
        .await;

    slot.attach(Arc::new(MockViewport::new()));
    let outcome = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap()
        .wait()
        .await;

    assert_eq!(outcome, RevealOutcome::Completed);
    let snap = handle.snapshot().await.unwrap();
    assert!(snap.error.is_none());
    assert_eq!(snap.markers.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn viewport_lost_mid_reveal_keeps_progress() {
    let (handle, _mock, slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    let reveal = handle
        .begin_reveal(question(), answers.clone(), players.clone())
        .await
        .unwrap();

    sleep(Duration::from_millis(2500)).await;
    slot.detach();

    assert_eq!(
        reveal.wait().await,
        RevealOutcome::Failed(RevealError::ViewportUnavailable(RevealStage::FitBounds))
    );
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::Revealing);
    assert_eq!(snap.markers.len(), 4);
    assert!(snap.error.is_some());

    // Retry after the map comes back; the correct marker is not duplicated.
    let mock = MockViewport::new();
    slot.attach(Arc::new(mock.clone()));
    let retry = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();
    assert_eq!(retry.wait().await, RevealOutcome::Completed);

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::RevealComplete);
    assert_eq!(snap.markers.len(), 4);
    assert_eq!(snap.markers.iter().filter(|m| m.is_correct()).count(), 1);
    assert_eq!(mock.fit_bounds_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn round_change_mid_reveal_cancels_silently() {
    let (handle, mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    let reveal = handle
        .begin_reveal(question(), answers, players.clone())
        .await
        .unwrap();

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(handle.snapshot().await.unwrap().markers.len(), 1);

    let outcome = handle.reset_for_round(1, players).await.unwrap();
    assert!(matches!(outcome, ResetOutcome::Reset(_)));
    let fresh = handle.snapshot().await.unwrap();

    assert_eq!(reveal.wait().await, RevealOutcome::Cancelled);
    sleep(Duration::from_secs(5)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap, fresh);
    assert_eq!(snap.phase, RevealPhase::Idle);
    assert!(snap.markers.is_empty());
    assert!(snap.error.is_none());
    assert!(mock.fit_bounds_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeated_reset_keeps_running_reveal() {
    let (handle, _mock, _slot) = spawn_with_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(3, players.clone()).await.unwrap();
    let reveal = handle
        .begin_reveal(question(), answers, players.clone())
        .await
        .unwrap();

    sleep(Duration::from_millis(500)).await;
    let before = handle.snapshot().await.unwrap();
    assert_eq!(
        handle.reset_for_round(3, players).await.unwrap(),
        ResetOutcome::Unchanged
    );
    assert_eq!(handle.snapshot().await.unwrap(), before);
    assert_eq!(reveal.wait().await, RevealOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn reset_recenters_to_world_view() {
    let (handle, mock, _slot) = spawn_with_viewport();
    handle
        .reset_for_round(0, three_players().0)
        .await
        .unwrap();
    sleep(Duration::from_millis(10)).await;

    let world = reveal_session::WorldView::default();
    assert_eq!(
        mock.fly_to_calls(),
        vec![ViewportCall::FlyTo {
            center: world.center,
            zoom: world.zoom,
            duration: world.duration,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn late_ready_viewport_does_not_recenter_over_reveal() {
    let mock = MockViewport::never_ready();
    let slot = viewport_client::ViewportSlot::with_viewport(Arc::new(mock.clone()));
    let handle = reveal_session::spawn_round(config(), slot);
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();

    let reveal = handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap();

    // Ready arrives during the correct-marker dwell, inside the ready timeout.
    sleep(Duration::from_millis(2500)).await;
    mock.set_ready();
    sleep(Duration::from_millis(10)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.phase, RevealPhase::Revealing);
    assert_eq!(snap.markers.len(), 1);
    assert_eq!(
        mock.fly_to_calls(),
        vec![ViewportCall::FlyTo {
            center: question().correct(),
            zoom: 6.0,
            duration: Duration::from_millis(2000),
        }]
    );

    assert_eq!(reveal.wait().await, RevealOutcome::Completed);
    assert_eq!(mock.fly_to_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_completes_without_ready_viewport() {
    let mock = MockViewport::never_ready();
    let slot = viewport_client::ViewportSlot::with_viewport(Arc::new(mock.clone()));
    let handle = reveal_session::spawn_round(config(), slot);

    let outcome = handle
        .reset_for_round(0, three_players().0)
        .await
        .unwrap();
    assert!(matches!(outcome, ResetOutcome::Reset(_)));
    assert_eq!(handle.snapshot().await.unwrap().phase, RevealPhase::Idle);

    sleep(Duration::from_secs(5)).await;
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_remount_and_state_changes() {
    let (handle, _mock, _slot) = spawn_with_viewport();
    let (initial, mut events) = handle.subscribe().await.unwrap();
    assert_eq!(initial.round_index, None);

    handle
        .reset_for_round(0, three_players().0)
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        RoundEvent::ViewportRemount { key } => assert_eq!(key, 1),
        other => panic!("expected remount, got {:?}", other),
    }
    match events.recv().await.unwrap() {
        RoundEvent::StateChanged(snap) => assert_eq!(snap.round_index, Some(0)),
        other => panic!("expected state change, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn failure_is_broadcast_as_error_event() {
    let (handle, _slot) = spawn_without_viewport();
    let (players, answers) = three_players();
    handle.reset_for_round(0, players.clone()).await.unwrap();
    let (_, mut events) = handle.subscribe().await.unwrap();

    handle
        .begin_reveal(question(), answers, players)
        .await
        .unwrap()
        .wait()
        .await;

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if let RoundEvent::Error(message) = event {
            assert!(message.contains("Map is not available"));
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test(start_paused = true)]
async fn closed_actor_reports_error() {
    let (handle, _mock, _slot) = spawn_with_viewport();
    handle.shutdown().await;
    sleep(Duration::from_millis(10)).await;
    assert!(handle.snapshot().await.is_err());
}
