mod common;
mod support;

use std::time::Duration;

use majority_client::{ClientError, Phase, PollOutcome, Region};
use support::{client_with, round, Endpoint, ScriptedApi};

#[tokio::test(start_paused = true)]
async fn start_twice_keeps_one_timer() {
    let api = ScriptedApi::new();
    api.set_state(round(Phase::Answer, 1, 3));
    let client = client_with(&api);

    client.start_polling();
    client.start_polling();
    tokio::time::sleep(Duration::from_millis(4100)).await;

    assert_eq!(api.calls(Endpoint::State), 3);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_polling() {
    let api = ScriptedApi::new();
    api.set_state(round(Phase::Answer, 1, 3));
    let client = client_with(&api);

    client.start_polling();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(api.calls(Endpoint::State), 2);

    client.stop_polling();
    assert!(!client.is_polling());
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(api.calls(Endpoint::State), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_discards_in_flight_poll() {
    let api = ScriptedApi::new();
    api.push_state(Duration::from_millis(500), Ok(round(Phase::Guess, 4, 5)));
    let client = client_with(&api);

    client.start_polling();
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.stop_polling();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(api.calls(Endpoint::State), 1);
    assert_eq!(client.current_round_id(), None);
    assert_eq!(client.ui().region, None);
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_stops_polling() {
    let api = ScriptedApi::new();
    api.set_state(round(Phase::Answer, 1, 3));
    let client = client_with(&api);

    client.start_polling();
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(client);
    tokio::time::sleep(Duration::from_millis(10_000)).await;

    assert_eq!(api.calls(Endpoint::State), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_poll_keeps_timer_running() {
    let api = ScriptedApi::new();
    api.push_state(Duration::ZERO, Err(ClientError::transport("connection failed")));
    api.set_state(round(Phase::Results, 2, 3));
    let client = client_with(&api);

    client.start_polling();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let ui = client.ui();
    assert_eq!(
        ui.poll_error.as_deref(),
        Some("Network error: could not reach the game server")
    );
    assert_eq!(ui.region, None);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    let ui = client.ui();
    assert_eq!(ui.poll_error, None);
    assert!(ui.is_visible(Region::Results));
    assert_eq!(client.current_round_id(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_does_not_overwrite_newer_state() {
    let api = ScriptedApi::new();
    // First poll answers after the second one has already been applied.
    api.push_state(Duration::from_millis(3000), Ok(round(Phase::Guess, 1, 3)));
    api.set_state(round(Phase::Answer, 2, 3));
    let client = client_with(&api);

    client.start_polling();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(api.calls(Endpoint::State), 2);
    assert_eq!(client.current_round_id(), Some(2));
    let ui = client.ui();
    assert!(ui.is_visible(Region::Answer));
    assert_eq!(ui.phase_display, "Phase: ANSWER Round 2/3");
}

#[tokio::test(start_paused = true)]
async fn overlapping_polls_report_stale() {
    let api = ScriptedApi::new();
    api.push_state(Duration::from_millis(50), Ok(round(Phase::Guess, 1, 3)));
    api.push_state(Duration::ZERO, Ok(round(Phase::Results, 1, 3)));
    let client = client_with(&api);

    let (older, newer) = tokio::join!(client.poll_state(), client.poll_state());

    assert_eq!(older.unwrap(), PollOutcome::Stale);
    assert!(matches!(newer.unwrap(), PollOutcome::Applied(state) if state.phase == Phase::Results));
    assert!(client.ui().is_visible(Region::Results));
}

#[tokio::test(start_paused = true)]
async fn newer_failure_does_not_discard_older_state() {
    let api = ScriptedApi::new();
    api.push_state(Duration::from_millis(50), Ok(round(Phase::Guess, 2, 3)));
    api.push_state(Duration::ZERO, Err(ClientError::transport("connection reset")));
    let client = client_with(&api);

    let (older, newer) = tokio::join!(client.poll_state(), client.poll_state());

    assert!(matches!(newer, Err(ClientError::Transport { .. })));
    assert!(matches!(older.unwrap(), PollOutcome::Applied(state) if state.round_id == 2));
    assert_eq!(client.current_round_id(), Some(2));
    let ui = client.ui();
    assert!(ui.is_visible(Region::Guess));
    assert_eq!(ui.poll_error, None);
}

#[tokio::test(start_paused = true)]
async fn older_failure_after_newer_state_is_ignored() {
    let api = ScriptedApi::new();
    api.push_state(Duration::from_millis(50), Err(ClientError::transport("timed out")));
    api.push_state(Duration::ZERO, Ok(round(Phase::Answer, 1, 3)));
    let client = client_with(&api);

    let (older, newer) = tokio::join!(client.poll_state(), client.poll_state());

    assert!(matches!(newer.unwrap(), PollOutcome::Applied(_)));
    assert!(older.is_err());
    assert_eq!(client.ui().poll_error, None);
    assert!(client.ui().is_visible(Region::Answer));
}

#[tokio::test]
async fn each_action_phase_shows_exactly_its_region() {
    let cases = [
        (Phase::Answer, Region::Answer),
        (Phase::Guess, Region::Guess),
        (Phase::Results, Region::Results),
    ];
    for (phase, region) in cases {
        let api = ScriptedApi::new();
        api.set_state(round(phase.clone(), 1, 3));
        let client = client_with(&api);

        client.poll_state().await.unwrap();

        let ui = client.ui();
        assert_eq!(ui.visible_regions(), 1, "phase {phase}");
        assert!(ui.is_visible(region), "phase {phase}");
    }
}

#[tokio::test]
async fn non_action_phases_hide_all_regions() {
    for phase in [Phase::Lobby, Phase::Expired, Phase::Other("PAUSED".to_string())] {
        let api = ScriptedApi::new();
        api.set_state(round(phase.clone(), 0, 3));
        let client = client_with(&api);

        client.poll_state().await.unwrap();

        let ui = client.ui();
        assert_eq!(ui.visible_regions(), 0, "phase {phase}");
        assert_eq!(ui.phase_display, format!("Phase: {phase} Round 0/3"));
    }
}

#[tokio::test]
async fn prompt_placeholder_when_absent() {
    let api = ScriptedApi::new();
    let mut state = round(Phase::Answer, 1, 3);
    state.prompt = Some("The real reason Thanos did it was ___".to_string());
    api.push_state(Duration::ZERO, Ok(state));
    api.set_state(round(Phase::Guess, 1, 3));
    let client = client_with(&api);

    client.poll_state().await.unwrap();
    assert_eq!(client.ui().prompt_display, "The real reason Thanos did it was ___");

    client.poll_state().await.unwrap();
    assert_eq!(client.ui().prompt_display, "—");
}

#[tokio::test]
async fn subscribers_see_changes_only() {
    let api = ScriptedApi::new();
    api.set_state(round(Phase::Answer, 1, 3));
    let client = client_with(&api);
    let mut rx = client.subscribe();

    client.poll_state().await.unwrap();
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    // Identical state: nothing to redraw.
    client.poll_state().await.unwrap();
    assert!(!rx.has_changed().unwrap());
}
