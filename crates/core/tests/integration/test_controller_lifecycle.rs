//! Integration tests for the playback controller lifecycle
//!
//! Covers play/pause/stop/toggle transitions, the order of upstream calls on
//! a fresh session, and the spawned dispatcher loop.

#[path = "../fixtures/mock_session.rs"]
mod mock_session;

use mock_session::{Call, Harness, MockConnector, RATE};
use promptdj_core::audio::{GainEvent, OutputGraph};
use promptdj_core::controller::{Command, ControllerHandle, Notifier, NO_ACTIVE_PROMPTS};
use promptdj_core::session::{GenerationConfig, Scale};
use promptdj_core::{
    NotificationLevel, PlaybackController, PlaybackState, PromptSet, WeightedPrompt,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[tokio::test]
async fn test_play_connects_and_sends_config_then_prompts_then_play() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;

    assert_eq!(h.state(), PlaybackState::Loading);
    assert!(h.controller.has_session());
    assert_eq!(
        h.connector.calls(),
        vec![
            Call::Connect("lyria-realtime-exp".to_string()),
            Call::SetGenerationConfig(GenerationConfig::default()),
            Call::SetWeightedPrompts(vec![WeightedPrompt {
                text: "Minimal Techno".to_string(),
                weight: 1.0
            }]),
            Call::Play,
        ]
    );
    assert!(h.take_notifications().is_empty());
}

#[tokio::test]
async fn test_play_ramps_gain_up_from_silence() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;

    let graph = h.controller.graph();
    assert_eq!(graph.gain(), 0.0);
    assert_eq!(
        graph.gain_events(),
        vec![
            GainEvent::SetValue {
                time: 0.0,
                value: 0.0
            },
            GainEvent::LinearRamp {
                time: 0.1,
                value: 1.0
            },
        ]
    );
    assert_eq!(graph.gain_at(0.1), 1.0);
}

#[tokio::test]
async fn test_play_without_active_prompts_stays_stopped() {
    let mut prompts = PromptSet::new();
    prompts.add("Shoegaze", "#ffdd28");
    let mut h = Harness::new(Harness::config(), prompts);

    h.start().await;

    assert_eq!(h.state(), PlaybackState::Stopped);
    assert_eq!(h.connector.connect_count(), 0);
    let notifications = h.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Warning);
    assert_eq!(notifications[0].message, NO_ACTIVE_PROMPTS);
}

#[tokio::test]
async fn test_play_while_loading_is_ignored() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    h.connector.clear_calls();

    h.command(Command::Play).await;

    assert_eq!(h.state(), PlaybackState::Loading);
    assert!(h.connector.calls().is_empty());
}

#[tokio::test]
async fn test_pause_twice_is_idempotent() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    h.controller.graph().advance(1.0);

    h.command(Command::Pause).await;
    assert_eq!(h.state(), PlaybackState::Paused);
    assert_eq!(
        h.controller.graph().gain_events()[0],
        GainEvent::SetValue {
            time: 1.0,
            value: 1.0
        }
    );

    // Let the fade settle, then pause again
    h.controller.graph().advance(0.5);
    h.command(Command::Pause).await;

    assert_eq!(h.state(), PlaybackState::Paused);
    assert_eq!(h.connector.count(&Call::Pause), 1);
    let events = h.controller.graph().gain_events();
    assert_eq!(
        events[0],
        GainEvent::SetValue {
            time: 1.5,
            value: 0.0
        }
    );
    assert_eq!(h.controller.graph().gain_at(2.0), 0.0);
    assert!(h.controller.has_session());
}

#[tokio::test]
async fn test_pause_while_stopped_is_noop() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.command(Command::Pause).await;
    assert_eq!(h.state(), PlaybackState::Stopped);
    assert!(h.connector.calls().is_empty());
}

#[tokio::test]
async fn test_resume_from_pause_reuses_session() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    h.command(Command::Pause).await;
    h.connector.clear_calls();

    h.command(Command::Play).await;

    assert_eq!(h.state(), PlaybackState::Loading);
    assert_eq!(
        h.connector.calls(),
        vec![
            Call::SetWeightedPrompts(vec![WeightedPrompt {
                text: "Minimal Techno".to_string(),
                weight: 1.0
            }]),
            Call::Play,
        ]
    );
}

#[tokio::test]
async fn test_stop_releases_session_and_next_play_reconnects() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    let first = h.controller.session_id();

    h.command(Command::Stop).await;

    assert_eq!(h.state(), PlaybackState::Stopped);
    assert!(!h.controller.has_session());
    assert_eq!(h.controller.scheduler().next_start_time(), None);
    let calls = h.connector.calls();
    assert_eq!(&calls[calls.len() - 2..], &[Call::Stop, Call::Close]);

    h.start().await;
    assert_eq!(h.connector.connect_count(), 2);
    assert_eq!(h.state(), PlaybackState::Loading);
    assert_ne!(h.controller.session_id(), first);
}

#[tokio::test]
async fn test_stop_fades_faster_than_pause() {
    let config = Harness::config();
    let mut paused = Harness::new(config.clone(), Harness::one_prompt());
    paused.start().await;
    paused.command(Command::Pause).await;

    let mut stopped = Harness::new(config, Harness::one_prompt());
    stopped.start().await;
    stopped.command(Command::Stop).await;

    let end_of = |events: Vec<GainEvent>| events.last().map(|e| e.time()).unwrap();
    assert!(
        end_of(stopped.controller.graph().gain_events())
            < end_of(paused.controller.graph().gain_events())
    );
}

#[tokio::test]
async fn test_toggle_while_loading_stops() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    assert_eq!(h.state(), PlaybackState::Loading);

    h.command(Command::Toggle).await;

    assert_eq!(h.state(), PlaybackState::Stopped);
    assert!(!h.controller.has_session());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_pauses_playing_and_resumes_paused() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    h.send_audio(vec![h.chunk(500)]);
    h.drain().await;
    h.next_event().await;
    assert_eq!(h.state(), PlaybackState::Playing);

    h.command(Command::Toggle).await;
    assert_eq!(h.state(), PlaybackState::Paused);

    h.command(Command::Toggle).await;
    assert_eq!(h.state(), PlaybackState::Loading);
    assert_eq!(h.connector.connect_count(), 1);
}

#[tokio::test]
async fn test_generation_config_resets_context_on_bpm_change() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    h.start().await;
    h.connector.clear_calls();

    let brighter = GenerationConfig {
        brightness: Some(0.7),
        ..GenerationConfig::default()
    };
    h.command(Command::SetGenerationConfig(brighter.clone()))
        .await;
    assert_eq!(
        h.connector.calls(),
        vec![Call::SetGenerationConfig(brighter.clone())]
    );

    h.connector.clear_calls();
    let faster = GenerationConfig {
        bpm: Some(128),
        scale: Some(Scale::FMajorDMinor),
        ..brighter
    };
    h.command(Command::SetGenerationConfig(faster.clone())).await;
    assert_eq!(
        h.connector.calls(),
        vec![Call::SetGenerationConfig(faster), Call::ResetContext]
    );
}

#[tokio::test]
async fn test_generation_config_stored_until_connect() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    let config = GenerationConfig {
        bpm: Some(90),
        ..GenerationConfig::default()
    };

    h.command(Command::SetGenerationConfig(config.clone())).await;
    assert!(h.connector.calls().is_empty());
    assert_eq!(h.controller.generation_config(), &config);

    h.start().await;
    assert_eq!(h.connector.calls()[1], Call::SetGenerationConfig(config));
}

#[tokio::test]
async fn test_spawned_controller_publishes_state_and_shuts_down() {
    mock_session::init_tracing();
    let connector = MockConnector::new();
    let (notifier, _notifications) = Notifier::channel();
    let (controller, events) = PlaybackController::new(
        Harness::config(),
        Arc::new(connector.clone()),
        OutputGraph::new(RATE, 1),
        Harness::one_prompt(),
        notifier,
    )
    .unwrap();

    let (handle, task) = controller.spawn(events);
    let mut states = handle.subscribe();
    assert_eq!(handle.state(), PlaybackState::Stopped);

    assert!(handle.play());
    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), PlaybackState::Loading);

    // Wait for the connect task to land and the session to start
    tokio::time::timeout(Duration::from_secs(5), async {
        while connector.count(&Call::Play) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    assert!(handle.shutdown());
    task.await.unwrap();

    assert_eq!(handle.state(), PlaybackState::Stopped);
    assert!(connector.calls().contains(&Call::Close));
    assert!(!handle.pause());
}

fn spawn_controller(connector: &MockConnector) -> (ControllerHandle, JoinHandle<()>) {
    mock_session::init_tracing();
    let (notifier, _notifications) = Notifier::channel();
    let (controller, events) = PlaybackController::new(
        Harness::config(),
        Arc::new(connector.clone()),
        OutputGraph::new(RATE, 1),
        Harness::one_prompt(),
        notifier,
    )
    .unwrap();
    controller.spawn(events)
}

#[tokio::test(start_paused = true)]
async fn test_toggle_cancels_connect_that_never_resolves() {
    let connector = MockConnector::new();
    let _held = connector.gate_next_connect();
    let (handle, task) = spawn_controller(&connector);
    let mut states = handle.subscribe();

    assert!(handle.play());
    states.changed().await.unwrap();
    assert_eq!(handle.state(), PlaybackState::Loading);

    assert!(handle.toggle());
    states.changed().await.unwrap();
    assert_eq!(handle.state(), PlaybackState::Stopped);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.state(), PlaybackState::Stopped);

    // The loop is still responsive and shuts down cleanly
    assert!(handle.shutdown());
    task.await.unwrap();
}

#[tokio::test]
async fn test_stop_while_connecting_closes_late_session() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    let release = h.connector.gate_next_connect();

    h.command(Command::Play).await;
    assert_eq!(h.state(), PlaybackState::Loading);
    assert!(h.controller.is_connecting());

    h.command(Command::Stop).await;
    assert_eq!(h.state(), PlaybackState::Stopped);
    assert!(!h.controller.is_connecting());

    release.send(()).unwrap();
    h.next_event().await;

    assert_eq!(h.state(), PlaybackState::Stopped);
    assert!(!h.controller.has_session());
    assert!(!h.controller.connection_error());
    let calls = h.connector.calls();
    assert_eq!(calls.last(), Some(&Call::Close));
    assert!(!calls.contains(&Call::Play));
    assert!(h.take_notifications().is_empty());
}

#[tokio::test]
async fn test_play_after_abandoned_connect_uses_new_attempt() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    let release = h.connector.gate_next_connect();

    h.command(Command::Play).await;
    // Let the first connect start and block on its gate
    tokio::task::yield_now().await;
    h.command(Command::Toggle).await;
    assert_eq!(h.state(), PlaybackState::Stopped);

    h.start().await;
    assert_eq!(h.state(), PlaybackState::Loading);
    let current = h.controller.session_id();
    assert!(current.is_some());

    // The first attempt lands late and must not replace the live session
    release.send(()).unwrap();
    h.next_event().await;

    assert_eq!(h.controller.session_id(), current);
    assert_eq!(h.state(), PlaybackState::Loading);
    assert_eq!(h.connector.count(&Call::Play), 1);
    assert_eq!(h.connector.count(&Call::Close), 1);
}

#[tokio::test]
async fn test_pause_while_connecting_abandons_attempt() {
    let mut h = Harness::new(Harness::config(), Harness::one_prompt());
    let release = h.connector.gate_next_connect();

    h.command(Command::Play).await;
    h.command(Command::Pause).await;
    assert_eq!(h.state(), PlaybackState::Paused);
    assert!(!h.controller.is_connecting());

    release.send(()).unwrap();
    h.next_event().await;
    assert_eq!(h.state(), PlaybackState::Paused);
    assert!(!h.controller.has_session());

    // Resuming opens a fresh session
    h.start().await;
    assert_eq!(h.state(), PlaybackState::Loading);
    assert_eq!(h.connector.connect_count(), 2);
    assert!(h.controller.has_session());
}
