use assert_matches::assert_matches;
use coldbot::commands::music::utils::music_manager::MusicError;
use coldbot::commands::music::utils::queue_manager::{QueueItem, SessionState};
use coldbot::commands::music::utils::session_registry::SessionRegistry;
use fake::Fake;
use fake::faker::lorem::en::Words;
use futures::future::join_all;
use pretty_assertions::assert_eq;

use super::*;
use crate::common::fixtures::UNRESOLVABLE;
use crate::common::mocks::VoiceCall;
use crate::common::{assert_quiet, eventually, next_notice};
use crate::test_utils;

/// Tests a queue playing through to the end and the session retiring itself
#[tokio::test]
async fn test_queue_plays_through_and_disconnects() {
    test_utils::init();
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);

    assert_eq!(
        play(&registry, "A").await.unwrap(),
        Notice::NowPlaying { title: "A".into() }
    );
    assert_eq!(
        play(&registry, "B").await.unwrap(),
        Notice::Queued {
            title: "B".into(),
            position: 1
        }
    );

    assert!(transport.finish_current());
    assert_eq!(
        next_notice(&mut notices).await,
        (fixtures::text_channel(), Notice::NowPlaying { title: "B".into() })
    );

    assert!(transport.finish_current());
    assert_eq!(
        next_notice(&mut notices).await,
        (fixtures::text_channel(), Notice::QueueFinished)
    );
    eventually(|| !registry.has_session(fixtures::guild())).await;

    assert_eq!(
        transport.calls(),
        vec![
            VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel()),
            VoiceCall::Play("A".into()),
            VoiceCall::Play("B".into()),
            VoiceCall::Disconnect,
        ]
    );
}

/// Tests that a finished session is replaced by a fresh one on the next request
#[tokio::test]
async fn test_new_session_after_queue_finished() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);

    play(&registry, "A").await.unwrap();
    transport.finish_current();
    assert_eq!(next_notice(&mut notices).await.1, Notice::QueueFinished);

    assert_eq!(
        play(&registry, "B").await.unwrap(),
        Notice::NowPlaying { title: "B".into() }
    );
    assert_eq!(
        transport.count(&VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel())),
        2
    );
}

/// Tests commands against a guild with nothing playing
#[tokio::test]
async fn test_commands_without_session() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    let guild = fixtures::guild();

    assert_matches!(registry.pause(guild).await, Err(MusicError::NotPlaying));
    assert_matches!(registry.resume(guild).await, Err(MusicError::NotPaused));
    assert_matches!(registry.skip(guild).await, Err(MusicError::NotPlaying));
    assert_matches!(registry.clear(guild).await, Err(MusicError::NotConnected));
    assert_eq!(registry.state(guild).await, SessionState::Idle);
    assert_eq!(registry.snapshot(guild, 10).await, None);
    assert!(transport.calls().is_empty());
}

/// Tests pausing and resuming through the registry
#[tokio::test]
async fn test_pause_and_resume() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    let guild = fixtures::guild();
    play(&registry, "A").await.unwrap();

    assert_eq!(
        registry.pause(guild).await.unwrap(),
        Notice::Paused { title: "A".into() }
    );
    assert_eq!(registry.state(guild).await, SessionState::Paused);
    assert_matches!(registry.pause(guild).await, Err(MusicError::NotPlaying));

    assert_eq!(
        registry.resume(guild).await.unwrap(),
        Notice::Resumed { title: "A".into() }
    );
    assert_eq!(registry.state(guild).await, SessionState::Playing);
}

/// Tests that skipping the only item ends the session
#[tokio::test]
async fn test_skip_last_item() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    play(&registry, "A").await.unwrap();

    let notices = registry.skip(fixtures::guild()).await.unwrap();

    assert_eq!(
        notices,
        vec![Notice::Skipped { title: "A".into() }, Notice::QueueFinished]
    );
    assert!(!registry.has_session(fixtures::guild()));
    assert_eq!(transport.count(&VoiceCall::Stop), 1);
    assert_eq!(transport.count(&VoiceCall::Disconnect), 1);
}

/// Tests that the completion fired by a skipped stream does not skip again
#[tokio::test]
async fn test_skip_ignores_late_completion() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);
    for title in ["A", "B", "C"] {
        play(&registry, title).await.unwrap();
    }

    let skipped = registry.skip(fixtures::guild()).await.unwrap();
    assert_eq!(
        skipped,
        vec![
            Notice::Skipped { title: "A".into() },
            Notice::NowPlaying { title: "B".into() },
        ]
    );

    assert_quiet(&mut notices).await;
    let snapshot = registry.snapshot(fixtures::guild(), 10).await.unwrap();
    assert_eq!(snapshot.now_playing.as_deref(), Some("B"));
    assert_eq!(snapshot.upcoming, vec!["C".to_string()]);
}

/// Tests that an unresolvable request never touches voice
#[tokio::test]
async fn test_resolution_failure() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);

    let result = play(&registry, UNRESOLVABLE).await;

    assert_matches!(result, Err(MusicError::ResolutionError(_)));
    assert!(transport.calls().is_empty());
    assert!(!registry.has_session(fixtures::guild()));
}

/// Tests that a failed voice connection leaves no session behind
#[tokio::test]
async fn test_connect_failure_then_recovery() {
    let transport = FakeTransport::refusing_connect();
    let (registry, _notices) = registry(&transport, QUIET_POLL);

    assert_matches!(play(&registry, "A").await, Err(MusicError::JoinError(_)));
    assert!(!registry.has_session(fixtures::guild()));

    transport.allow_connect();
    assert_eq!(
        play(&registry, "B").await.unwrap(),
        Notice::NowPlaying { title: "B".into() }
    );
    assert_eq!(transport.played(), vec!["B"]);
}

/// Tests that clear drops every item and leaves voice
#[tokio::test]
async fn test_clear_removes_everything() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);
    for title in ["A", "B", "C"] {
        play(&registry, title).await.unwrap();
    }

    assert_eq!(
        registry.clear(fixtures::guild()).await.unwrap(),
        Notice::Cleared { removed: 3 }
    );
    assert!(!registry.has_session(fixtures::guild()));
    assert_eq!(transport.count(&VoiceCall::Disconnect), 1);
    assert_eq!(transport.played(), vec!["A"]);
    assert_quiet(&mut notices).await;
}

/// Tests that an item which cannot start is passed over for the next one
#[tokio::test]
async fn test_unplayable_item_skipped() {
    let transport = FakeTransport::new();
    transport.reject("B");
    let (registry, mut notices) = registry(&transport, QUIET_POLL);
    for title in ["A", "B", "C"] {
        play(&registry, title).await.unwrap();
    }

    transport.finish_current();

    assert_eq!(
        next_notice(&mut notices).await.1,
        Notice::NowPlaying { title: "C".into() }
    );
    assert_eq!(transport.played(), vec!["A", "B", "C"]);
}

/// Tests that a stream failing mid-way moves on to the next item
#[tokio::test]
async fn test_errored_stream_advances() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);
    play(&registry, "A").await.unwrap();
    play(&registry, "B").await.unwrap();

    assert!(transport.fail_current("connection reset by peer"));

    assert_eq!(
        next_notice(&mut notices).await.1,
        Notice::NowPlaying { title: "B".into() }
    );
}

/// Tests that the liveness poll catches a stream that ended silently
#[tokio::test]
async fn test_liveness_poll_advances_lost_stream() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, Duration::from_millis(20));
    play(&registry, "A").await.unwrap();
    play(&registry, "B").await.unwrap();

    transport.lose_current();

    assert_eq!(
        next_notice(&mut notices).await,
        (fixtures::text_channel(), Notice::NowPlaying { title: "B".into() })
    );
}

/// Tests that a paused stream is left alone by the liveness poll
#[tokio::test]
async fn test_liveness_poll_ignores_paused() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, Duration::from_millis(20));
    play(&registry, "A").await.unwrap();
    play(&registry, "B").await.unwrap();

    registry.pause(fixtures::guild()).await.unwrap();
    transport.lose_current();

    assert_quiet(&mut notices).await;
    assert_eq!(registry.state(fixtures::guild()).await, SessionState::Paused);
}

/// Tests that simultaneous requests are queued once each, in a single order
#[tokio::test]
async fn test_concurrent_requests_keep_fifo() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    let titles: Vec<String> = (0..5)
        .map(|i| format!("{} #{}", Words(2..4).fake::<Vec<String>>().join(" "), i))
        .collect();

    let results = join_all(titles.iter().map(|title| play(&registry, title))).await;

    let mut now_playing = None;
    let mut queued = Vec::new();
    for result in results {
        match result.unwrap() {
            Notice::NowPlaying { title } => {
                assert!(now_playing.replace(title).is_none(), "two items started");
            }
            Notice::Queued { title, position } => queued.push((position, title)),
            other => panic!("unexpected notice {:?}", other),
        }
    }
    queued.sort_unstable();

    assert_eq!(
        queued.iter().map(|(position, _)| *position).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(
        transport.count(&VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel())),
        1
    );
    let snapshot = registry.snapshot(fixtures::guild(), 10).await.unwrap();
    assert_eq!(snapshot.now_playing, now_playing);
    assert_eq!(
        snapshot.upcoming,
        queued.into_iter().map(|(_, title)| title).collect::<Vec<_>>()
    );
}

/// Tests the queue overview, including the known running time
#[tokio::test]
async fn test_snapshot_lists_upcoming() {
    let transport = FakeTransport::new();
    let mut resolver = MockResolver::new();
    resolver.expect_resolve().times(3).returning(|locator| {
        Ok(QueueItem::new(locator, locator, FakeStream(locator.to_string()))
            .with_duration(Some(Duration::from_secs(90))))
    });
    let (sink, _notices) = recording_sink();
    let registry = SessionRegistry::new(
        Arc::new(transport.clone()),
        Arc::new(resolver),
        sink,
        QUIET_POLL,
    );
    for title in ["A", "B", "C"] {
        play(&registry, title).await.unwrap();
    }

    let snapshot = registry.snapshot(fixtures::guild(), 1).await.unwrap();

    assert_eq!(snapshot.state, SessionState::Playing);
    assert_eq!(snapshot.now_playing.as_deref(), Some("A"));
    assert_eq!(snapshot.upcoming, vec!["B".to_string()]);
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.upcoming_duration, Duration::from_secs(180));
}

/// Tests tearing a session down after the bot was removed from voice
#[tokio::test]
async fn test_teardown() {
    let transport = FakeTransport::new();
    let (registry, mut notices) = registry(&transport, QUIET_POLL);
    play(&registry, "A").await.unwrap();
    play(&registry, "B").await.unwrap();

    assert!(registry.teardown(fixtures::guild()).await);
    assert!(!registry.teardown(fixtures::guild()).await);

    assert!(!registry.has_session(fixtures::guild()));
    assert_eq!(transport.count(&VoiceCall::Disconnect), 1);
    assert!(!transport.finish_current());
    assert_quiet(&mut notices).await;
}

/// Tests that guilds keep separate queues
#[tokio::test]
async fn test_guilds_are_isolated() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    play(&registry, "A").await.unwrap();
    let other = registry
        .enqueue(
            fixtures::other_guild(),
            "Z",
            fixtures::voice_channel(),
            fixtures::text_channel(),
        )
        .await
        .unwrap();

    assert_eq!(other, Notice::NowPlaying { title: "Z".into() });
    registry.pause(fixtures::guild()).await.unwrap();

    assert_eq!(registry.state(fixtures::guild()).await, SessionState::Paused);
    assert_eq!(registry.state(fixtures::other_guild()).await, SessionState::Playing);
    assert_eq!(registry.active_sessions(), 2);
}
