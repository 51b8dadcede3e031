use assert_matches::assert_matches;
use coldbot::commands::music::utils::intro_player::play_intro;
use coldbot::commands::music::utils::music_manager::MusicError;
use coldbot::commands::music::utils::notices::Notice;
use coldbot::commands::music::utils::queue_manager::SessionState;
use pretty_assertions::assert_eq;

use super::*;
use crate::common::eventually;
use crate::common::mocks::VoiceCall;

fn clip() -> FakeStream {
    FakeStream("intro".to_string())
}

/// Tests that an intro joins, plays to the end and leaves
#[tokio::test]
async fn test_intro_plays_and_leaves() {
    let transport = FakeTransport::finishing_immediately();

    play_intro(
        &transport,
        fixtures::guild(),
        fixtures::voice_channel(),
        clip(),
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(
        transport.calls(),
        vec![
            VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel()),
            VoiceCall::Play("intro".into()),
            VoiceCall::Disconnect,
        ]
    );
}

/// Tests that an intro that never finishes is cut off
#[tokio::test]
async fn test_intro_times_out() {
    let transport = FakeTransport::new();

    play_intro(
        &transport,
        fixtures::guild(),
        fixtures::voice_channel(),
        clip(),
        Duration::from_millis(50),
    )
    .await
    .unwrap();

    assert_eq!(
        transport.calls(),
        vec![
            VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel()),
            VoiceCall::Play("intro".into()),
            VoiceCall::Stop,
            VoiceCall::Disconnect,
        ]
    );
}

/// Tests that a clip which cannot start still leaves the channel
#[tokio::test]
async fn test_intro_unplayable_clip() {
    let transport = FakeTransport::new();
    transport.reject("intro");

    let result = play_intro(
        &transport,
        fixtures::guild(),
        fixtures::voice_channel(),
        clip(),
        Duration::from_secs(5),
    )
    .await;

    assert_matches!(result, Err(MusicError::TransportError(_)));
    assert_eq!(transport.count(&VoiceCall::Disconnect), 1);
}

/// Tests that a refused voice connection is reported without playing
#[tokio::test]
async fn test_intro_connect_refused() {
    let transport = FakeTransport::refusing_connect();

    let result = play_intro(
        &transport,
        fixtures::guild(),
        fixtures::voice_channel(),
        clip(),
        Duration::from_secs(5),
    )
    .await;

    assert_matches!(result, Err(MusicError::JoinError(_)));
    assert!(transport.played().is_empty());
}

/// Tests that music requested mid-intro waits for the intro to leave and keeps its own call
#[tokio::test]
async fn test_music_waits_for_running_intro() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    let registry = Arc::new(registry);

    let intro = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move {
            registry
                .play_intro(
                    fixtures::guild(),
                    fixtures::voice_channel(),
                    clip(),
                    Duration::from_millis(200),
                )
                .await
        }
    });
    eventually(|| transport.played() == vec!["intro"]).await;

    let notice = play(&registry, "A").await.unwrap();

    assert_eq!(notice, Notice::NowPlaying { title: "A".into() });
    assert_matches!(intro.await.unwrap(), Ok(true));
    assert_eq!(registry.state(fixtures::guild()).await, SessionState::Playing);
    assert_eq!(
        transport.calls(),
        vec![
            VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel()),
            VoiceCall::Play("intro".into()),
            VoiceCall::Stop,
            VoiceCall::Disconnect,
            VoiceCall::Connect(fixtures::guild(), fixtures::voice_channel()),
            VoiceCall::Play("A".into()),
        ]
    );
}

/// Tests that no intro starts while a playback session holds the guild
#[tokio::test]
async fn test_intro_skipped_during_session() {
    let transport = FakeTransport::new();
    let (registry, _notices) = registry(&transport, QUIET_POLL);
    play(&registry, "A").await.unwrap();

    let played = registry
        .play_intro(
            fixtures::guild(),
            fixtures::voice_channel(),
            clip(),
            Duration::from_secs(5),
        )
        .await;

    assert_matches!(played, Ok(false));
    assert_eq!(transport.played(), vec!["A"]);
    assert_eq!(transport.count(&VoiceCall::Disconnect), 0);
    assert_eq!(registry.state(fixtures::guild()).await, SessionState::Playing);
}
