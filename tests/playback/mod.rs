//! Playback sessions driven through fake voice and resolver layers

mod intro;
mod registry;

use crate::common::fixtures;
use crate::common::mocks::{
    FakeConnection, FakeStream, FakeTransport, MockResolver, echo_resolver, recording_sink,
};
use coldbot::commands::music::utils::music_manager::MusicResult;
use coldbot::commands::music::utils::notices::Notice;
use coldbot::commands::music::utils::queue_manager::{PlaybackQueue, QueueItem, TrackEnded};
use coldbot::commands::music::utils::session_registry::SessionRegistry;
use poise::serenity_prelude::ChannelId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type TestRegistry = SessionRegistry<FakeTransport, MockResolver>;
type NoticeRx = mpsc::UnboundedReceiver<(ChannelId, Notice)>;

/// Liveness polling slow enough to never fire unless a test wants it
const QUIET_POLL: Duration = Duration::from_secs(60);

fn item(title: &str) -> QueueItem<FakeStream> {
    QueueItem::new(
        title,
        format!("https://example.com/{}", title),
        FakeStream(title.to_string()),
    )
}

fn new_queue() -> (PlaybackQueue<FakeConnection>, mpsc::UnboundedReceiver<TrackEnded>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PlaybackQueue::new(fixtures::guild(), tx), rx)
}

fn registry(transport: &FakeTransport, poll: Duration) -> (TestRegistry, NoticeRx) {
    let (sink, rx) = recording_sink();
    let registry = SessionRegistry::new(
        Arc::new(transport.clone()),
        Arc::new(echo_resolver()),
        sink,
        poll,
    );
    (registry, rx)
}

/// Enqueue into the sample guild from the sample channels
async fn play(registry: &TestRegistry, locator: &str) -> MusicResult<Notice> {
    registry
        .enqueue(
            fixtures::guild(),
            locator,
            fixtures::voice_channel(),
            fixtures::text_channel(),
        )
        .await
}
