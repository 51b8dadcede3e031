//! Mock implementations for the voice, resolver and notice seams
//! This module contains fakes used to drive playback sessions without Discord

use async_trait::async_trait;
use coldbot::commands::music::audio_sources::AudioResolver;
use coldbot::commands::music::utils::music_manager::{MusicError, MusicResult};
use coldbot::commands::music::utils::notices::{Notice, NoticeSink};
use coldbot::commands::music::utils::queue_manager::{CompletionSignal, QueueItem, TrackOutcome};
use coldbot::commands::music::utils::voice_transport::{VoiceConnection, VoiceTransport};
use mockall::mock;
use poise::serenity_prelude::{ChannelId, GuildId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::fixtures::UNRESOLVABLE;

/// Stand-in for an audio stream; carries the title it was resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeStream(pub String);

/// Everything the fake voice layer was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Connect(GuildId, ChannelId),
    Play(String),
    Pause,
    Resume,
    Stop,
    Disconnect,
}

#[derive(Default)]
struct VoiceLog {
    calls: Vec<VoiceCall>,
    pending: Option<CompletionSignal>,
    active: bool,
    fail_connect: bool,
    auto_finish: bool,
    unplayable: HashSet<String>,
}

/// Fake voice transport. Clones share the same log.
#[derive(Clone, Default)]
pub struct FakeTransport {
    voice: Arc<Mutex<VoiceLog>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect attempt fails until [`FakeTransport::allow_connect`]
    pub fn refusing_connect() -> Self {
        let transport = Self::new();
        transport.log().fail_connect = true;
        transport
    }

    /// Streams end as soon as they start
    pub fn finishing_immediately() -> Self {
        let transport = Self::new();
        transport.log().auto_finish = true;
        transport
    }

    fn log(&self) -> std::sync::MutexGuard<'_, VoiceLog> {
        self.voice.lock().expect("voice log poisoned")
    }

    pub fn allow_connect(&self) {
        self.log().fail_connect = false;
    }

    /// Streams with this title fail to start
    pub fn reject(&self, title: &str) {
        self.log().unplayable.insert(title.to_string());
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.log().calls.clone()
    }

    pub fn played(&self) -> Vec<String> {
        self.log()
            .calls
            .iter()
            .filter_map(|call| match call {
                VoiceCall::Play(title) => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &VoiceCall) -> usize {
        self.log().calls.iter().filter(|call| *call == wanted).count()
    }

    /// End the current stream normally. Returns false if nothing was playing.
    pub fn finish_current(&self) -> bool {
        self.end_current(TrackOutcome::Finished)
    }

    /// End the current stream with a transport failure
    pub fn fail_current(&self, reason: &str) -> bool {
        self.end_current(TrackOutcome::Errored(reason.to_string()))
    }

    /// The stream stops without ever reporting completion
    pub fn lose_current(&self) {
        let mut log = self.log();
        log.active = false;
        log.pending = None;
    }

    /// Completion signal of the stream currently playing, if any
    pub fn pending_token(&self) -> Option<u64> {
        self.log().pending.as_ref().map(CompletionSignal::token)
    }

    fn end_current(&self, outcome: TrackOutcome) -> bool {
        let signal = {
            let mut log = self.log();
            log.active = false;
            log.pending.take()
        };
        match signal {
            Some(signal) => {
                signal.fire(outcome);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    type Connection = FakeConnection;

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<FakeConnection> {
        let mut log = self.log();
        log.calls.push(VoiceCall::Connect(guild_id, channel_id));
        if log.fail_connect {
            return Err(MusicError::JoinError("voice gateway unavailable".to_string()));
        }
        Ok(FakeConnection {
            voice: Arc::clone(&self.voice),
        })
    }
}

pub struct FakeConnection {
    voice: Arc<Mutex<VoiceLog>>,
}

impl FakeConnection {
    fn log(&self) -> std::sync::MutexGuard<'_, VoiceLog> {
        self.voice.lock().expect("voice log poisoned")
    }
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    type Stream = FakeStream;

    async fn play(&mut self, stream: FakeStream, signal: CompletionSignal) -> MusicResult<()> {
        let mut log = self.log();
        log.calls.push(VoiceCall::Play(stream.0.clone()));
        if log.unplayable.contains(&stream.0) {
            return Err(MusicError::TransportError("codec rejected stream".to_string()));
        }
        if log.auto_finish {
            signal.fire(TrackOutcome::Finished);
            return Ok(());
        }
        log.pending = Some(signal);
        log.active = true;
        Ok(())
    }

    fn pause(&mut self) -> MusicResult<()> {
        self.log().calls.push(VoiceCall::Pause);
        Ok(())
    }

    fn resume(&mut self) -> MusicResult<()> {
        self.log().calls.push(VoiceCall::Resume);
        Ok(())
    }

    /// Like songbird, a stopped track still reports that it ended
    fn stop(&mut self) -> MusicResult<()> {
        let signal = {
            let mut log = self.log();
            log.calls.push(VoiceCall::Stop);
            log.active = false;
            log.pending.take()
        };
        if let Some(signal) = signal {
            signal.fire(TrackOutcome::Finished);
        }
        Ok(())
    }

    async fn is_active(&self) -> bool {
        self.log().active
    }

    async fn disconnect(&mut self) -> MusicResult<()> {
        let mut log = self.log();
        log.calls.push(VoiceCall::Disconnect);
        log.active = false;
        log.pending = None;
        Ok(())
    }
}

mock! {
    pub Resolver {}

    #[async_trait]
    impl AudioResolver for Resolver {
        type Stream = FakeStream;

        async fn resolve(&self, locator: &str) -> MusicResult<QueueItem<FakeStream>>;
    }
}

/// A resolver that titles every item after its request and refuses [`UNRESOLVABLE`]
pub fn echo_resolver() -> MockResolver {
    let mut resolver = MockResolver::new();
    resolver.expect_resolve().returning(|locator| {
        if locator == UNRESOLVABLE {
            return Err(MusicError::ResolutionError(
                "Playlists are not supported".to_string(),
            ));
        }
        Ok(QueueItem::new(locator, locator, FakeStream(locator.to_string())))
    });
    resolver
}

/// Collects notices a session posts by itself
pub struct RecordingSink {
    tx: mpsc::UnboundedSender<(ChannelId, Notice)>,
}

pub fn recording_sink() -> (Arc<RecordingSink>, mpsc::UnboundedReceiver<(ChannelId, Notice)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(RecordingSink { tx }), rx)
}

#[async_trait]
impl NoticeSink for RecordingSink {
    async fn deliver(&self, channel_id: ChannelId, notice: &Notice) {
        let _ = self.tx.send((channel_id, notice.clone()));
    }
}
