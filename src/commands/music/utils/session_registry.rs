//! Guild-keyed registry of playback sessions.
//!
//! Each session owns a [`PlaybackQueue`] behind an async mutex plus a watcher
//! task. The watcher is the only thing outside a command that touches the
//! queue: it applies completion signals and periodic liveness checks, posts
//! the resulting notices and retires the session once it disconnects.
//!
//! A guild's voice call is shared between its session and join intros. Both
//! take the guild's voice gate before connecting, so an intro never runs
//! alongside a session and a session waits for a running intro to leave.

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::intro_player;
use super::music_manager::{MusicError, MusicResult};
use super::notices::{Notice, NoticeSink};
use super::queue_manager::{PlaybackQueue, SessionState, TrackEnded};
use super::voice_transport::{StreamOf, VoiceConnection, VoiceTransport};
use crate::commands::music::audio_sources::AudioResolver;

type SharedQueue<C> = Arc<Mutex<PlaybackQueue<C>>>;

struct Session<C: VoiceConnection> {
    queue: SharedQueue<C>,
    watcher: JoinHandle<()>,
}

type Sessions<C> = Arc<DashMap<GuildId, Session<C>>>;

/// Point-in-time view of a guild's queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub state: SessionState,
    pub now_playing: Option<String>,
    pub upcoming: Vec<String>,
    pub total: usize,
    pub upcoming_duration: Duration,
}

pub struct SessionRegistry<T: VoiceTransport, R> {
    transport: Arc<T>,
    resolver: Arc<R>,
    notices: Arc<dyn NoticeSink>,
    sessions: Sessions<T::Connection>,
    voice_gates: DashMap<GuildId, Arc<Mutex<()>>>,
    poll_interval: Duration,
}

impl<T, R> SessionRegistry<T, R>
where
    T: VoiceTransport + 'static,
    R: AudioResolver<Stream = StreamOf<T>> + 'static,
{
    pub fn new(
        transport: Arc<T>,
        resolver: Arc<R>,
        notices: Arc<dyn NoticeSink>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            resolver,
            notices,
            sessions: Arc::new(DashMap::new()),
            voice_gates: DashMap::new(),
            poll_interval,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn has_session(&self, guild_id: GuildId) -> bool {
        self.sessions.contains_key(&guild_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Resolve `locator` and append it to the guild's queue, creating the
    /// session on first use.
    ///
    /// Resolution happens before the session lock is taken so a slow lookup
    /// never holds up skips or completions. An intro still playing in the
    /// guild is waited out before the session touches voice.
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        locator: &str,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<Notice> {
        let item = self.resolver.resolve(locator).await?;

        let gate = self.voice_gate(guild_id);
        let _voice = gate.lock().await;
        loop {
            let queue = self.get_or_create(guild_id);
            let mut session = queue.lock().await;

            if session.state() == SessionState::Disconnected {
                // Lost a race with a session that just ended; replace it
                drop(session);
                self.retire(guild_id, &queue);
                continue;
            }

            session.set_notice_channel(text_channel);
            let result = session.enqueue(self.transport.as_ref(), item, voice_channel).await;
            let ended = session.state() == SessionState::Disconnected;
            drop(session);

            if ended {
                self.retire(guild_id, &queue);
            }
            return result;
        }
    }

    /// Play a join intro unless the guild's voice call is already claimed.
    ///
    /// Returns `Ok(false)` when another intro or a playback session holds
    /// the guild.
    pub async fn play_intro(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        clip: StreamOf<T>,
        timeout: Duration,
    ) -> MusicResult<bool> {
        let gate = self.voice_gate(guild_id);
        let Ok(_voice) = gate.try_lock() else {
            debug!("Voice in guild {} is busy, skipping intro", guild_id);
            return Ok(false);
        };
        if self.has_session(guild_id) {
            debug!("Guild {} has a playback session, skipping intro", guild_id);
            return Ok(false);
        }

        intro_player::play_intro(self.transport.as_ref(), guild_id, channel_id, clip, timeout)
            .await?;
        Ok(true)
    }

    pub async fn pause(&self, guild_id: GuildId) -> MusicResult<Notice> {
        let queue = self.existing(guild_id).ok_or(MusicError::NotPlaying)?;
        let mut session = queue.lock().await;
        session.pause()
    }

    pub async fn resume(&self, guild_id: GuildId) -> MusicResult<Notice> {
        let queue = self.existing(guild_id).ok_or(MusicError::NotPaused)?;
        let mut session = queue.lock().await;
        session.resume()
    }

    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<Vec<Notice>> {
        let queue = self.existing(guild_id).ok_or(MusicError::NotPlaying)?;
        let mut session = queue.lock().await;
        let result = session.skip().await;
        let ended = session.state() == SessionState::Disconnected;
        drop(session);

        if ended {
            self.retire(guild_id, &queue);
        }
        result
    }

    pub async fn clear(&self, guild_id: GuildId) -> MusicResult<Notice> {
        let queue = self.existing(guild_id).ok_or(MusicError::NotConnected)?;
        let mut session = queue.lock().await;
        let result = session.clear().await;
        drop(session);

        self.retire(guild_id, &queue);
        result
    }

    pub async fn snapshot(&self, guild_id: GuildId, limit: usize) -> Option<QueueSnapshot> {
        let queue = self.existing(guild_id)?;
        let session = queue.lock().await;
        Some(QueueSnapshot {
            state: session.state(),
            now_playing: session.head_title().map(str::to_owned),
            upcoming: session.peek(limit).map(str::to_owned).collect(),
            total: session.len(),
            upcoming_duration: session.upcoming_duration(),
        })
    }

    /// State of the guild's session; a guild without one is idle.
    pub async fn state(&self, guild_id: GuildId) -> SessionState {
        match self.existing(guild_id) {
            Some(queue) => queue.lock().await.state(),
            None => SessionState::Idle,
        }
    }

    /// Drop the guild's session outright, e.g. after the bot was kicked from
    /// voice. Returns whether there was one.
    pub async fn teardown(&self, guild_id: GuildId) -> bool {
        let Some((_, session)) = self.sessions.remove(&guild_id) else {
            return false;
        };
        session.watcher.abort();
        session.queue.lock().await.shutdown().await;
        info!("Tore down playback session for guild {}", guild_id);
        true
    }

    fn voice_gate(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        let gate = self.voice_gates.entry(guild_id).or_default();
        Arc::clone(&gate)
    }

    fn existing(&self, guild_id: GuildId) -> Option<SharedQueue<T::Connection>> {
        self.sessions
            .get(&guild_id)
            .map(|session| Arc::clone(&session.queue))
    }

    fn get_or_create(&self, guild_id: GuildId) -> SharedQueue<T::Connection> {
        let session = self
            .sessions
            .entry(guild_id)
            .or_insert_with(|| self.spawn_session(guild_id));
        Arc::clone(&session.queue)
    }

    fn spawn_session(&self, guild_id: GuildId) -> Session<T::Connection> {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Arc::new(Mutex::new(PlaybackQueue::new(guild_id, tx)));
        let watcher = tokio::spawn(watch_session(
            guild_id,
            Arc::clone(&queue),
            rx,
            Arc::clone(&self.sessions),
            Arc::clone(&self.notices),
            self.poll_interval,
        ));
        info!("Created playback session for guild {}", guild_id);
        Session { queue, watcher }
    }

    /// Remove the session if it is still the one backed by `queue`.
    fn retire(&self, guild_id: GuildId, queue: &SharedQueue<T::Connection>) {
        let removed = self
            .sessions
            .remove_if(&guild_id, |_, session| Arc::ptr_eq(&session.queue, queue));
        if let Some((_, session)) = removed {
            session.watcher.abort();
            debug!("Retired playback session for guild {}", guild_id);
        }
    }
}

async fn watch_session<C>(
    guild_id: GuildId,
    queue: SharedQueue<C>,
    mut completions: mpsc::UnboundedReceiver<TrackEnded>,
    sessions: Sessions<C>,
    notices: Arc<dyn NoticeSink>,
    poll_interval: Duration,
) where
    C: VoiceConnection + 'static,
{
    let mut liveness = tokio::time::interval(poll_interval);
    liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    liveness.tick().await;

    loop {
        let (notice, channel, finished) = tokio::select! {
            ended = completions.recv() => {
                let Some(ended) = ended else { break };
                let mut session = queue.lock().await;
                let notice = session.handle_track_end(ended).await;
                (notice, session.notice_channel(), session.state() == SessionState::Disconnected)
            }
            _ = liveness.tick() => {
                let mut session = queue.lock().await;
                let notice = session.check_liveness().await;
                (notice, session.notice_channel(), session.state() == SessionState::Disconnected)
            }
        };

        if let (Some(notice), Some(channel)) = (notice, channel) {
            notices.deliver(channel, &notice).await;
        }

        if finished {
            sessions.remove_if(&guild_id, |_, session| Arc::ptr_eq(&session.queue, &queue));
            info!("Playback session for guild {} ended", guild_id);
            break;
        }
    }
}
