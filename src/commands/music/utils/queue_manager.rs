use serenity::model::id::{ChannelId, GuildId};
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::music_manager::{MusicError, MusicResult};
use super::notices::Notice;
use super::voice_transport::{VoiceConnection, VoiceTransport};

/// Where a guild's voice session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Playing,
    Paused,
    Disconnected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Disconnected => "disconnected",
        };
        f.write_str(label)
    }
}

/// A queued track. The stream is single-use and is taken when the item starts.
pub struct QueueItem<S> {
    pub title: String,
    pub source_locator: String,
    pub duration: Option<Duration>,
    stream: Option<S>,
    scratch_file: Option<PathBuf>,
}

impl<S> QueueItem<S> {
    pub fn new(title: impl Into<String>, source_locator: impl Into<String>, stream: S) -> Self {
        Self {
            title: title.into(),
            source_locator: source_locator.into(),
            duration: None,
            stream: Some(stream),
            scratch_file: None,
        }
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    /// Mark a local file that must be deleted once this item leaves the queue.
    pub fn with_scratch_file(mut self, path: PathBuf) -> Self {
        self.scratch_file = Some(path);
        self
    }

    pub fn scratch_file(&self) -> Option<&PathBuf> {
        self.scratch_file.as_ref()
    }

    /// True once the stream has been handed to a voice connection.
    pub fn is_started(&self) -> bool {
        self.stream.is_none()
    }

    fn take_stream(&mut self) -> Option<S> {
        self.stream.take()
    }

    /// Drop the item, deleting its scratch file if it has one.
    pub fn release(self) {
        if let Some(path) = self.scratch_file {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }
}

impl<S> fmt::Debug for QueueItem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("title", &self.title)
            .field("source_locator", &self.source_locator)
            .field("duration", &self.duration)
            .field("started", &self.is_started())
            .field("scratch_file", &self.scratch_file)
            .finish()
    }
}

/// How a stream came to an end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Finished,
    Errored(String),
}

/// Delivered to the session watcher when a stream ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEnded {
    pub token: u64,
    pub outcome: TrackOutcome,
}

/// One-shot completion callback handed to a voice connection for a single stream.
///
/// The token ties the signal to the play call that created it, so a signal
/// that arrives after the queue has moved on is recognised as stale.
#[derive(Debug)]
pub struct CompletionSignal {
    token: u64,
    tx: mpsc::UnboundedSender<TrackEnded>,
}

impl CompletionSignal {
    pub fn new(token: u64, tx: mpsc::UnboundedSender<TrackEnded>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn fire(self, outcome: TrackOutcome) {
        let ended = TrackEnded {
            token: self.token,
            outcome,
        };
        if self.tx.send(ended).is_err() {
            debug!("Completion for play token {} dropped, session is gone", self.token);
        }
    }
}

/// Ordered playback queue and state machine for a single guild.
///
/// Every mutating method expects to be called while holding the session's
/// lock, which is what serialises enqueue, skip and completion handling.
pub struct PlaybackQueue<C: VoiceConnection> {
    guild_id: GuildId,
    state: SessionState,
    items: VecDeque<QueueItem<C::Stream>>,
    connection: Option<C>,
    streaming: bool,
    play_token: u64,
    completions: mpsc::UnboundedSender<TrackEnded>,
    notice_channel: Option<ChannelId>,
}

impl<C: VoiceConnection> PlaybackQueue<C> {
    pub fn new(guild_id: GuildId, completions: mpsc::UnboundedSender<TrackEnded>) -> Self {
        Self {
            guild_id,
            state: SessionState::Idle,
            items: VecDeque::new(),
            connection: None,
            streaming: false,
            play_token: 0,
            completions,
            notice_channel: None,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Title of the item at the head of the queue, playing or paused
    pub fn head_title(&self) -> Option<&str> {
        self.items.front().map(|item| item.title.as_str())
    }

    /// Titles of up to `limit` items waiting behind the head, in play order
    pub fn peek(&self, limit: usize) -> impl Iterator<Item = &str> + Clone + '_ {
        self.items
            .iter()
            .skip(1)
            .take(limit)
            .map(|item| item.title.as_str())
    }

    /// Total known duration of the items behind the head
    pub fn upcoming_duration(&self) -> Duration {
        self.items.iter().skip(1).filter_map(|item| item.duration).sum()
    }

    pub fn notice_channel(&self) -> Option<ChannelId> {
        self.notice_channel
    }

    pub fn set_notice_channel(&mut self, channel_id: ChannelId) {
        self.notice_channel = Some(channel_id);
    }

    /// Append an item. The first item of an idle session opens the voice
    /// connection and starts playing straight away.
    pub async fn enqueue<T>(
        &mut self,
        transport: &T,
        item: QueueItem<C::Stream>,
        voice_channel: ChannelId,
    ) -> MusicResult<Notice>
    where
        T: VoiceTransport<Connection = C> + ?Sized,
    {
        match self.state {
            SessionState::Disconnected => return Err(MusicError::NotConnected),
            SessionState::Playing | SessionState::Paused => {
                let title = item.title.clone();
                self.items.push_back(item);
                let position = self.items.len() - 1;
                info!(
                    "Queued '{}' at position {} in guild {}",
                    title, position, self.guild_id
                );
                return Ok(Notice::Queued { title, position });
            }
            SessionState::Idle | SessionState::Connecting => {}
        }

        self.items.push_back(item);
        self.state = SessionState::Connecting;
        debug!(
            "Connecting to voice channel {} in guild {}",
            voice_channel, self.guild_id
        );

        match transport.connect(self.guild_id, voice_channel).await {
            Ok(connection) => self.connection = Some(connection),
            Err(err) => {
                warn!("Voice connection failed in guild {}: {}", self.guild_id, err);
                self.release_all();
                self.state = SessionState::Disconnected;
                return Err(err);
            }
        }

        match self.advance().await {
            notice @ Notice::NowPlaying { .. } => Ok(notice),
            _ => Err(MusicError::TransportError(
                "could not start playback".to_string(),
            )),
        }
    }

    pub fn pause(&mut self) -> MusicResult<Notice> {
        if self.state != SessionState::Playing {
            return Err(MusicError::NotPlaying);
        }
        let title = self.head_title().unwrap_or_default().to_string();
        self.connection
            .as_mut()
            .ok_or(MusicError::NotConnected)?
            .pause()?;
        self.state = SessionState::Paused;
        info!("Paused '{}' in guild {}", title, self.guild_id);
        Ok(Notice::Paused { title })
    }

    pub fn resume(&mut self) -> MusicResult<Notice> {
        if self.state != SessionState::Paused {
            return Err(MusicError::NotPaused);
        }
        let title = self.head_title().unwrap_or_default().to_string();
        self.connection
            .as_mut()
            .ok_or(MusicError::NotConnected)?
            .resume()?;
        self.state = SessionState::Playing;
        info!("Resumed '{}' in guild {}", title, self.guild_id);
        Ok(Notice::Resumed { title })
    }

    /// Abandon the head item and move on. Returns the skip notice followed by
    /// whatever the advance produced.
    pub async fn skip(&mut self) -> MusicResult<Vec<Notice>> {
        if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
            return Err(MusicError::NotPlaying);
        }

        self.stop_stream();
        let title = self.evict_head().unwrap_or_default();
        info!("Skipped '{}' in guild {}", title, self.guild_id);

        let next = self.advance().await;
        Ok(vec![Notice::Skipped { title }, next])
    }

    /// Stop playback, drop every item and leave the voice channel.
    pub async fn clear(&mut self) -> MusicResult<Notice> {
        if self.state == SessionState::Disconnected {
            return Err(MusicError::NotConnected);
        }

        self.stop_stream();
        let removed = self.items.len();
        self.release_all();
        self.disconnect().await;
        info!("Cleared {} items in guild {}", removed, self.guild_id);
        Ok(Notice::Cleared { removed })
    }

    /// React to a stream ending. Stale or duplicate signals are ignored.
    pub async fn handle_track_end(&mut self, ended: TrackEnded) -> Option<Notice> {
        if ended.token != self.play_token || !self.streaming {
            debug!(
                "Ignoring stale completion {} in guild {} (current {})",
                ended.token, self.guild_id, self.play_token
            );
            return None;
        }

        if let TrackOutcome::Errored(reason) = &ended.outcome {
            warn!(
                "Stream failed in guild {}: {}",
                self.guild_id,
                MusicError::TransportError(reason.clone())
            );
        }

        self.streaming = false;
        self.evict_head();
        Some(self.advance().await)
    }

    /// Catch streams that ended without firing their completion signal.
    pub async fn check_liveness(&mut self) -> Option<Notice> {
        if self.state != SessionState::Playing || !self.streaming {
            return None;
        }

        let active = match &self.connection {
            Some(connection) => connection.is_active().await,
            None => false,
        };
        if active {
            return None;
        }

        info!(
            "Stream in guild {} is no longer active, treating it as finished",
            self.guild_id
        );
        self.streaming = false;
        // A late completion for the lost stream is stale from here on
        self.play_token += 1;
        self.evict_head();
        Some(self.advance().await)
    }

    /// Stop everything and disconnect without producing a notice.
    pub async fn shutdown(&mut self) {
        self.stop_stream();
        self.release_all();
        if self.state != SessionState::Disconnected {
            self.disconnect().await;
        }
    }

    /// Start the head item, discarding any that fail to start. Disconnects
    /// once the queue runs dry.
    async fn advance(&mut self) -> Notice {
        loop {
            if self.items.is_empty() {
                self.disconnect().await;
                return Notice::QueueFinished;
            }
            let (title, stream) = match self.items.front_mut() {
                Some(head) => (head.title.clone(), head.take_stream()),
                None => continue,
            };

            let Some(stream) = stream else {
                warn!("'{}' was already played, dropping it", title);
                self.evict_head();
                continue;
            };

            match self.play_stream(stream).await {
                Ok(()) => {
                    self.state = SessionState::Playing;
                    info!("Now playing '{}' in guild {}", title, self.guild_id);
                    return Notice::NowPlaying { title };
                }
                Err(err) => {
                    warn!(
                        "Failed to start '{}' in guild {}: {}",
                        title, self.guild_id, err
                    );
                    self.evict_head();
                }
            }
        }
    }

    async fn play_stream(&mut self, stream: C::Stream) -> MusicResult<()> {
        if self.streaming {
            return Err(MusicError::TransportError(
                "a stream is already active for this session".to_string(),
            ));
        }
        let connection = self.connection.as_mut().ok_or(MusicError::NotConnected)?;

        self.play_token += 1;
        let signal = CompletionSignal::new(self.play_token, self.completions.clone());
        connection.play(stream, signal).await?;
        self.streaming = true;
        Ok(())
    }

    /// Halt the current stream. Bumping the token makes the completion the
    /// transport fires for the halted stream stale.
    fn stop_stream(&mut self) {
        if self.streaming {
            if let Some(connection) = self.connection.as_mut() {
                if let Err(e) = connection.stop() {
                    warn!("Failed to stop stream in guild {}: {}", self.guild_id, e);
                }
            }
            self.streaming = false;
        }
        self.play_token += 1;
    }

    fn evict_head(&mut self) -> Option<String> {
        let item = self.items.pop_front()?;
        let title = item.title.clone();
        item.release();
        Some(title)
    }

    fn release_all(&mut self) {
        for item in self.items.drain(..) {
            item.release();
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.disconnect().await {
                warn!("Failed to disconnect in guild {}: {}", self.guild_id, e);
            }
        }
        self.streaming = false;
        self.state = SessionState::Disconnected;
        info!("Voice session for guild {} disconnected", self.guild_id);
    }
}
