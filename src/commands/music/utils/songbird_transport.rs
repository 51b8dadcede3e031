use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::input::Input;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, Songbird, TrackEvent};
use std::sync::Arc;
use tracing::{info, warn};

use super::event_handlers::TrackEndNotifier;
use super::music_manager::{MusicError, MusicResult};
use super::queue_manager::CompletionSignal;
use super::voice_transport::{VoiceConnection, VoiceTransport};

/// Voice transport backed by the bot's songbird manager
pub struct SongbirdTransport {
    manager: Arc<Songbird>,
}

impl SongbirdTransport {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }

    /// Whether the bot currently has a voice call in the guild
    pub fn is_connected(&self, guild_id: GuildId) -> bool {
        self.manager.get(guild_id).is_some()
    }

    /// Join a channel without starting a playback session
    pub async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.manager
            .join(guild_id, channel_id)
            .await
            .map(|_| ())
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }

    /// Leave the guild's voice channel
    pub async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        if !self.is_connected(guild_id) {
            return Err(MusicError::NotConnected);
        }
        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    type Connection = SongbirdConnection;

    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<SongbirdConnection> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(SongbirdConnection {
            manager: Arc::clone(&self.manager),
            guild_id,
            call,
            track: None,
        })
    }
}

pub struct SongbirdConnection {
    manager: Arc<Songbird>,
    guild_id: GuildId,
    call: Arc<SerenityMutex<Call>>,
    track: Option<TrackHandle>,
}

impl SongbirdConnection {
    fn track(&self) -> MusicResult<&TrackHandle> {
        self.track.as_ref().ok_or(MusicError::NotPlaying)
    }
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    type Stream = Input;

    async fn play(&mut self, stream: Input, signal: CompletionSignal) -> MusicResult<()> {
        let handle = {
            let mut call = self.call.lock().await;
            call.play_only_input(stream)
        };

        let notifier = TrackEndNotifier::new(signal);
        handle
            .add_event(Event::Track(TrackEvent::End), notifier.clone())
            .map_err(|e| MusicError::TransportError(e.to_string()))?;
        handle
            .add_event(Event::Track(TrackEvent::Error), notifier)
            .map_err(|e| MusicError::TransportError(e.to_string()))?;

        self.track = Some(handle);
        Ok(())
    }

    fn pause(&mut self) -> MusicResult<()> {
        self.track()?
            .pause()
            .map_err(|e| MusicError::TransportError(e.to_string()))
    }

    fn resume(&mut self) -> MusicResult<()> {
        self.track()?
            .play()
            .map_err(|e| MusicError::TransportError(e.to_string()))
    }

    fn stop(&mut self) -> MusicResult<()> {
        match self.track.take() {
            Some(track) => track
                .stop()
                .map_err(|e| MusicError::TransportError(e.to_string())),
            None => Ok(()),
        }
    }

    async fn is_active(&self) -> bool {
        let Some(track) = &self.track else {
            return false;
        };
        match track.get_info().await {
            Ok(state) => matches!(state.playing, PlayMode::Play | PlayMode::Pause),
            Err(_) => false,
        }
    }

    async fn disconnect(&mut self) -> MusicResult<()> {
        if let Some(track) = self.track.take() {
            if let Err(e) = track.stop() {
                warn!("Failed to stop track before leaving: {}", e);
            }
        }
        if self.manager.get(self.guild_id).is_none() {
            return Ok(());
        }
        self.manager
            .remove(self.guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        info!("Left voice in guild {}", self.guild_id);
        Ok(())
    }
}
