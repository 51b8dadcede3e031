use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::Songbird;
use std::sync::Arc;
use thiserror::Error;

use super::session_registry::SessionRegistry;
use super::songbird_transport::SongbirdTransport;
use crate::commands::music::audio_sources::youtube::YtDlpResolver;

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Could not resolve audio: {0}")]
    ResolutionError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Nothing is playing")]
    NotPlaying,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("Voice transport error: {0}")]
    TransportError(String),

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// The registry the running bot uses: songbird for voice, yt-dlp for audio.
pub type MusicSessions = SessionRegistry<SongbirdTransport, YtDlpResolver>;

/// Get the Songbird voice client from the context
pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
    songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
}

/// Get the voice channel ID that the user is currently in
pub fn get_user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> MusicResult<ChannelId> {
    let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

    let voice_state = guild
        .voice_states
        .get(&user_id)
        .ok_or(MusicError::UserNotInVoiceChannel)?;

    voice_state
        .channel_id
        .ok_or(MusicError::UserNotInVoiceChannel)
}
