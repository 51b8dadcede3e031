//! The seams between the playback queue and the outside world: opening voice
//! connections and driving a single stream over one.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};

use super::music_manager::MusicResult;
use super::queue_manager::CompletionSignal;

/// Opens voice connections. One connection per guild at a time.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    type Connection: VoiceConnection + 'static;

    /// Join `channel_id` in `guild_id` and hand back the live connection.
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId)
    -> MusicResult<Self::Connection>;
}

/// A live voice connection able to stream one item at a time.
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    /// Playable, single-use stream handle accepted by [`VoiceConnection::play`].
    type Stream: Send + 'static;

    /// Start streaming. The transport must fire `signal` exactly once when the
    /// stream ends, whether it finished or failed.
    async fn play(&mut self, stream: Self::Stream, signal: CompletionSignal) -> MusicResult<()>;

    fn pause(&mut self) -> MusicResult<()>;

    fn resume(&mut self) -> MusicResult<()>;

    fn stop(&mut self) -> MusicResult<()>;

    /// Whether the current stream is still playing or paused.
    async fn is_active(&self) -> bool;

    async fn disconnect(&mut self) -> MusicResult<()>;
}

/// Shorthand for the stream type a transport's connections accept.
pub type StreamOf<T> = <<T as VoiceTransport>::Connection as VoiceConnection>::Stream;
