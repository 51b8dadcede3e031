use serenity::model::id::{ChannelId, GuildId};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::music_manager::MusicResult;
use super::queue_manager::{CompletionSignal, TrackOutcome};
use super::voice_transport::{StreamOf, VoiceConnection, VoiceTransport};

/// Join, play a single clip and leave. Gives up on the clip after `timeout`.
///
/// An intro shares the guild's only voice connection, so bot code goes
/// through [`SessionRegistry::play_intro`](super::session_registry::SessionRegistry::play_intro)
/// which keeps it apart from playback sessions.
pub async fn play_intro<T>(
    transport: &T,
    guild_id: GuildId,
    channel_id: ChannelId,
    clip: StreamOf<T>,
    timeout: Duration,
) -> MusicResult<()>
where
    T: VoiceTransport + ?Sized,
{
    let mut connection = transport.connect(guild_id, channel_id).await?;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = match connection.play(clip, CompletionSignal::new(0, tx)).await {
        Ok(()) => {
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(ended)) => {
                    if let TrackOutcome::Errored(reason) = ended.outcome {
                        warn!("Intro in guild {} failed: {}", guild_id, reason);
                    }
                }
                Ok(None) => {}
                Err(_) => {
                    warn!("Intro in guild {} timed out after {:?}", guild_id, timeout);
                    if let Err(e) = connection.stop() {
                        warn!("Failed to stop intro in guild {}: {}", guild_id, e);
                    }
                }
            }
            Ok(())
        }
        Err(err) => Err(err),
    };

    if let Err(e) = connection.disconnect().await {
        warn!("Failed to leave after intro in guild {}: {}", guild_id, e);
    }
    info!("Finished intro in guild {}", guild_id);
    result
}
