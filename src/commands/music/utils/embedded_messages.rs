use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::CreateEmbed;

use super::{
    format_duration, music_manager::MusicError, notices::Notice, queue_manager::SessionState,
    session_registry::QueueSnapshot,
};

/// Number of upcoming items listed by the queue command
pub const QUEUE_PREVIEW_LIMIT: usize = 10;

fn error_embed(description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(description)
        .color(0xff0000)
}

/// Create an embed for a playback notice
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    match notice {
        Notice::NowPlaying { title } => CreateEmbed::new()
            .title("🎵 Now Playing")
            .description(title.clone())
            .color(0x00ff00),
        Notice::Queued { title, position } => CreateEmbed::new()
            .title("🎵 Added to Queue")
            .description(title.clone())
            .field("Position", format!("`#{}`", position), true)
            .color(0x00ff00),
        Notice::Paused { title } => CreateEmbed::new()
            .title("⏸️ Paused")
            .description(format!("Paused {}", title))
            .color(0x00ff00),
        Notice::Resumed { title } => CreateEmbed::new()
            .title("▶️ Resumed")
            .description(format!("Resumed {}", title))
            .color(0x00ff00),
        Notice::Skipped { title } => CreateEmbed::new()
            .title("⏭️ Skipped")
            .description(format!("Skipped {}", title))
            .color(0x00ff00),
        Notice::Cleared { removed } => CreateEmbed::new()
            .title("⏹️ Cleared")
            .description(format!(
                "Removed {} {} from the queue and left the channel",
                removed,
                if *removed == 1 { "track" } else { "tracks" }
            ))
            .color(0x00ff00),
        Notice::QueueFinished => CreateEmbed::new()
            .title("📭 Queue Finished")
            .description("Nothing left to play, leaving the voice channel")
            .color(0x00ff00),
    }
}

/// Create a reply carrying one or more playback notices
pub fn notices(notices: &[Notice]) -> CreateReply {
    notices
        .iter()
        .fold(CreateReply::default(), |reply, notice| {
            reply.embed(notice_embed(notice))
        })
}

/// Create a reply for a failed music operation
pub fn music_error(err: &MusicError) -> CreateReply {
    let description = match err {
        MusicError::NotPlaying => "No track is currently playing".to_string(),
        MusicError::NotPaused => "Playback is not paused".to_string(),
        MusicError::NotConnected => "I'm not connected to a voice channel".to_string(),
        MusicError::ResolutionError(reason) => format!("Couldn't find that: {}", reason),
        other => other.to_string(),
    };
    CreateReply::default().embed(error_embed(description))
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default()
        .embed(error_embed(format!(
            "You need to be in a voice channel: {}",
            err
        )))
        .ephemeral(true)
}

/// Create an embed acknowledging a search in progress
pub fn searching(query: &str) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔎 Searching")
            .description(format!("`{}`", query))
            .color(0x00ff00),
    )
}

/// Create an embed for the music queue
pub fn music_queue(snapshot: Option<&QueueSnapshot>) -> CreateReply {
    let mut description = String::new();

    match snapshot.and_then(|s| s.now_playing.as_ref().map(|title| (s.state, title))) {
        Some((SessionState::Paused, title)) => {
            description.push_str(&format!("**⏸️ Paused**\n**{}**\n\n", title));
        }
        Some((_, title)) => {
            description.push_str(&format!("**🎵 Now Playing**\n**{}**\n\n", title));
        }
        None => description.push_str("**🔇 Nothing playing**\n\n"),
    }

    match snapshot {
        Some(snapshot) if !snapshot.upcoming.is_empty() => {
            let waiting = snapshot.total.saturating_sub(1);
            description.push_str(&format!("**📋 Queue - {} tracks**\n", waiting));
            for (index, title) in snapshot.upcoming.iter().enumerate() {
                description.push_str(&format!("`{}.` {}\n", index + 1, title));
            }
            if waiting > snapshot.upcoming.len() {
                description.push_str(&format!(
                    "…and {} more\n",
                    waiting - snapshot.upcoming.len()
                ));
            }
            if snapshot.upcoming_duration.as_secs() > 0 {
                description.push_str(&format!(
                    "\n**⏱️ Total Duration:** `{}`",
                    format_duration(snapshot.upcoming_duration)
                ));
            }
        }
        _ => description.push_str("**📭 Queue is empty**"),
    }

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Music Queue")
            .description(description)
            .color(0x00ff00),
    )
}

/// Create an embed for when the bot joins a voice channel
pub fn joined_voice_channel() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔊 Joined Voice Channel")
            .description("Ready to play, use `play` to queue something")
            .color(0x00ff00),
    )
}

/// Create an embed for when the bot is already playing in the guild
pub fn already_connected() -> CreateReply {
    CreateReply::default().embed(error_embed("I'm already connected in this server"))
}

/// Create an embed for when the bot leaves a voice channel
pub fn left_voice_channel() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("👋 Left Voice Channel")
            .description("Successfully disconnected and cleared the queue")
            .color(0x00ff00),
    )
}

/// Create an embed for when the bot fails to leave a voice channel
pub fn failed_to_leave_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default().embed(error_embed(format!(
        "Failed to leave voice channel: {}",
        err
    )))
}

/// Create an embed for when the bot fails to join a voice channel
pub fn failed_to_join_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default().embed(error_embed(format!(
        "Failed to join voice channel: {}",
        err
    )))
}
