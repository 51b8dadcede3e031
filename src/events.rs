use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::{FullEvent, GuildId, Message, Presence, UserId};
use tracing::{debug, error, info, warn};

use crate::utils::snapshots::ServerSnapshot;
use crate::{Data, Error};

/// Framework-level event handler: message counters, voice-join intros,
/// web login notices and session cleanup.
pub async fn handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
        }
        FullEvent::Message { new_message } => {
            count_message(ctx, data, new_message).await;
        }
        FullEvent::PresenceUpdate { new_data } => {
            presence_update(ctx, data, new_data).await;
        }
        #[cfg(feature = "music")]
        FullEvent::VoiceStateUpdate { old, new } => {
            voice::state_update(data, framework.bot_id, old.as_ref(), new).await;
        }
        #[cfg(feature = "music")]
        FullEvent::GuildDelete { incomplete, .. } => {
            if data.sessions.teardown(incomplete.id).await {
                info!("Removed from guild {}, playback session dropped", incomplete.id);
            }
        }
        _ => {}
    }

    #[cfg(not(feature = "music"))]
    let _ = framework;

    Ok(())
}

async fn count_message(ctx: &serenity::Context, data: &Data, message: &Message) {
    if message.author.bot {
        return;
    }
    let Some(guild_id) = message.guild_id else {
        return;
    };

    let replies = {
        let mut counters = data.counters.lock().await;
        counters.record(guild_id.get(), &message.content)
    };

    match replies {
        Ok(replies) => {
            for reply in replies {
                if let Err(e) = message.channel_id.say(&ctx.http, reply).await {
                    warn!("Failed to post counter reply in {}: {}", message.channel_id, e);
                }
            }
        }
        Err(e) => error!("Failed to update counters for guild {}: {}", guild_id, e),
    }
}

/// Announces a user coming online on the web client in the guild's monitor channel.
async fn presence_update(ctx: &serenity::Context, data: &Data, presence: &Presence) {
    let Some(guild_id) = presence.guild_id else {
        return;
    };
    let on_web = presence
        .client_status
        .as_ref()
        .is_some_and(|status| status.web.is_some());

    if !came_online_on_web(&data.web_presence, guild_id, presence.user.id, on_web) {
        return;
    }

    let Some(guild_name) = ctx.cache.guild(guild_id).map(|guild| guild.name.clone()) else {
        return;
    };
    let channel_id = match ServerSnapshot::new(&data.config.data_dir, &guild_name).monitor_channel() {
        Ok(Some(channel_id)) => serenity::ChannelId::new(channel_id),
        Ok(None) => return,
        Err(e) => {
            warn!("Failed to read monitor channel for {}: {}", guild_name, e);
            return;
        }
    };

    let name = presence
        .user
        .name
        .clone()
        .unwrap_or_else(|| presence.user.id.to_string());
    debug!("{} logged in on the web client in {}", name, guild_name);
    if let Err(e) = channel_id
        .say(
            &ctx.http,
            format!("User {} [id: {}] logged in from web.", name, presence.user.id),
        )
        .await
    {
        warn!("Failed to post web login notice: {}", e);
    }
}

/// Records a member's web status for one guild. True only when they were not
/// on the web client there before.
fn came_online_on_web(
    seen: &DashMap<(GuildId, UserId), bool>,
    guild_id: GuildId,
    user_id: UserId,
    on_web: bool,
) -> bool {
    let was_on_web = seen.insert((guild_id, user_id), on_web).unwrap_or(false);
    on_web && !was_on_web
}

#[cfg(feature = "music")]
mod voice {
    use poise::serenity_prelude as serenity;
    use serenity::{UserId, VoiceState};
    use songbird::input::{File, Input};
    use std::sync::Arc;
    use tracing::{debug, info, warn};

    use crate::Data;

    pub(super) async fn state_update(
        data: &Data,
        bot_id: UserId,
        old: Option<&VoiceState>,
        new: &VoiceState,
    ) {
        let Some(guild_id) = new.guild_id else {
            return;
        };

        if new.user_id == bot_id {
            if new.channel_id.is_none() && data.sessions.teardown(guild_id).await {
                info!("Disconnected from voice in guild {}, session torn down", guild_id);
            }
            return;
        }

        let was_in_voice = old.and_then(|state| state.channel_id).is_some();
        let Some(channel_id) = new.channel_id.filter(|_| !was_in_voice) else {
            return;
        };

        let user_id = new.user_id.get();
        let Some(clip) = data.intro_clips.get(&user_id) else {
            return;
        };
        if !data.intros.lock().await.is_enabled(user_id) {
            return;
        }

        if data.sessions.transport().is_connected(guild_id) {
            debug!("Skipping intro for {} in guild {}, voice is busy", user_id, guild_id);
            return;
        }

        let sessions = Arc::clone(&data.sessions);
        let clip: Input = File::new(clip.clone()).into();
        let timeout = data.config.intro_timeout;
        tokio::spawn(async move {
            match sessions.play_intro(guild_id, channel_id, clip, timeout).await {
                Ok(true) => debug!("Played intro for {} in guild {}", user_id, guild_id),
                Ok(false) => {}
                Err(e) => warn!("Intro failed in guild {}: {}", guild_id, e),
            }
        });
    }
}
