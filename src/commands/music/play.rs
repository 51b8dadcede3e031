use super::*;
use crate::commands::music::utils::music_manager::get_user_voice_channel;
use tracing::info;

/// Play a song from YouTube or a direct URL, or resume when given nothing
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[rest]
    #[description = "URL or search query"]
    query: Option<String>,
) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let sessions = &ctx.data().sessions;

    let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
        return reply_with(ctx, sessions.resume(guild_id).await).await;
    };
    info!("Received play command with query: {}", query);

    // Get the user's voice channel
    let channel_id =
        match get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(embedded_messages::user_not_in_voice_channel(err))
                    .await?;
                return Ok(());
            }
        };

    // Defer the response since resolving might take time
    ctx.defer().await?;
    ctx.send(embedded_messages::searching(&query)).await?;

    let result = sessions
        .enqueue(guild_id, &query, channel_id, ctx.channel_id())
        .await;
    reply_with(ctx, result).await
}
