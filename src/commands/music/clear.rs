use super::*;

/// Stop playback, empty the queue and leave the voice channel
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = ctx.data().sessions.clear(guild_id).await;
    reply_with(ctx, result).await
}
