use super::*;

/// Pause the current track
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = ctx.data().sessions.pause(guild_id).await;
    reply_with(ctx, result).await
}

/// Resume the paused track
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = ctx.data().sessions.resume(guild_id).await;
    reply_with(ctx, result).await
}
