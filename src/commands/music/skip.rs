use super::*;

/// Skip the current track
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let result = ctx.data().sessions.skip(guild_id).await;
    reply_with_all(ctx, result).await
}
