use super::*;
use crate::commands::music::utils::embedded_messages::QUEUE_PREVIEW_LIMIT;

/// Show the current queue
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let snapshot = ctx
        .data()
        .sessions
        .snapshot(guild_id, QUEUE_PREVIEW_LIMIT)
        .await;

    ctx.send(embedded_messages::music_queue(snapshot.as_ref()))
        .await?;
    Ok(())
}
