use super::*;

/// Leave the voice channel
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let sessions = &ctx.data().sessions;

    // A playback session owns the connection; tearing it down leaves the channel
    if sessions.teardown(guild_id).await {
        ctx.send(embedded_messages::left_voice_channel()).await?;
        return Ok(());
    }

    match sessions.transport().leave(guild_id).await {
        Ok(()) => {
            ctx.send(embedded_messages::left_voice_channel()).await?;
        }
        Err(err) => {
            ctx.send(embedded_messages::failed_to_leave_voice_channel(err))
                .await?;
        }
    }

    Ok(())
}
