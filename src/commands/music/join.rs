use super::*;
use crate::commands::music::utils::music_manager::get_user_voice_channel;

/// Join your voice channel without playing anything
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = command_guild(ctx)?;
    let sessions = &ctx.data().sessions;

    if sessions.has_session(guild_id) {
        ctx.send(embedded_messages::already_connected()).await?;
        return Ok(());
    }

    let channel_id =
        match get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(embedded_messages::user_not_in_voice_channel(err))
                    .await?;
                return Ok(());
            }
        };

    match sessions.transport().join(guild_id, channel_id).await {
        Ok(()) => ctx.send(embedded_messages::joined_voice_channel()).await?,
        Err(err) => {
            ctx.send(embedded_messages::failed_to_join_voice_channel(err))
                .await?
        }
    };
    Ok(())
}
