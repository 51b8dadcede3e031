use tracing::info;

use super::*;
use crate::CommandResult;

/// Post web login notices for this server in the current channel
#[poise::command(slash_command, prefix_command, guild_only, category = "Admin")]
pub async fn monitor_channel(ctx: Context<'_>) -> CommandResult {
    let snapshot = snapshot_for(ctx, None)?;
    snapshot.set_monitor_channel(ctx.channel_id().get())?;

    info!("Monitor channel set to {}", ctx.channel_id());
    ctx.say(format!("Web login notices will be posted in <#{}>.", ctx.channel_id()))
        .await?;
    Ok(())
}
