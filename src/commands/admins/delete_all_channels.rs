use poise::serenity_prelude::{ChannelType, CreateChannel};
use tracing::{info, warn};

use super::*;
use crate::{CommandResult, owner_only};

/// Delete every channel, then create a fresh #general
#[poise::command(slash_command, prefix_command, guild_only, check = "owner_only", category = "Admin")]
pub async fn delete_all_channels(ctx: Context<'_>) -> CommandResult {
    let (guild_id, guild_name) = current_guild(ctx)?;
    ctx.say("Deleting all channels...").await?;

    let (mut deleted, mut failed) = (0, 0);
    for channel_id in guild_id.channels(ctx.http()).await?.into_keys() {
        match channel_id.delete(ctx).await {
            Ok(_) => deleted += 1,
            Err(e) => {
                warn!("Failed to delete channel {}: {}", channel_id, e);
                failed += 1;
            }
        }
    }

    let general = guild_id
        .create_channel(ctx, CreateChannel::new("general").kind(ChannelType::Text))
        .await?;
    info!("Deleted {} channels in {} ({} failures)", deleted, guild_name, failed);
    general
        .id
        .say(
            ctx.http(),
            format!("Deleted {} channels ({} failures).", deleted, failed),
        )
        .await?;
    Ok(())
}
