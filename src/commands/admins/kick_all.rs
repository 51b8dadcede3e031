use futures::StreamExt;
use tracing::{info, warn};

use super::*;
use crate::{CommandResult, owner_only};

/// Kick every member except the bot and the server owner
#[poise::command(slash_command, prefix_command, guild_only, check = "owner_only", category = "Admin")]
pub async fn kick_all(ctx: Context<'_>) -> CommandResult {
    let (guild_id, guild_name) = current_guild(ctx)?;
    let owner_id = ctx.guild().map(|guild| guild.owner_id);
    let bot_id = ctx.framework().bot_id;
    ctx.defer().await?;

    let (mut kicked, mut failed) = (0, 0);
    let mut members = guild_id.members_iter(ctx.http()).boxed();
    while let Some(member) = members.next().await {
        let Ok(member) = member else {
            failed += 1;
            continue;
        };
        if member.user.id == bot_id || Some(member.user.id) == owner_id {
            continue;
        }
        match member.kick_with_reason(ctx, "Server reset").await {
            Ok(()) => kicked += 1,
            Err(e) => {
                warn!("Failed to kick {}: {}", member.user.name, e);
                failed += 1;
            }
        }
    }

    info!("Kicked {} members from {} ({} failures)", kicked, guild_name, failed);
    ctx.say(format!("Kicked {} members ({} failures).", kicked, failed))
        .await?;
    Ok(())
}
