use poise::serenity_prelude::{ChannelType, CreateInvite, CreateMessage, UserId};
use std::time::Duration;
use tracing::{info, warn};

use super::*;
use crate::{CommandResult, owner_only};

/// Delay between direct messages
const INVITE_DELAY: Duration = Duration::from_millis(500);

/// DM everyone in a saved snapshot an invite to this server
#[poise::command(slash_command, prefix_command, guild_only, check = "owner_only", category = "Admin")]
pub async fn invite_saved_users(
    ctx: Context<'_>,
    #[description = "Name of the server the snapshot was taken from (defaults to this one)"]
    source_server: Option<String>,
) -> CommandResult {
    let (guild_id, guild_name) = current_guild(ctx)?;
    let snapshot = snapshot_for(ctx, source_server.as_deref())?;
    let members = snapshot.members()?;
    if members.is_empty() {
        ctx.say("No saved users found for that server.").await?;
        return Ok(());
    }

    let mut channels: Vec<_> = guild_id
        .channels(ctx.http())
        .await?
        .into_values()
        .filter(|channel| channel.kind == ChannelType::Text)
        .collect();
    channels.sort_by_key(|channel| channel.position);
    let Some(channel) = channels.first() else {
        ctx.say("This server has no text channel to invite people to.")
            .await?;
        return Ok(());
    };
    ctx.defer().await?;

    let invite = channel
        .create_invite(ctx, CreateInvite::new().max_age(0).max_uses(0).unique(false))
        .await?;
    let text = format!("You're invited to join **{}**: {}", guild_name, invite.url());

    let (mut sent, mut failed) = (0, 0);
    for member in members {
        let user_id = UserId::new(member.user_id);
        let delivered = match user_id.to_user(ctx).await {
            Ok(user) => user
                .direct_message(ctx, CreateMessage::new().content(&text))
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        match delivered {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!("Failed to invite {}: {}", user_id, e);
                failed += 1;
            }
        }
        tokio::time::sleep(INVITE_DELAY).await;
    }

    info!("Sent {} invites to {} ({} failures)", sent, guild_name, failed);
    ctx.say(format!("Sent {} invites ({} failures).", sent, failed))
        .await?;
    Ok(())
}
