use poise::serenity_prelude as serenity;

use crate::{CommandResult, Context};

/// Show a user's Discord ID
#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn id(
    ctx: Context<'_>,
    #[description = "User to look up"] user: serenity::User,
) -> CommandResult {
    ctx.say(format!("{}'s ID is `{}`", user.name, user.id)).await?;
    Ok(())
}

/// Show when a member joined this server
#[poise::command(slash_command, prefix_command, guild_only, category = "General")]
pub async fn joined(
    ctx: Context<'_>,
    #[description = "Member to look up"] member: serenity::Member,
) -> CommandResult {
    let joined_at = member
        .joined_at
        .map(|at| at.to_string())
        .unwrap_or_else(|| "at an unknown time".to_string());
    ctx.say(format!("{} joined {}", member.display_name(), joined_at))
        .await?;
    Ok(())
}
