use tracing::info;

use crate::{CommandResult, Context, owner_only};

/// Register slash commands globally
#[poise::command(prefix_command, slash_command, hide_in_help, check = "owner_only", category = "Admin")]
pub async fn sync(ctx: Context<'_>) -> CommandResult {
    let commands = &ctx.framework().options().commands;
    poise::builtins::register_globally(ctx.http(), commands).await?;

    info!("Registered {} commands globally", commands.len());
    ctx.say(format!("Synced {} commands.", commands.len())).await?;
    Ok(())
}
