use tracing::error;

use crate::{CommandResult, Context};

/// Turn your voice-join intro on or off
#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn toggle_intro(ctx: Context<'_>) -> CommandResult {
    let user_id = ctx.author().id.get();

    if !ctx.data().intro_clips.contains_key(&user_id) {
        ctx.say("You don't have an intro set up.").await?;
        return Ok(());
    }

    let toggled = ctx.data().intros.lock().await.toggle(user_id);
    match toggled {
        Ok(true) => ctx.say("Your intro is now **on**.").await?,
        Ok(false) => ctx.say("Your intro is now **off**.").await?,
        Err(e) => {
            error!("Failed to save intro toggle for {}: {}", user_id, e);
            ctx.say("Couldn't save your intro setting, try again later.")
                .await?
        }
    };
    Ok(())
}
