pub(crate) mod clear;
pub(crate) mod join;
pub(crate) mod leave;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod skip;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context, Error};
use poise::serenity_prelude::GuildId;
use tracing::warn;
use utils::{
    embedded_messages,
    music_manager::{MusicError, MusicResult},
    notices::Notice,
};

/// The guild a music command was invoked in
fn command_guild(ctx: Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as Error)
}

/// Reply with the notice a session operation produced, or the reason it failed
async fn reply_with(ctx: Context<'_>, result: MusicResult<Notice>) -> CommandResult {
    reply_with_all(ctx, result.map(|notice| vec![notice])).await
}

async fn reply_with_all(ctx: Context<'_>, result: MusicResult<Vec<Notice>>) -> CommandResult {
    match result {
        Ok(notices) => {
            ctx.send(embedded_messages::notices(&notices)).await?;
        }
        Err(err) => {
            warn!("{} failed: {}", ctx.command().name, err);
            ctx.send(embedded_messages::music_error(&err)).await?;
        }
    }
    Ok(())
}
