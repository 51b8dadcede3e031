pub(crate) mod delete_all_channels;
pub(crate) mod invite_saved_users;
pub(crate) mod kick_all;
pub(crate) mod monitor_channel;
pub(crate) mod recreate_roles;
pub(crate) mod save_users;
pub(crate) mod sync;

use crate::utils::snapshots::ServerSnapshot;
use crate::{Context, Error};
use poise::serenity_prelude::GuildId;

/// The invoking guild's id and its cached name
fn current_guild(ctx: Context<'_>) -> Result<(GuildId, String), Error> {
    let guild = ctx.guild().ok_or("This command must be used in a server")?;
    Ok((guild.id, guild.name.clone()))
}

/// Snapshot directory for a server named by the caller, or the current one
fn snapshot_for(ctx: Context<'_>, server_name: Option<&str>) -> Result<ServerSnapshot, Error> {
    let name = match server_name {
        Some(name) => name.to_string(),
        None => current_guild(ctx)?.1,
    };
    Ok(ServerSnapshot::new(&ctx.data().config.data_dir, &name))
}
