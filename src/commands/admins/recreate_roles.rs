use poise::serenity_prelude::{EditRole, Permissions, RoleId, UserId};
use std::collections::HashMap;
use tracing::{info, warn};

use super::*;
use crate::{CommandResult, owner_only};

/// Recreate saved roles and give members back the roles they had
#[poise::command(slash_command, prefix_command, guild_only, check = "owner_only", category = "Admin")]
pub async fn recreate_roles(
    ctx: Context<'_>,
    #[description = "Name of the server the snapshot was taken from (defaults to this one)"]
    source_server: Option<String>,
) -> CommandResult {
    let (guild_id, _) = current_guild(ctx)?;
    let snapshot = snapshot_for(ctx, source_server.as_deref())?;
    if !snapshot.exists() {
        ctx.say("No saved snapshot found for that server.").await?;
        return Ok(());
    }
    ctx.defer().await?;

    let existing: Vec<String> = guild_id
        .roles(ctx.http())
        .await?
        .into_values()
        .map(|role| role.name)
        .collect();

    let (mut created, mut present, mut failed) = (0, 0, 0);
    for role in snapshot.roles()? {
        if role.name == "@everyone" {
            continue;
        }
        if existing.contains(&role.name) {
            present += 1;
            continue;
        }
        let builder = EditRole::new()
            .name(&role.name)
            .colour(role.colour)
            .permissions(Permissions::from_bits_truncate(role.permissions));
        match guild_id.create_role(ctx, builder).await {
            Ok(_) => created += 1,
            Err(e) => {
                warn!("Failed to create role {}: {}", role.name, e);
                failed += 1;
            }
        }
    }

    let by_name: HashMap<String, RoleId> = guild_id
        .roles(ctx.http())
        .await?
        .into_values()
        .map(|role| (role.name, role.id))
        .collect();

    let mut assigned = 0;
    for record in snapshot.members()? {
        let role_ids: Vec<RoleId> = record
            .roles
            .iter()
            .filter_map(|name| by_name.get(name).copied())
            .collect();
        if role_ids.is_empty() {
            continue;
        }
        match guild_id.member(ctx, UserId::new(record.user_id)).await {
            Ok(member) => match member.add_roles(ctx, &role_ids).await {
                Ok(()) => assigned += 1,
                Err(e) => {
                    warn!("Failed to assign roles to {}: {}", record.user_id, e);
                    failed += 1;
                }
            },
            Err(_) => {
                warn!("Saved member {} is not in the server", record.user_id);
                failed += 1;
            }
        }
    }

    info!(
        "Recreated roles: {} created, {} already present, {} members updated, {} failures",
        created, present, assigned, failed
    );
    ctx.say(format!(
        "Created {} roles ({} already existed), restored roles for {} members, {} failures.",
        created, present, assigned, failed
    ))
    .await?;
    Ok(())
}
