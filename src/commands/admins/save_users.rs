use futures::StreamExt;
use poise::serenity_prelude::RoleId;
use std::collections::HashMap;
use tracing::{info, warn};

use super::*;
use crate::utils::snapshots::{MemberSnapshot, RoleSnapshot};
use crate::{CommandResult, owner_only};

/// Save every member's roles and every role's settings to disk
#[poise::command(slash_command, prefix_command, guild_only, check = "owner_only", category = "Admin")]
pub async fn save_users(ctx: Context<'_>) -> CommandResult {
    let (guild_id, guild_name) = current_guild(ctx)?;
    let snapshot = snapshot_for(ctx, Some(&guild_name))?;
    ctx.defer().await?;

    let everyone = guild_id.everyone_role();
    let roles = guild_id.roles(ctx.http()).await?;
    let role_names: HashMap<RoleId, String> = roles
        .iter()
        .map(|(id, role)| (*id, role.name.clone()))
        .collect();

    let mut saved_roles = 0;
    for role in roles.values().filter(|role| role.id != everyone) {
        let role = RoleSnapshot {
            name: role.name.clone(),
            colour: role.colour.0,
            permissions: role.permissions.bits(),
        };
        match snapshot.write_role(&role) {
            Ok(()) => saved_roles += 1,
            Err(e) => warn!("Failed to save role {}: {}", role.name, e),
        }
    }

    let mut saved_members = 0;
    let mut failed = 0;
    let mut members = guild_id.members_iter(ctx.http()).boxed();
    while let Some(member) = members.next().await {
        let member = match member {
            Ok(member) => member,
            Err(e) => {
                warn!("Failed to fetch a member of {}: {}", guild_name, e);
                failed += 1;
                continue;
            }
        };
        let record = MemberSnapshot {
            user_id: member.user.id.get(),
            roles: member
                .roles
                .iter()
                .filter_map(|id| role_names.get(id).cloned())
                .collect(),
        };
        match snapshot.write_member(&member.user.name, &record) {
            Ok(()) => saved_members += 1,
            Err(e) => {
                warn!("Failed to save member {}: {}", member.user.name, e);
                failed += 1;
            }
        }
    }

    info!(
        "Saved {} members and {} roles of {} to {}",
        saved_members,
        saved_roles,
        guild_name,
        snapshot.root().display()
    );
    ctx.say(format!(
        "Saved {} members and {} roles ({} failures).",
        saved_members, saved_roles, failed
    ))
    .await?;
    Ok(())
}
