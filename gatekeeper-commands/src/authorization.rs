//! The two authorization tiers.
//!
//! Approval actions require the custom moderator role; administrative
//! actions require native permission bits. Both deny with a message in the
//! invoking channel and return `false`, and callers stop on `false`.

use poise::serenity_prelude as serenity;
use tracing::debug;

use gatekeeper_core::{Error, Platform, UserInfo};
use gatekeeper_database::ResourceKind;
use gatekeeper_utils::permissions::{missing_permissions, permission_names};

use crate::resources::ensure_resource;
use crate::router::CommandContext;

/// True when `user` holds `moderator_role_id`; otherwise deny.
pub async fn require_moderator(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    user: &UserInfo,
    moderator_role_id: serenity::RoleId,
) -> Result<bool, Error> {
    let roles = platform.member_roles(guild_id, user.id).await?;
    if roles.contains(&moderator_role_id) {
        return Ok(true);
    }

    debug!(user_id = %user.id, guild_id = %guild_id, "denied: not an approval moderator");
    platform
        .send_message(
            channel_id,
            &format!("{} you aren't an approval moderator!", user.mention()),
        )
        .await?;
    Ok(false)
}

/// True when `user` holds every permission in `required`; otherwise deny,
/// naming the missing permissions.
pub async fn require_permission(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    user: &UserInfo,
    required: serenity::Permissions,
) -> Result<bool, Error> {
    let held = platform.permissions(guild_id, user.id).await?;
    let missing = missing_permissions(held, required);
    if missing.is_empty() {
        return Ok(true);
    }

    let names = permission_names(missing).join(", ");
    debug!(user_id = %user.id, guild_id = %guild_id, missing = %names, "denied: missing permissions");
    platform
        .send_message(
            channel_id,
            &format!("{} you don't have the permission(s) {}!", user.mention(), names),
        )
        .await?;
    Ok(false)
}

/// Gate a command on the guild's moderator role, creating the role first if
/// the guild does not have one yet.
pub async fn require_approval_moderator(ctx: &CommandContext<'_>) -> Result<bool, Error> {
    let role_id = ensure_resource(
        ctx.platform,
        &ctx.data.store,
        ctx.guild_id,
        ResourceKind::ModeratorRole,
    )
    .await?;

    require_moderator(
        ctx.platform,
        ctx.guild_id,
        ctx.channel_id,
        ctx.author,
        serenity::RoleId::new(role_id),
    )
    .await
}

pub async fn require_command_permission(
    ctx: &CommandContext<'_>,
    required: serenity::Permissions,
) -> Result<bool, Error> {
    require_permission(ctx.platform, ctx.guild_id, ctx.channel_id, ctx.author, required).await
}
