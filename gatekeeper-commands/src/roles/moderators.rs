//! `*addmod` / `*removemod`: grant or revoke the approval moderator role.

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::CommandMeta;
use crate::authorization::require_command_permission;
use crate::messages::mentions_required_message;
use crate::resources::ensure_resource;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error, UserInfo};
use gatekeeper_database::ResourceKind;

pub const ADDMOD_META: CommandMeta = CommandMeta {
    name: "addmod",
    desc: "Make the mentioned users approval moderators.",
    category: "roles",
    usage: "*addmod <@user...>",
};

pub const REMOVEMOD_META: CommandMeta = CommandMeta {
    name: "removemod",
    desc: "Remove the approval moderator role from the mentioned users.",
    category: "roles",
    usage: "*removemod <@user...>",
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Change {
    Grant,
    Revoke,
}

pub fn addmod<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx, Change::Grant))
}

pub fn removemod<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx, Change::Revoke))
}

async fn run(ctx: &CommandContext<'_>, change: Change) -> Result<(), Error> {
    let meta = match change {
        Change::Grant => &ADDMOD_META,
        Change::Revoke => &REMOVEMOD_META,
    };

    if !require_command_permission(ctx, serenity::Permissions::MANAGE_ROLES).await? {
        return Ok(());
    }

    if ctx.mentions.is_empty() {
        ctx.say(mentions_required_message(meta.usage)).await?;
        return Ok(());
    }

    let role_id = serenity::RoleId::new(
        ensure_resource(
            ctx.platform,
            &ctx.data.store,
            ctx.guild_id,
            ResourceKind::ModeratorRole,
        )
        .await?,
    );
    let guild_name = ctx.platform.guild_name(ctx.guild_id).await?;

    for target in ctx.mentions {
        apply_change(ctx, change, role_id, &guild_name, target).await?;
    }

    Ok(())
}

async fn apply_change(
    ctx: &CommandContext<'_>,
    change: Change,
    role_id: serenity::RoleId,
    guild_name: &str,
    target: &UserInfo,
) -> Result<(), Error> {
    let held = ctx
        .platform
        .member_roles(ctx.guild_id, target.id)
        .await?
        .contains(&role_id);

    let (notice, direct) = match (change, held) {
        (Change::Grant, true) => {
            ctx.say(format!("{} is already an approval moderator!", target.mention()))
                .await?;
            return Ok(());
        }
        (Change::Revoke, false) => {
            ctx.say(format!("{} isn't an approval moderator!", target.mention()))
                .await?;
            return Ok(());
        }
        (Change::Grant, false) => {
            ctx.platform
                .add_role(
                    ctx.guild_id,
                    target.id,
                    role_id,
                    &format!("Made approval moderator by {}", ctx.author.name),
                )
                .await?;
            (
                format!("{} is now an approval moderator!", target.mention()),
                format!("You are now an approval moderator in {guild_name}!"),
            )
        }
        (Change::Revoke, true) => {
            ctx.platform
                .remove_role(
                    ctx.guild_id,
                    target.id,
                    role_id,
                    &format!("Approval moderator removed by {}", ctx.author.name),
                )
                .await?;
            (
                format!("{} is no longer an approval moderator!", target.mention()),
                format!("You are no longer an approval moderator in {guild_name}."),
            )
        }
    };

    info!(
        guild_id = %ctx.guild_id,
        user_id = %target.id,
        moderator_id = %ctx.author.id,
        granted = change == Change::Grant,
        "approval moderator changed"
    );

    ctx.say(notice).await?;
    if let Err(source) = ctx.platform.send_direct_message(target.id, &direct).await {
        warn!(?source, user_id = %target.id, "failed to notify moderator change");
    }

    Ok(())
}
