//! `*jail` / `*unjail`: confine members to the jail channel with the
//! `Jailed` role.

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::CommandMeta;
use crate::authorization::require_command_permission;
use crate::messages::{channel_mention, mentions_required_message};
use crate::resources::ensure_resource;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error, UserInfo};
use gatekeeper_database::ResourceKind;
use gatekeeper_utils::permissions::missing_permissions;

pub const JAIL_META: CommandMeta = CommandMeta {
    name: "jail",
    desc: "Jail the mentioned users.",
    category: "jail",
    usage: "*jail <@user...>",
};

pub const UNJAIL_META: CommandMeta = CommandMeta {
    name: "unjail",
    desc: "Release the mentioned users from jail.",
    category: "jail",
    usage: "*unjail <@user...>",
};

pub fn jail<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx, true))
}

pub fn unjail<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx, false))
}

async fn run(ctx: &CommandContext<'_>, jailing: bool) -> Result<(), Error> {
    let usage = if jailing { JAIL_META.usage } else { UNJAIL_META.usage };

    if !require_command_permission(ctx, serenity::Permissions::KICK_MEMBERS).await? {
        return Ok(());
    }

    if ctx.mentions.is_empty() {
        ctx.say(mentions_required_message(usage)).await?;
        return Ok(());
    }

    let jailed_role = serenity::RoleId::new(
        ensure_resource(ctx.platform, &ctx.data.store, ctx.guild_id, ResourceKind::JailedRole)
            .await?,
    );
    let jail_channel = serenity::ChannelId::new(
        ensure_resource(ctx.platform, &ctx.data.store, ctx.guild_id, ResourceKind::JailChannel)
            .await?,
    );
    let guild_name = ctx.platform.guild_name(ctx.guild_id).await?;

    for target in ctx.mentions {
        if jailing {
            jail_one(ctx, jailed_role, jail_channel, &guild_name, target).await?;
        } else {
            unjail_one(ctx, jailed_role, &guild_name, target).await?;
        }
    }

    Ok(())
}

async fn jail_one(
    ctx: &CommandContext<'_>,
    jailed_role: serenity::RoleId,
    jail_channel: serenity::ChannelId,
    guild_name: &str,
    target: &UserInfo,
) -> Result<(), Error> {
    let held = ctx.platform.permissions(ctx.guild_id, target.id).await?;
    if missing_permissions(held, serenity::Permissions::KICK_MEMBERS).is_empty() {
        ctx.say(format!("{} can't be jailed!", target.mention())).await?;
        return Ok(());
    }

    let roles = ctx.platform.member_roles(ctx.guild_id, target.id).await?;
    if roles.contains(&jailed_role) {
        ctx.say(format!("{} is already jailed!", target.mention())).await?;
        return Ok(());
    }

    ctx.platform
        .add_role(
            ctx.guild_id,
            target.id,
            jailed_role,
            &format!("Jailed by {}", ctx.author.name),
        )
        .await?;
    info!(guild_id = %ctx.guild_id, user_id = %target.id, moderator_id = %ctx.author.id, "member jailed");

    ctx.say(format!("{} has been jailed!", target.mention())).await?;
    notify(
        ctx,
        target,
        &format!(
            "You have been jailed in {guild_name}. You can talk to the moderators in {}.",
            channel_mention(jail_channel)
        ),
    )
    .await;

    Ok(())
}

async fn unjail_one(
    ctx: &CommandContext<'_>,
    jailed_role: serenity::RoleId,
    guild_name: &str,
    target: &UserInfo,
) -> Result<(), Error> {
    let roles = ctx.platform.member_roles(ctx.guild_id, target.id).await?;
    if !roles.contains(&jailed_role) {
        ctx.say(format!("{} isn't jailed!", target.mention())).await?;
        return Ok(());
    }

    ctx.platform
        .remove_role(
            ctx.guild_id,
            target.id,
            jailed_role,
            &format!("Unjailed by {}", ctx.author.name),
        )
        .await?;
    info!(guild_id = %ctx.guild_id, user_id = %target.id, moderator_id = %ctx.author.id, "member unjailed");

    ctx.say(format!("{} has been unjailed!", target.mention())).await?;
    notify(ctx, target, &format!("You have been unjailed in {guild_name}.")).await;

    Ok(())
}

async fn notify(ctx: &CommandContext<'_>, target: &UserInfo, content: &str) {
    if let Err(source) = ctx.platform.send_direct_message(target.id, content).await {
        warn!(?source, user_id = %target.id, "failed to notify jail change");
    }
}
