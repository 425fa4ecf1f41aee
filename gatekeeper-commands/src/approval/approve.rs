use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::CommandMeta;
use crate::approval::tickets::{delete_ticket_channel, resolve_ticket};
use crate::authorization::require_approval_moderator;
use crate::messages::{not_ticket_channel_message, usage_message};
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};
use gatekeeper_database::impls::role_keys::get_role_key;

pub const META: CommandMeta = CommandMeta {
    name: "approve",
    desc: "Approve the applicant of this ticket with the role behind a role key.",
    category: "approval",
    usage: "*approve <key>",
};

pub fn approve<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx))
}

async fn run(ctx: &CommandContext<'_>) -> Result<(), Error> {
    if !require_approval_moderator(ctx).await? {
        return Ok(());
    }

    let Some(ticket) = resolve_ticket(ctx.platform, ctx.guild_id, ctx.channel_id).await? else {
        ctx.say(not_ticket_channel_message()).await?;
        return Ok(());
    };

    let [key] = ctx.args() else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(role_id) = get_role_key(&ctx.data.store, ctx.guild_id.get(), key).await else {
        ctx.say(format!(
            "Role {key} not found! For a list of roles, see *listroles."
        ))
        .await?;
        return Ok(());
    };

    let roles = ctx.platform.roles(ctx.guild_id).await?;
    let Some(role) = roles.iter().find(|role| role.id.get() == role_id) else {
        warn!(guild_id = %ctx.guild_id, key = %key, role_id, "role key points at a deleted role");
        ctx.say(format!(
            "The role for {key} no longer exists! Please fix it with *removerole {key} and *addrole."
        ))
        .await?;
        return Ok(());
    };

    let applicant = ctx.platform.user(ticket.applicant_id).await?;
    let audit_reason = format!(
        "{} was approved by {} as {}",
        applicant.name, ctx.author.name, role.name
    );

    let everyone = serenity::RoleId::new(ctx.guild_id.get());
    for held in ctx.platform.member_roles(ctx.guild_id, applicant.id).await? {
        if held == everyone || held == role.id {
            continue;
        }
        if let Err(source) = ctx
            .platform
            .remove_role(ctx.guild_id, applicant.id, held, &audit_reason)
            .await
        {
            warn!(?source, user_id = %applicant.id, role_id = %held, "failed to remove role during approval");
        }
    }
    ctx.platform
        .add_role(ctx.guild_id, applicant.id, role.id, &audit_reason)
        .await?;

    delete_ticket_channel(ctx.platform, ctx.data, ctx.guild_id, &ticket.channel, &audit_reason)
        .await?;

    let guild_name = ctx.platform.guild_name(ctx.guild_id).await?;
    if let Err(source) = ctx
        .platform
        .send_direct_message(
            applicant.id,
            &format!("You have been approved in {guild_name} as {}!", role.name),
        )
        .await
    {
        warn!(?source, user_id = %applicant.id, "failed to notify approved applicant");
    }
    if let Err(source) = ctx
        .platform
        .send_direct_message(
            ctx.author.id,
            &format!(
                "You approved {} in {guild_name} as {}.",
                applicant.name, role.name
            ),
        )
        .await
    {
        warn!(?source, user_id = %ctx.author.id, "failed to notify approving moderator");
    }

    info!(
        guild_id = %ctx.guild_id,
        applicant_id = %applicant.id,
        moderator_id = %ctx.author.id,
        role = %role.name,
        "applicant approved"
    );

    Ok(())
}
