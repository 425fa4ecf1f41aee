use tracing::{info, warn};

use crate::CommandMeta;
use crate::approval::tickets::{delete_ticket_channel, resolve_ticket};
use crate::authorization::require_approval_moderator;
use crate::messages::{not_ticket_channel_message, reason_required_message};
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Ban the applicant of this ticket.",
    category: "approval",
    usage: "*ban <reason>",
};

pub fn ban<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
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

    if ctx.args().is_empty() {
        ctx.say(reason_required_message(META.usage)).await?;
        return Ok(());
    }
    let reason = ctx.command.rest(0);

    let guild_name = ctx.platform.guild_name(ctx.guild_id).await?;
    let audit_reason = format!("Banned by {}. Reason: '{}'", ctx.author.name, reason);

    delete_ticket_channel(ctx.platform, ctx.data, ctx.guild_id, &ticket.channel, &audit_reason)
        .await?;

    // Must go out before the ban, a banned user shares no guild with the bot.
    if let Err(source) = ctx
        .platform
        .send_direct_message(
            ticket.applicant_id,
            &format!("You have been banned from {guild_name}. Reason: {reason}"),
        )
        .await
    {
        warn!(?source, user_id = %ticket.applicant_id, "failed to notify banned applicant");
    }

    ctx.platform
        .ban(ctx.guild_id, ticket.applicant_id, &audit_reason)
        .await?;

    if let Err(source) = ctx
        .platform
        .send_direct_message(
            ctx.author.id,
            &format!(
                "You banned {} from {guild_name}. Reason: {reason}",
                ticket.applicant_mention()
            ),
        )
        .await
    {
        warn!(?source, user_id = %ctx.author.id, "failed to notify banning moderator");
    }

    info!(
        guild_id = %ctx.guild_id,
        applicant_id = %ticket.applicant_id,
        moderator_id = %ctx.author.id,
        "applicant banned"
    );

    Ok(())
}
