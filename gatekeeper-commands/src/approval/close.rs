use crate::CommandMeta;
use crate::approval::tickets::{close_ticket, resolve_ticket};
use crate::authorization::require_approval_moderator;
use crate::messages::{not_ticket_channel_message, reason_required_message};
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};

pub const META: CommandMeta = CommandMeta {
    name: "close",
    desc: "Close this ticket without approving or banning the applicant.",
    category: "approval",
    usage: "*close <reason>",
};

pub fn close<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
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

    close_ticket(
        ctx.platform,
        ctx.data,
        ctx.guild_id,
        &ticket,
        &ctx.command.rest(0),
        Some(ctx.author),
    )
    .await
}
