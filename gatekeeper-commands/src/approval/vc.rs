use tracing::debug;

use crate::CommandMeta;
use crate::approval::tickets::resolve_ticket;
use crate::authorization::require_approval_moderator;
use crate::messages::not_ticket_channel_message;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};

pub const META: CommandMeta = CommandMeta {
    name: "vc",
    desc: "Ask the applicant of this ticket to join the voice channel.",
    category: "approval",
    usage: "*vc",
};

pub fn vc<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
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

    if let Err(source) = ctx
        .platform
        .delete_message(ctx.channel_id, ctx.message_id)
        .await
    {
        debug!(?source, "failed to delete *vc invocation");
    }

    ctx.say(format!(
        "{} please join Approval-Voice!",
        ticket.applicant_mention()
    ))
    .await
}
