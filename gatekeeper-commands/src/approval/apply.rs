use poise::serenity_prelude as serenity;
use tracing::info;

use crate::CommandMeta;
use crate::approval::tickets::{ApplyOutcome, create_ticket_if_absent, questionnaire};
use crate::messages::channel_mention;
use crate::resources::ensure_resource;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};
use gatekeeper_database::ResourceKind;

pub const META: CommandMeta = CommandMeta {
    name: "apply",
    desc: "Open an approval ticket for yourself.",
    category: "approval",
    usage: "*apply",
};

pub fn apply<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx))
}

async fn run(ctx: &CommandContext<'_>) -> Result<(), Error> {
    let limbo = serenity::ChannelId::new(
        ensure_resource(
            ctx.platform,
            &ctx.data.store,
            ctx.guild_id,
            ResourceKind::LimboChannel,
        )
        .await?,
    );

    if ctx.channel_id != limbo {
        ctx.say(format!(
            "{} this can only be done in {}!",
            ctx.author.mention(),
            channel_mention(limbo)
        ))
        .await?;
        return Ok(());
    }

    match create_ticket_if_absent(ctx.platform, ctx.data, ctx.guild_id, ctx.author).await? {
        ApplyOutcome::Created(channel) => {
            let guild_name = ctx.platform.guild_name(ctx.guild_id).await?;
            ctx.platform
                .send_message(channel.id, &questionnaire(&guild_name, ctx.author))
                .await?;
        }
        ApplyOutcome::AlreadyExists(channel) => {
            info!(user_id = %ctx.author.id, channel = %channel.name, "duplicate application");
            ctx.platform
                .send_message(
                    channel.id,
                    &format!("{} this channel already exists!", ctx.author.mention()),
                )
                .await?;
        }
        ApplyOutcome::CategoryFull => {
            ctx.platform
                .send_message(
                    limbo,
                    &format!(
                        "{} there are too many approval tickets open right now! \
                         Please wait for a moderator to clear old tickets and try again.",
                        ctx.author.mention()
                    ),
                )
                .await?;
        }
    }

    Ok(())
}
