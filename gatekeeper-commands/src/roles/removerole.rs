use tracing::info;

use crate::CommandMeta;
use crate::authorization::require_command_permission;
use crate::messages::usage_message;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};
use gatekeeper_database::impls::role_keys::remove_role_key;
use gatekeeper_utils::formatting::sanitize_mentions;
use poise::serenity_prelude as serenity;

pub const META: CommandMeta = CommandMeta {
    name: "removerole",
    desc: "Remove a role key.",
    category: "roles",
    usage: "*removerole <key>",
};

pub fn removerole<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx))
}

async fn run(ctx: &CommandContext<'_>) -> Result<(), Error> {
    if !require_command_permission(ctx, serenity::Permissions::MANAGE_ROLES).await? {
        return Ok(());
    }

    let [key] = ctx.args() else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if !remove_role_key(&ctx.data.store, ctx.guild_id.get(), key).await {
        ctx.say(sanitize_mentions(&format!(
            "Role {key} not found! For a list of roles, see *listroles."
        )))
        .await?;
        return Ok(());
    }

    info!(guild_id = %ctx.guild_id, key = %key.to_lowercase(), "role key removed");
    ctx.say(sanitize_mentions(&format!(
        "Role key `{}` removed.",
        key.to_lowercase()
    )))
    .await
}
