use tracing::info;

use crate::CommandMeta;
use crate::authorization::require_command_permission;
use crate::messages::usage_message;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};
use gatekeeper_database::impls::role_keys::put_role_key;
use gatekeeper_utils::formatting::sanitize_mentions;
use poise::serenity_prelude as serenity;

pub const META: CommandMeta = CommandMeta {
    name: "addrole",
    desc: "Map a role key to an existing role.",
    category: "roles",
    usage: "*addrole <key> <role name>",
};

pub fn addrole<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx))
}

async fn run(ctx: &CommandContext<'_>) -> Result<(), Error> {
    if !require_command_permission(ctx, serenity::Permissions::MANAGE_ROLES).await? {
        return Ok(());
    }

    let [key, _, ..] = ctx.args() else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };
    let role_name = ctx.command.rest(1);

    let roles = ctx.platform.roles(ctx.guild_id).await?;
    let Some(role) = roles
        .iter()
        .find(|role| role.name.eq_ignore_ascii_case(&role_name))
    else {
        ctx.say(sanitize_mentions(&format!("Role `{role_name}` doesn't exist!")))
            .await?;
        return Ok(());
    };

    let previous = put_role_key(&ctx.data.store, ctx.guild_id.get(), key, role.id.get()).await;
    info!(
        guild_id = %ctx.guild_id,
        key = %key.to_lowercase(),
        role_id = %role.id,
        previous = ?previous,
        "role key set"
    );

    ctx.say(sanitize_mentions(&format!(
        "Role key `{}` now grants **{}**.",
        key.to_lowercase(),
        role.name
    )))
    .await
}
