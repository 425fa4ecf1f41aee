use crate::CommandMeta;
use crate::authorization::require_command_permission;
use crate::router::CommandContext;
use gatekeeper_core::{BoxFuture, Error};
use gatekeeper_database::impls::role_keys::list_role_keys;
use gatekeeper_utils::formatting::sanitize_mentions;
use poise::serenity_prelude as serenity;

pub const META: CommandMeta = CommandMeta {
    name: "listroles",
    desc: "List the role keys usable with *approve.",
    category: "roles",
    usage: "*listroles",
};

pub fn listroles<'a>(ctx: &'a CommandContext<'a>) -> BoxFuture<'a, Result<(), Error>> {
    Box::pin(run(ctx))
}

async fn run(ctx: &CommandContext<'_>) -> Result<(), Error> {
    if !require_command_permission(ctx, serenity::Permissions::MANAGE_ROLES).await? {
        return Ok(());
    }

    let keys = list_role_keys(&ctx.data.store, ctx.guild_id.get()).await;
    if keys.is_empty() {
        ctx.say("No role keys are set up yet. Add one with `*addrole <key> <role name>`.")
            .await?;
        return Ok(());
    }

    let roles = ctx.platform.roles(ctx.guild_id).await?;
    let mut lines = vec!["**Role keys:**".to_owned()];
    for (key, role_id) in keys {
        let name = roles
            .iter()
            .find(|role| role.id.get() == role_id)
            .map(|role| role.name.as_str())
            .unwrap_or("deleted role");
        lines.push(format!("`{key}` -> {name}"));
    }

    ctx.say(sanitize_mentions(&lines.join("\n"))).await
}
