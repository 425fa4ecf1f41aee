use poise::serenity_prelude as serenity;
use tracing::error;

use gatekeeper_core::Data;

use crate::platform::{SerenityPlatform, user_info};

pub async fn handle_member_addition(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) {
    let platform = SerenityPlatform::new(ctx);
    if let Err(source) = gatekeeper_commands::membership::member_joined(
        &platform,
        data,
        member.guild_id,
        &user_info(&member.user),
    )
    .await
    {
        error!(?source, guild_id = %member.guild_id, user_id = %member.user.id, "failed to handle member join");
    }
}

pub async fn handle_member_removal(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) {
    let platform = SerenityPlatform::new(ctx);
    if let Err(source) =
        gatekeeper_commands::membership::member_left(&platform, data, guild_id, user.id).await
    {
        error!(?source, guild_id = %guild_id, user_id = %user.id, "failed to clean up departed member");
    }
}
