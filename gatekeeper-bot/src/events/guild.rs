use poise::serenity_prelude as serenity;
use tracing::{error, info};

use gatekeeper_core::Data;

use crate::platform::SerenityPlatform;

/// Make sure a guild that just became available has everything the bot uses.
pub async fn handle_guild_create(ctx: &serenity::Context, data: &Data, guild: &serenity::Guild) {
    info!(guild_id = %guild.id, name = %guild.name, "guild available");

    let platform = SerenityPlatform::new(ctx);
    if let Err(source) =
        gatekeeper_commands::membership::init_server(&platform, data, guild.id).await
    {
        error!(?source, guild_id = %guild.id, "failed to initialize server");
    }
}
