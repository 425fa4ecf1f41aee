//! Guild lifecycle hooks: server initialization, member join and leave.

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::approval::tickets::delete_tickets_of;
use crate::messages::channel_mention;
use crate::resources::{ensure_in, ensure_resource};
use gatekeeper_core::{Data, Error, Platform, UserInfo};
use gatekeeper_database::ResourceKind;

/// Optional role handed to every member on join.
pub const INTAKE_ROLE: &str = "Approval";

const INIT_ORDER: [ResourceKind; 5] = [
    ResourceKind::ModeratorRole,
    ResourceKind::JailedRole,
    ResourceKind::LimboChannel,
    ResourceKind::JailChannel,
    ResourceKind::LogsChannel,
];

/// Make sure the guild has a config and every resource the bot relies on.
pub async fn init_server(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
) -> Result<(), Error> {
    let mut config = data.store.lock(guild_id.get()).await;
    let before = config.clone();

    for kind in INIT_ORDER {
        ensure_in(platform, guild_id, &mut config, kind).await?;
    }

    if *config != before {
        config.save();
        info!(guild_id = %guild_id, "server resources initialized");
    }

    Ok(())
}

/// Grant the intake role if the guild has one and point the member at `*apply`.
pub async fn member_joined(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    member: &UserInfo,
) -> Result<(), Error> {
    if member.bot {
        return Ok(());
    }

    let roles = platform.roles(guild_id).await?;
    if let Some(intake) = roles
        .iter()
        .find(|role| role.name.eq_ignore_ascii_case(INTAKE_ROLE))
        && let Err(source) = platform
            .add_role(guild_id, member.id, intake.id, "New member awaiting approval")
            .await
    {
        warn!(?source, user_id = %member.id, "failed to grant intake role");
    }

    let limbo = serenity::ChannelId::new(
        ensure_resource(platform, &data.store, guild_id, ResourceKind::LimboChannel).await?,
    );
    platform
        .send_message(
            limbo,
            &format!(
                "{} welcome! To get access to the rest of the server, say `*apply` in {}.",
                member.mention(),
                channel_mention(limbo)
            ),
        )
        .await?;

    info!(guild_id = %guild_id, user_id = %member.id, "member joined");
    Ok(())
}

/// Remove every ticket the departed member still had open.
pub async fn member_left(
    platform: &dyn Platform,
    data: &Data,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> Result<(), Error> {
    let deleted = delete_tickets_of(platform, data, guild_id, user_id, "User left the server").await?;
    if deleted > 0 {
        info!(guild_id = %guild_id, user_id = %user_id, deleted, "cleaned up tickets of departed member");
    }
    Ok(())
}
