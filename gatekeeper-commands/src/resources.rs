//! Idempotent "ensure it exists" accessors for the guild resources the bot
//! relies on. Each resolved id is memoized in the guild's config; a memoized
//! id that no longer exists on the platform is resolved again by name.

use poise::serenity_prelude as serenity;
use tracing::info;

use gatekeeper_core::{ChannelKind, Error, NewChannel, NewRole, Platform};
use gatekeeper_database::{ConfigStore, ResourceKind, ServerConfig};

/// Resolve (find or create) `kind` for the guild and return its id.
pub async fn ensure_resource(
    platform: &dyn Platform,
    store: &ConfigStore,
    guild_id: serenity::GuildId,
    kind: ResourceKind,
) -> Result<u64, Error> {
    let mut config = store.lock(guild_id.get()).await;
    let before = config.clone();

    let id = ensure_in(platform, guild_id, &mut config, kind).await?;

    if *config != before {
        config.save();
    }

    Ok(id)
}

/// Resolve `kind` against a config the caller already holds locked. The
/// caller is responsible for saving.
pub async fn ensure_in(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    config: &mut ServerConfig,
    kind: ResourceKind,
) -> Result<u64, Error> {
    if kind.is_role() {
        ensure_role_in(platform, guild_id, config, kind).await
    } else {
        ensure_channel_in(platform, guild_id, config, kind).await
    }
}

async fn ensure_role_in(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    config: &mut ServerConfig,
    kind: ResourceKind,
) -> Result<u64, Error> {
    let roles = platform.roles(guild_id).await?;
    let name = kind.default_name();

    if let Some(id) = config.resource_id(kind)
        && roles.iter().any(|role| role.id.get() == id)
    {
        return Ok(id);
    }

    let id = match roles.iter().find(|role| role.name == name) {
        Some(role) => role.id.get(),
        None => {
            info!(guild_id = %guild_id, role = name, "creating missing role");
            let created = platform
                .create_role(
                    guild_id,
                    &NewRole {
                        name: name.to_owned(),
                        mentionable: true,
                        deny_view_channels: kind == ResourceKind::JailedRole,
                        reason: Some(format!("{name} role was missing, created")),
                    },
                )
                .await?;
            created.id.get()
        }
    };

    config.set_resource_id(kind, id);
    Ok(id)
}

async fn ensure_channel_in(
    platform: &dyn Platform,
    guild_id: serenity::GuildId,
    config: &mut ServerConfig,
    kind: ResourceKind,
) -> Result<u64, Error> {
    let channels = platform.channels(guild_id).await?;
    let name = kind.default_name();

    if let Some(id) = config.resource_id(kind)
        && channels
            .iter()
            .any(|channel| channel.id.get() == id && channel.kind == ChannelKind::Text)
    {
        return Ok(id);
    }

    let existing = channels.iter().find(|channel| {
        channel.kind == ChannelKind::Text && channel.name.eq_ignore_ascii_case(name)
    });

    let id = match existing {
        Some(channel) => channel.id.get(),
        None => {
            let mut new_channel = NewChannel::text(name);
            new_channel.reason = Some(format!("#{name} channel was missing, created"));

            match kind {
                ResourceKind::JailChannel => {
                    let moderator =
                        ensure_role_in(platform, guild_id, config, ResourceKind::ModeratorRole)
                            .await?;
                    let jailed =
                        ensure_role_in(platform, guild_id, config, ResourceKind::JailedRole)
                            .await?;
                    new_channel.visible_to_roles = vec![
                        serenity::RoleId::new(moderator),
                        serenity::RoleId::new(jailed),
                    ];
                    new_channel.visible_to_users = vec![platform.bot_user_id()];
                }
                ResourceKind::LogsChannel => {
                    let moderator =
                        ensure_role_in(platform, guild_id, config, ResourceKind::ModeratorRole)
                            .await?;
                    new_channel.visible_to_roles = vec![serenity::RoleId::new(moderator)];
                    new_channel.visible_to_users = vec![platform.bot_user_id()];
                }
                _ => {}
            }

            info!(guild_id = %guild_id, channel = name, "creating missing channel");
            platform.create_channel(guild_id, &new_channel).await?.id.get()
        }
    };

    config.set_resource_id(kind, id);
    Ok(id)
}
