//! [`Platform`] over serenity's HTTP client.

use anyhow::Context as _;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use gatekeeper_core::{
    ChannelInfo, ChannelKind, HistoryMessage, NewChannel, NewRole, Platform, RoleInfo, UserInfo,
};
use gatekeeper_utils::history::fetch_channel_history;
use gatekeeper_utils::permissions::resolve_user_permissions;

/// Discord caps audit log reasons at this many characters.
const AUDIT_REASON_LIMIT: usize = 512;
/// Discord's maximum per-user rate limit, in seconds.
const MAX_SLOWMODE_SECONDS: u64 = 21_600;

pub struct SerenityPlatform<'a> {
    http: &'a serenity::Http,
    bot_id: serenity::UserId,
}

impl<'a> SerenityPlatform<'a> {
    pub fn new(ctx: &'a serenity::Context) -> Self {
        Self {
            http: &ctx.http,
            bot_id: ctx.cache.current_user().id,
        }
    }
}

pub fn user_info(user: &serenity::User) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        display_name: user.global_name.clone().unwrap_or_else(|| user.name.clone()),
        bot: user.bot,
    }
}

fn channel_info(channel: &serenity::GuildChannel) -> ChannelInfo {
    let kind = match channel.kind {
        serenity::ChannelType::Text => ChannelKind::Text,
        serenity::ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    };

    ChannelInfo {
        id: channel.id,
        name: channel.name.clone(),
        kind,
        parent_id: channel.parent_id,
    }
}

fn audit_reason(reason: &str) -> String {
    reason.chars().take(AUDIT_REASON_LIMIT).collect()
}

fn private_overwrites(
    guild_id: serenity::GuildId,
    channel: &NewChannel,
) -> Vec<serenity::PermissionOverwrite> {
    let visible = serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY;

    let mut overwrites = vec![serenity::PermissionOverwrite {
        allow: serenity::Permissions::empty(),
        deny: serenity::Permissions::VIEW_CHANNEL,
        kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
    }];
    overwrites.extend(channel.visible_to_roles.iter().map(|role_id| {
        serenity::PermissionOverwrite {
            allow: visible,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Role(*role_id),
        }
    }));
    overwrites.extend(channel.visible_to_users.iter().map(|user_id| {
        serenity::PermissionOverwrite {
            allow: visible,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(*user_id),
        }
    }));
    overwrites
}

#[async_trait]
impl Platform for SerenityPlatform<'_> {
    fn bot_user_id(&self) -> serenity::UserId {
        self.bot_id
    }

    async fn guild_name(&self, guild_id: serenity::GuildId) -> anyhow::Result<String> {
        Ok(guild_id.to_partial_guild(self.http).await?.name)
    }

    async fn channels(&self, guild_id: serenity::GuildId) -> anyhow::Result<Vec<ChannelInfo>> {
        let channels = guild_id.channels(self.http).await?;
        Ok(channels.values().map(channel_info).collect())
    }

    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        channel: &NewChannel,
    ) -> anyhow::Result<ChannelInfo> {
        let kind = if channel.category {
            serenity::ChannelType::Category
        } else {
            serenity::ChannelType::Text
        };
        let reason = channel.reason.as_deref().map(audit_reason);

        let mut builder = serenity::CreateChannel::new(channel.name.clone()).kind(kind);
        if let Some(parent_id) = channel.parent_id {
            builder = builder.category(parent_id);
        }
        if channel.is_private() {
            builder = builder.permissions(private_overwrites(guild_id, channel));
        }
        if let Some(reason) = reason.as_deref() {
            builder = builder.audit_log_reason(reason);
        }

        let created = guild_id
            .create_channel(self.http, builder)
            .await
            .with_context(|| format!("failed to create channel {}", channel.name))?;
        Ok(channel_info(&created))
    }

    async fn delete_channel(
        &self,
        channel_id: serenity::ChannelId,
        reason: &str,
    ) -> anyhow::Result<()> {
        let reason = audit_reason(reason);
        self.http
            .delete_channel(channel_id, Some(reason.as_str()))
            .await?;
        Ok(())
    }

    async fn roles(&self, guild_id: serenity::GuildId) -> anyhow::Result<Vec<RoleInfo>> {
        let roles = guild_id.roles(self.http).await?;
        Ok(roles
            .values()
            .map(|role| RoleInfo {
                id: role.id,
                name: role.name.clone(),
            })
            .collect())
    }

    async fn create_role(
        &self,
        guild_id: serenity::GuildId,
        role: &NewRole,
    ) -> anyhow::Result<RoleInfo> {
        let reason = role.reason.as_deref().map(audit_reason);

        let mut builder = serenity::EditRole::new()
            .name(role.name.clone())
            .mentionable(role.mentionable);
        if role.deny_view_channels {
            builder = builder.permissions(serenity::Permissions::empty());
        }
        if let Some(reason) = reason.as_deref() {
            builder = builder.audit_log_reason(reason);
        }

        let created = guild_id
            .create_role(self.http, builder)
            .await
            .with_context(|| format!("failed to create role {}", role.name))?;
        Ok(RoleInfo {
            id: created.id,
            name: created.name,
        })
    }

    async fn member_roles(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<Vec<serenity::RoleId>> {
        Ok(guild_id.member(self.http, user_id).await?.roles)
    }

    async fn add_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        reason: &str,
    ) -> anyhow::Result<()> {
        let reason = audit_reason(reason);
        self.http
            .add_member_role(guild_id, user_id, role_id, Some(reason.as_str()))
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        reason: &str,
    ) -> anyhow::Result<()> {
        let reason = audit_reason(reason);
        self.http
            .remove_member_role(guild_id, user_id, role_id, Some(reason.as_str()))
            .await?;
        Ok(())
    }

    async fn permissions(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<serenity::Permissions> {
        resolve_user_permissions(self.http, guild_id, user_id).await
    }

    async fn send_message(
        &self,
        channel_id: serenity::ChannelId,
        content: &str,
    ) -> anyhow::Result<()> {
        channel_id.say(self.http, content).await?;
        Ok(())
    }

    async fn send_direct_message(
        &self,
        user_id: serenity::UserId,
        content: &str,
    ) -> anyhow::Result<()> {
        user_id
            .direct_message(self.http, serenity::CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn delete_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> anyhow::Result<()> {
        channel_id.delete_message(self.http, message_id).await?;
        Ok(())
    }

    async fn ban(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        reason: &str,
    ) -> anyhow::Result<()> {
        guild_id
            .ban_with_reason(self.http, user_id, 0, &audit_reason(reason))
            .await?;
        Ok(())
    }

    async fn set_slowmode(
        &self,
        channel_id: serenity::ChannelId,
        seconds: u64,
    ) -> anyhow::Result<()> {
        let seconds = u16::try_from(seconds.min(MAX_SLOWMODE_SECONDS))
            .context("slowmode out of range")?;
        channel_id
            .edit(self.http, serenity::EditChannel::new().rate_limit_per_user(seconds))
            .await?;
        Ok(())
    }

    async fn message_history(
        &self,
        channel_id: serenity::ChannelId,
    ) -> anyhow::Result<Vec<HistoryMessage>> {
        let messages = fetch_channel_history(self.http, channel_id).await?;
        Ok(messages
            .iter()
            .map(|message| HistoryMessage {
                timestamp: message.timestamp.to_string(),
                author_display: message
                    .author
                    .global_name
                    .clone()
                    .unwrap_or_else(|| message.author.name.clone()),
                author_tag: message.author.tag(),
                content: message.content.clone(),
                edited: message.edited_timestamp.is_some(),
            })
            .collect())
    }

    async fn user(&self, user_id: serenity::UserId) -> anyhow::Result<UserInfo> {
        let user = self.http.get_user(user_id).await?;
        Ok(user_info(&user))
    }
}
