//! The chat platform as seen by the moderation core.
//!
//! Production code wraps serenity's HTTP client; tests use a recording double.

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Category,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: serenity::ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<serenity::ChannelId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: serenity::RoleId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub id: serenity::UserId,
    pub name: String,
    pub display_name: String,
    pub bot: bool,
}

impl UserInfo {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id.get())
    }
}

/// One message of a channel transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryMessage {
    pub timestamp: String,
    pub author_display: String,
    pub author_tag: String,
    pub content: String,
    pub edited: bool,
}

/// A text channel or category to create.
///
/// A non-empty `visible_to_roles`/`visible_to_users` makes the channel private:
/// `@everyone` is denied and only the listed roles and users may view it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewChannel {
    pub name: String,
    pub category: bool,
    pub parent_id: Option<serenity::ChannelId>,
    pub visible_to_roles: Vec<serenity::RoleId>,
    pub visible_to_users: Vec<serenity::UserId>,
    pub reason: Option<String>,
}

impl NewChannel {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: true,
            ..Self::default()
        }
    }

    pub fn is_private(&self) -> bool {
        !self.visible_to_roles.is_empty() || !self.visible_to_users.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub mentionable: bool,
    pub deny_view_channels: bool,
    pub reason: Option<String>,
}

#[async_trait]
pub trait Platform: Send + Sync {
    /// The bot's own user id.
    fn bot_user_id(&self) -> serenity::UserId;

    async fn guild_name(&self, guild_id: serenity::GuildId) -> anyhow::Result<String>;

    async fn channels(&self, guild_id: serenity::GuildId) -> anyhow::Result<Vec<ChannelInfo>>;

    async fn create_channel(
        &self,
        guild_id: serenity::GuildId,
        channel: &NewChannel,
    ) -> anyhow::Result<ChannelInfo>;

    async fn delete_channel(&self, channel_id: serenity::ChannelId, reason: &str)
    -> anyhow::Result<()>;

    async fn roles(&self, guild_id: serenity::GuildId) -> anyhow::Result<Vec<RoleInfo>>;

    async fn create_role(&self, guild_id: serenity::GuildId, role: &NewRole)
    -> anyhow::Result<RoleInfo>;

    async fn member_roles(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<Vec<serenity::RoleId>>;

    async fn add_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        reason: &str,
    ) -> anyhow::Result<()>;

    async fn remove_role(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        reason: &str,
    ) -> anyhow::Result<()>;

    /// Effective guild-level permissions of a member.
    async fn permissions(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<serenity::Permissions>;

    async fn send_message(&self, channel_id: serenity::ChannelId, content: &str)
    -> anyhow::Result<()>;

    async fn send_direct_message(&self, user_id: serenity::UserId, content: &str)
    -> anyhow::Result<()>;

    async fn delete_message(
        &self,
        channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> anyhow::Result<()>;

    async fn ban(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        reason: &str,
    ) -> anyhow::Result<()>;

    /// Set the per-user rate limit of a channel; `0` clears it.
    async fn set_slowmode(&self, channel_id: serenity::ChannelId, seconds: u64)
    -> anyhow::Result<()>;

    /// Full message history of a channel, oldest first.
    async fn message_history(
        &self,
        channel_id: serenity::ChannelId,
    ) -> anyhow::Result<Vec<HistoryMessage>>;

    async fn user(&self, user_id: serenity::UserId) -> anyhow::Result<UserInfo>;
}
