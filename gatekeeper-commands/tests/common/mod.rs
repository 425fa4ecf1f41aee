#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use gatekeeper_commands::InboundMessage;
use gatekeeper_core::{
    ChannelInfo, ChannelKind, Data, HistoryMessage, NewChannel, NewRole, Platform, RoleInfo,
    UserInfo,
};
use gatekeeper_database::ConfigStore;

pub const GUILD: serenity::GuildId = serenity::GuildId::new(1_000);
pub const BOT: serenity::UserId = serenity::UserId::new(1);

/// Every mutating platform call, in the order it was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CreateChannel { name: String, parent_id: Option<serenity::ChannelId>, private: bool },
    DeleteChannel { channel_id: serenity::ChannelId, reason: String },
    CreateRole { name: String },
    AddRole { user_id: serenity::UserId, role_id: serenity::RoleId },
    RemoveRole { user_id: serenity::UserId, role_id: serenity::RoleId },
    Send { channel_id: serenity::ChannelId, content: String },
    DirectMessage { user_id: serenity::UserId, content: String },
    DeleteMessage { message_id: serenity::MessageId },
    Ban { user_id: serenity::UserId, reason: String },
    Slowmode { channel_id: serenity::ChannelId, seconds: u64 },
}

#[derive(Default)]
struct State {
    channels: Vec<ChannelInfo>,
    roles: Vec<RoleInfo>,
    users: HashMap<serenity::UserId, UserInfo>,
    member_roles: HashMap<serenity::UserId, Vec<serenity::RoleId>>,
    permissions: HashMap<serenity::UserId, serenity::Permissions>,
    history: HashMap<serenity::ChannelId, Vec<HistoryMessage>>,
    fail_history: bool,
    locked_roles: Vec<serenity::RoleId>,
    locked_channels: Vec<serenity::ChannelId>,
    next_id: u64,
    calls: Vec<Call>,
}

/// In-memory guild that records what the bot did to it.
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 5_000,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent_id: Option<serenity::ChannelId>,
    ) -> serenity::ChannelId {
        let mut state = self.state();
        state.next_id += 1;
        let id = serenity::ChannelId::new(state.next_id);
        state.channels.push(ChannelInfo {
            id,
            name: name.to_owned(),
            kind,
            parent_id,
        });
        id
    }

    pub fn add_guild_role(&self, name: &str) -> serenity::RoleId {
        let mut state = self.state();
        state.next_id += 1;
        let id = serenity::RoleId::new(state.next_id);
        state.roles.push(RoleInfo {
            id,
            name: name.to_owned(),
        });
        id
    }

    pub fn remove_guild_role(&self, role_id: serenity::RoleId) {
        self.state().roles.retain(|role| role.id != role_id);
    }

    pub fn add_member(&self, id: u64, name: &str, roles: &[serenity::RoleId]) -> UserInfo {
        let user = UserInfo {
            id: serenity::UserId::new(id),
            name: name.to_owned(),
            display_name: name.to_owned(),
            bot: false,
        };
        let mut state = self.state();
        state.users.insert(user.id, user.clone());
        state.member_roles.insert(user.id, roles.to_vec());
        user
    }

    pub fn grant_permissions(&self, user_id: serenity::UserId, permissions: serenity::Permissions) {
        self.state().permissions.insert(user_id, permissions);
    }

    pub fn set_history(&self, channel_id: serenity::ChannelId, messages: Vec<HistoryMessage>) {
        self.state().history.insert(channel_id, messages);
    }

    pub fn fail_history(&self) {
        self.state().fail_history = true;
    }

    /// Make `remove_role` fail for this role, like a managed or higher-ranked role.
    pub fn refuse_role_removal(&self, role_id: serenity::RoleId) {
        self.state().locked_roles.push(role_id);
    }

    pub fn refuse_channel_deletion(&self, channel_id: serenity::ChannelId) {
        self.state().locked_channels.push(channel_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn channel_named(&self, name: &str) -> Option<ChannelInfo> {
        self.state()
            .channels
            .iter()
            .find(|channel| channel.name == name)
            .cloned()
    }

    pub fn role_named(&self, name: &str) -> Option<RoleInfo> {
        self.state().roles.iter().find(|role| role.name == name).cloned()
    }

    pub fn channels_named(&self, name: &str) -> usize {
        self.state()
            .channels
            .iter()
            .filter(|channel| channel.name == name)
            .count()
    }

    pub fn roles_of(&self, user_id: serenity::UserId) -> Vec<serenity::RoleId> {
        self.state()
            .member_roles
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn sent_to(&self, channel_id: serenity::ChannelId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { channel_id: id, content } if id == channel_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn direct_messages(&self, user_id: serenity::UserId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DirectMessage { user_id: id, content } if id == user_id => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<serenity::ChannelId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteChannel { channel_id, .. } => Some(channel_id),
                _ => None,
            })
            .collect()
    }

    /// Index of the first recorded call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(predicate)
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn bot_user_id(&self) -> serenity::UserId {
        BOT
    }

    async fn guild_name(&self, _guild_id: serenity::GuildId) -> anyhow::Result<String> {
        Ok("Test Server".to_owned())
    }

    async fn channels(&self, _guild_id: serenity::GuildId) -> anyhow::Result<Vec<ChannelInfo>> {
        Ok(self.state().channels.clone())
    }

    async fn create_channel(
        &self,
        _guild_id: serenity::GuildId,
        channel: &NewChannel,
    ) -> anyhow::Result<ChannelInfo> {
        let kind = if channel.category {
            ChannelKind::Category
        } else {
            ChannelKind::Text
        };
        let id = self.add_channel(&channel.name, kind, channel.parent_id);
        self.record(Call::CreateChannel {
            name: channel.name.clone(),
            parent_id: channel.parent_id,
            private: channel.is_private(),
        });

        Ok(ChannelInfo {
            id,
            name: channel.name.clone(),
            kind,
            parent_id: channel.parent_id,
        })
    }

    async fn delete_channel(
        &self,
        channel_id: serenity::ChannelId,
        reason: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state();
        if state.locked_channels.contains(&channel_id) {
            bail!("missing access to channel {channel_id}");
        }
        let before = state.channels.len();
        state.channels.retain(|channel| channel.id != channel_id);
        if state.channels.len() == before {
            bail!("unknown channel {channel_id}");
        }
        state.calls.push(Call::DeleteChannel {
            channel_id,
            reason: reason.to_owned(),
        });
        Ok(())
    }

    async fn roles(&self, _guild_id: serenity::GuildId) -> anyhow::Result<Vec<RoleInfo>> {
        Ok(self.state().roles.clone())
    }

    async fn create_role(
        &self,
        _guild_id: serenity::GuildId,
        role: &NewRole,
    ) -> anyhow::Result<RoleInfo> {
        let id = self.add_guild_role(&role.name);
        self.record(Call::CreateRole {
            name: role.name.clone(),
        });
        Ok(RoleInfo {
            id,
            name: role.name.clone(),
        })
    }

    async fn member_roles(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<Vec<serenity::RoleId>> {
        Ok(self.roles_of(user_id))
    }

    async fn add_role(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        _reason: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state();
        let roles = state.member_roles.entry(user_id).or_default();
        if !roles.contains(&role_id) {
            roles.push(role_id);
        }
        state.calls.push(Call::AddRole { user_id, role_id });
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        role_id: serenity::RoleId,
        _reason: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state();
        if state.locked_roles.contains(&role_id) {
            bail!("missing permissions to remove role {role_id}");
        }
        if let Some(roles) = state.member_roles.get_mut(&user_id) {
            roles.retain(|held| *held != role_id);
        }
        state.calls.push(Call::RemoveRole { user_id, role_id });
        Ok(())
    }

    async fn permissions(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> anyhow::Result<serenity::Permissions> {
        Ok(self
            .state()
            .permissions
            .get(&user_id)
            .copied()
            .unwrap_or_else(serenity::Permissions::empty))
    }

    async fn send_message(
        &self,
        channel_id: serenity::ChannelId,
        content: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::Send {
            channel_id,
            content: content.to_owned(),
        });
        Ok(())
    }

    async fn send_direct_message(
        &self,
        user_id: serenity::UserId,
        content: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::DirectMessage {
            user_id,
            content: content.to_owned(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        _channel_id: serenity::ChannelId,
        message_id: serenity::MessageId,
    ) -> anyhow::Result<()> {
        self.record(Call::DeleteMessage { message_id });
        Ok(())
    }

    async fn ban(
        &self,
        _guild_id: serenity::GuildId,
        user_id: serenity::UserId,
        reason: &str,
    ) -> anyhow::Result<()> {
        self.record(Call::Ban {
            user_id,
            reason: reason.to_owned(),
        });
        Ok(())
    }

    async fn set_slowmode(
        &self,
        channel_id: serenity::ChannelId,
        seconds: u64,
    ) -> anyhow::Result<()> {
        self.record(Call::Slowmode {
            channel_id,
            seconds,
        });
        Ok(())
    }

    async fn message_history(
        &self,
        channel_id: serenity::ChannelId,
    ) -> anyhow::Result<Vec<HistoryMessage>> {
        let state = self.state();
        if state.fail_history {
            bail!("history unavailable");
        }
        Ok(state.history.get(&channel_id).cloned().unwrap_or_default())
    }

    async fn user(&self, user_id: serenity::UserId) -> anyhow::Result<UserInfo> {
        self.state()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown user {user_id}"))
    }
}

/// A guild with the limbo channel, the moderator role and one moderator.
pub struct Guild {
    pub platform: FakePlatform,
    pub data: Data,
    pub limbo: serenity::ChannelId,
    pub moderator_role: serenity::RoleId,
    pub moderator: UserInfo,
}

impl Guild {
    pub fn new() -> Self {
        let platform = FakePlatform::new();
        let limbo = platform.add_channel("approval", ChannelKind::Text, None);
        let moderator_role = platform.add_guild_role("Approval Moderator");
        let moderator = platform.add_member(10, "mod", &[moderator_role]);

        Self {
            platform,
            data: Data::new(ConfigStore::in_memory()),
            limbo,
            moderator_role,
            moderator,
        }
    }

    /// Dispatch `content` as a message from `author` in `channel_id`.
    pub async fn send(
        &self,
        channel_id: serenity::ChannelId,
        author: &UserInfo,
        content: &str,
    ) -> gatekeeper_commands::Dispatch {
        self.send_with_mentions(channel_id, author, content, Vec::new())
            .await
    }

    pub async fn send_with_mentions(
        &self,
        channel_id: serenity::ChannelId,
        author: &UserInfo,
        content: &str,
        mentions: Vec<UserInfo>,
    ) -> gatekeeper_commands::Dispatch {
        let message = InboundMessage {
            guild_id: Some(GUILD),
            channel_id,
            message_id: serenity::MessageId::new(99),
            author: author.clone(),
            content: content.to_owned(),
            mentions,
        };

        gatekeeper_commands::router()
            .dispatch(&self.platform, &self.data, &message)
            .await
    }

    /// Open a ticket for a fresh applicant through `*apply`.
    pub async fn open_ticket(&self, id: u64, name: &str) -> (UserInfo, ChannelInfo) {
        let applicant = self.platform.add_member(id, name, &[]);
        self.send(self.limbo, &applicant, "*apply").await;
        let channel = self
            .platform
            .channel_named(&format!("approval-{id}"))
            .expect("ticket channel");
        (applicant, channel)
    }
}
