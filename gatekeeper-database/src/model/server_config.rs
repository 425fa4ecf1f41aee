use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Persisted per-guild configuration.
///
/// Resource ids use `0` for "not materialized yet"; the legacy field names
/// written by older deployments are still accepted on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub roles: BTreeMap<String, u64>,
    #[serde(default, alias = "limboChannel")]
    pub limbo_channel_id: u64,
    #[serde(default, alias = "jailChannel")]
    pub jail_channel_id: u64,
    #[serde(default, alias = "logsChannel")]
    pub logs_channel_id: u64,
    #[serde(default)]
    pub jailed_role_id: u64,
    #[serde(default)]
    pub moderator_role_id: u64,
}

/// Lazily materialized guild resources memoized in [`ServerConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ModeratorRole,
    JailedRole,
    LimboChannel,
    JailChannel,
    LogsChannel,
}

impl ResourceKind {
    /// Name used to find or create the resource on the platform.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::ModeratorRole => "Approval Moderator",
            Self::JailedRole => "Jailed",
            Self::LimboChannel => "approval",
            Self::JailChannel => "jail",
            Self::LogsChannel => "approval-logs",
        }
    }

    pub fn is_role(self) -> bool {
        matches!(self, Self::ModeratorRole | Self::JailedRole)
    }
}

impl ServerConfig {
    /// Memoized id for `kind`, or `None` while it is still unresolved.
    pub fn resource_id(&self, kind: ResourceKind) -> Option<u64> {
        let id = match kind {
            ResourceKind::ModeratorRole => self.moderator_role_id,
            ResourceKind::JailedRole => self.jailed_role_id,
            ResourceKind::LimboChannel => self.limbo_channel_id,
            ResourceKind::JailChannel => self.jail_channel_id,
            ResourceKind::LogsChannel => self.logs_channel_id,
        };

        (id != 0).then_some(id)
    }

    pub fn set_resource_id(&mut self, kind: ResourceKind, id: u64) {
        let slot = match kind {
            ResourceKind::ModeratorRole => &mut self.moderator_role_id,
            ResourceKind::JailedRole => &mut self.jailed_role_id,
            ResourceKind::LimboChannel => &mut self.limbo_channel_id,
            ResourceKind::JailChannel => &mut self.jail_channel_id,
            ResourceKind::LogsChannel => &mut self.logs_channel_id,
        };
        *slot = id;
    }

    /// Insert or overwrite a role key. Keys are stored lower-cased.
    pub fn put_role(&mut self, key: &str, role_id: u64) -> Option<u64> {
        self.roles.insert(normalize_key(key), role_id)
    }

    /// Remove a role key, returning whether it existed.
    pub fn remove_role(&mut self, key: &str) -> bool {
        self.roles.remove(&normalize_key(key)).is_some()
    }

    pub fn role(&self, key: &str) -> Option<u64> {
        self.roles.get(&normalize_key(key)).copied()
    }

    pub fn list_roles(&self) -> Vec<(String, u64)> {
        self.roles
            .iter()
            .map(|(key, role_id)| (key.clone(), *role_id))
            .collect()
    }
}

pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
