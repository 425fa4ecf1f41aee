use crate::database::ConfigStore;

/// Map `key` (case-insensitive) to `role_id` and save. Returns the role the key
/// pointed at before, if any.
pub async fn put_role_key(store: &ConfigStore, guild_id: u64, key: &str, role_id: u64) -> Option<u64> {
    let mut config = store.lock(guild_id).await;
    let previous = config.put_role(key, role_id);
    config.save();
    previous
}

/// Remove `key`, saving only when something was removed.
pub async fn remove_role_key(store: &ConfigStore, guild_id: u64, key: &str) -> bool {
    let mut config = store.lock(guild_id).await;
    let removed = config.remove_role(key);
    if removed {
        config.save();
    }
    removed
}

pub async fn get_role_key(store: &ConfigStore, guild_id: u64, key: &str) -> Option<u64> {
    store.lock(guild_id).await.role(key)
}

/// All keys of the guild, sorted by key.
pub async fn list_role_keys(store: &ConfigStore, guild_id: u64) -> Vec<(String, u64)> {
    store.lock(guild_id).await.list_roles()
}
