use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use anyhow::Context as _;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{error, info};

use crate::model::server_config::ServerConfig;
use crate::persist::{FileStore, MemoryStore, PersistBackend, Snapshot};

/// Owned store of every guild's [`ServerConfig`].
///
/// Loaded once at startup. Each guild sits behind its own async mutex so the
/// read, mutate and save steps of one command never interleave with another
/// command touching the same guild. Saves go through a single writer.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    servers: RwLock<HashMap<u64, Arc<Mutex<ServerConfig>>>>,
    published: StdMutex<BTreeMap<u64, ServerConfig>>,
    revision: AtomicU64,
    backend: PersistBackend,
}

impl ConfigStore {
    /// Open the JSON store at `path`, creating an empty document if missing.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let configs = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                info!(path = %path.display(), "Reading server data...");
                let configs: BTreeMap<u64, ServerConfig> = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                info!(servers = configs.len(), "Server data loaded.");
                Some(configs)
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(source).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        let store = Self::with_backend(
            configs.clone().unwrap_or_default(),
            PersistBackend::File(FileStore::spawn(path.clone())),
        );

        if configs.is_none() {
            info!(path = %path.display(), "Creating new server data file...");
            store.save_all();
            store.flush().await;
        }

        Ok(store)
    }

    /// A store that keeps its saved snapshots in memory only.
    pub fn in_memory() -> Self {
        Self::from_configs(BTreeMap::new())
    }

    /// An in-memory store seeded with existing configs.
    pub fn from_configs(configs: BTreeMap<u64, ServerConfig>) -> Self {
        Self::with_backend(configs, PersistBackend::Memory(MemoryStore::default()))
    }

    fn with_backend(configs: BTreeMap<u64, ServerConfig>, backend: PersistBackend) -> Self {
        let servers = configs
            .iter()
            .map(|(guild_id, config)| (*guild_id, Arc::new(Mutex::new(config.clone()))))
            .collect();

        Self {
            inner: Arc::new(StoreInner {
                servers: RwLock::new(servers),
                published: StdMutex::new(configs),
                revision: AtomicU64::new(0),
                backend,
            }),
        }
    }

    /// Lock one guild's config, creating (and saving) a default one the first
    /// time the guild is seen.
    pub async fn lock(&self, guild_id: u64) -> ConfigGuard {
        let entry = self.entry(guild_id).await;
        let config = entry.lock_owned().await;

        ConfigGuard {
            guild_id,
            config,
            store: self.clone(),
        }
    }

    /// Copy of one guild's config, if the guild has been seen.
    pub async fn snapshot(&self, guild_id: u64) -> Option<ServerConfig> {
        let entry = self.inner.servers.read().await.get(&guild_id).cloned()?;
        let config = entry.lock().await;
        Some(config.clone())
    }

    pub async fn contains(&self, guild_id: u64) -> bool {
        self.inner.servers.read().await.contains_key(&guild_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.servers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Revision of the most recently submitted save.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// The JSON document the latest save submitted.
    pub fn saved_json(&self) -> String {
        self.inner.backend.last().payload.to_string()
    }

    /// Wait until every submitted save has reached the backend.
    pub async fn flush(&self) {
        self.inner.backend.flush(self.revision()).await;
    }

    async fn entry(&self, guild_id: u64) -> Arc<Mutex<ServerConfig>> {
        if let Some(entry) = self.inner.servers.read().await.get(&guild_id) {
            return entry.clone();
        }

        let mut servers = self.inner.servers.write().await;
        if let Some(entry) = servers.get(&guild_id) {
            return entry.clone();
        }

        info!(guild_id, "Server data not registered, registering...");
        let config = ServerConfig::default();
        let entry = Arc::new(Mutex::new(config.clone()));
        servers.insert(guild_id, entry.clone());
        drop(servers);

        self.publish(guild_id, &config);
        entry
    }

    /// Record `config` as the durable state of `guild_id` and submit a save of
    /// the full document.
    fn publish(&self, guild_id: u64, config: &ServerConfig) -> u64 {
        let mut published = self
            .inner
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        published.insert(guild_id, config.clone());
        self.submit_locked(&published)
    }

    fn save_all(&self) -> u64 {
        let published = self
            .inner
            .published
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.submit_locked(&published)
    }

    fn submit_locked(&self, published: &BTreeMap<u64, ServerConfig>) -> u64 {
        let payload = match render(published) {
            Ok(payload) => payload,
            Err(source) => {
                error!(?source, "failed to serialize server data");
                return self.revision();
            }
        };

        let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.backend.submit(Snapshot {
            revision,
            payload: Arc::new(payload),
        });
        revision
    }
}

fn render(configs: &BTreeMap<u64, ServerConfig>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(configs)
}

/// Exclusive access to one guild's config.
///
/// Mutations are not durable until [`ConfigGuard::save`] is called.
#[derive(Debug)]
pub struct ConfigGuard {
    guild_id: u64,
    config: OwnedMutexGuard<ServerConfig>,
    store: ConfigStore,
}

impl ConfigGuard {
    /// Submit the current state for saving; returns the save revision.
    pub fn save(&self) -> u64 {
        self.store.publish(self.guild_id, &self.config)
    }
}

impl Deref for ConfigGuard {
    type Target = ServerConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl DerefMut for ConfigGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.config
    }
}
