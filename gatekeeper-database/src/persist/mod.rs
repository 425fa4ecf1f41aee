mod file_store;
mod memory_store;

use std::sync::Arc;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// One full rendering of the config document.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub revision: u64,
    pub payload: Arc<String>,
}

#[derive(Debug)]
pub enum PersistBackend {
    Memory(MemoryStore),
    File(FileStore),
}

impl PersistBackend {
    pub fn submit(&self, snapshot: Snapshot) {
        match self {
            Self::Memory(store) => store.submit(snapshot),
            Self::File(store) => store.submit(snapshot),
        }
    }

    pub fn last(&self) -> Snapshot {
        match self {
            Self::Memory(store) => store.last(),
            Self::File(store) => store.last(),
        }
    }

    pub async fn flush(&self, revision: u64) {
        match self {
            Self::Memory(_) => {}
            Self::File(store) => store.flush(revision).await,
        }
    }
}
