use std::sync::{Mutex, PoisonError};

use super::Snapshot;

#[derive(Debug, Default)]
pub struct MemoryStore {
    last: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn submit(&self, snapshot: Snapshot) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn last(&self) -> Snapshot {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
