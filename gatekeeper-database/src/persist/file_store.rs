use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tokio::sync::watch;
use tracing::{debug, error};

use super::Snapshot;

/// Single writer for the on-disk config document.
///
/// Snapshots go through a `watch` channel, so only the newest pending one is
/// written and at most one write is in flight.
#[derive(Debug)]
pub struct FileStore {
    pending: watch::Sender<Snapshot>,
    written: watch::Receiver<u64>,
}

impl FileStore {
    pub fn spawn(path: PathBuf) -> Self {
        let (pending, mut queued) = watch::channel(Snapshot::default());
        let (written_tx, written) = watch::channel(0_u64);

        tokio::spawn(async move {
            while queued.changed().await.is_ok() {
                let snapshot = queued.borrow_and_update().clone();

                match write_atomically(&path, &snapshot.payload).await {
                    Ok(()) => debug!(revision = snapshot.revision, "server data saved"),
                    Err(source) => error!(
                        ?source,
                        path = %path.display(),
                        revision = snapshot.revision,
                        "failed to save server data"
                    ),
                }

                if written_tx.send(snapshot.revision).is_err() {
                    break;
                }
            }
        });

        Self {
            pending,
            written,
        }
    }

    pub fn submit(&self, snapshot: Snapshot) {
        self.pending.send_replace(snapshot);
    }

    pub fn last(&self) -> Snapshot {
        self.pending.borrow().clone()
    }

    pub async fn flush(&self, revision: u64) {
        let mut written = self.written.clone();
        let _ = written.wait_for(|done| *done >= revision).await;
    }
}

async fn write_atomically(path: &Path, payload: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, payload)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(())
}
