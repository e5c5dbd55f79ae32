//! The process-wide store connection.
//!
//! A [`StoreConnection`] starts out pending and becomes ready exactly once,
//! when [`StoreConnection::connect`] completes. Until then every attempt to
//! resolve a collection fails with [`StoreError::NotReady`]. Clones share the
//! same underlying connection; nothing opens a second one per request.

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::core::{Result, StoreError};
use crate::storage::{CollectionHandle, DatabaseSnapshot, DocumentStore, InMemoryStore, SnapshotManager, load_seed};
use config::ConnectionConfig;

#[derive(Clone)]
pub struct StoreConnection {
    store: Arc<OnceCell<Arc<dyn DocumentStore>>>,
    config: Arc<ConnectionConfig>,
}

impl StoreConnection {
    /// A connection that is not ready until [`connect`](Self::connect) runs.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            store: Arc::new(OnceCell::new()),
            config: Arc::new(config),
        }
    }

    /// An already-established connection over `store`.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: Arc::new(OnceCell::new_with(Some(store))),
            config: Arc::new(ConnectionConfig::default()),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.store.initialized()
    }

    /// Establish the connection. Idempotent; concurrent callers share one
    /// attempt, and a failed attempt leaves the connection pending.
    pub async fn connect(&self) -> Result<()> {
        let config = Arc::clone(&self.config);
        self.store
            .get_or_try_init(|| async move {
                tokio::time::timeout(config.connect_timeout, open_store(&config))
                    .await
                    .map_err(|_| {
                        StoreError::ConnectionError(format!(
                            "connecting to '{}' timed out after {:?}",
                            config.database, config.connect_timeout
                        ))
                    })?
            })
            .await?;
        Ok(())
    }

    pub fn store(&self) -> Result<Arc<dyn DocumentStore>> {
        self.store.get().cloned().ok_or(StoreError::NotReady)
    }

    /// Resolve `name` to a collection handle. The name is not validated.
    pub fn collection(&self, name: &str) -> Result<CollectionHandle> {
        Ok(CollectionHandle::new(self.store()?, name))
    }

    /// Write the configured snapshot file. `Ok(None)` when no snapshot path
    /// is configured.
    pub async fn save_snapshot(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.config.snapshot_path.clone() else {
            return Ok(None);
        };

        let collections = self.store()?.dump().await?;
        let snapshot = DatabaseSnapshot::new(collections);
        let document_count = snapshot.metadata.document_count;

        let target = path.clone();
        tokio::task::spawn_blocking(move || SnapshotManager::new(&target).save(&snapshot))
            .await
            .map_err(|e| StoreError::SnapshotError(format!("snapshot task failed: {e}")))??;

        info!(path = %path.display(), documents = document_count, "snapshot saved");
        Ok(Some(path))
    }
}

async fn open_store(config: &ConnectionConfig) -> Result<Arc<dyn DocumentStore>> {
    if !config.connect_delay.is_zero() {
        debug!(delay = ?config.connect_delay, "delaying connect");
        tokio::time::sleep(config.connect_delay).await;
    }

    let snapshot_path = config.snapshot_path.clone();
    let seed_path = config.seed_path.clone();
    let initial = tokio::task::spawn_blocking(move || -> Result<_> {
        if let Some(path) = snapshot_path {
            if let Some(snapshot) = SnapshotManager::new(&path).load()? {
                info!(path = %path.display(), documents = snapshot.metadata.document_count, "restored snapshot");
                return Ok(snapshot.collections);
            }
        }
        if let Some(path) = seed_path {
            let collections = load_seed(&path)?;
            info!(path = %path.display(), collections = collections.len(), "loaded seed");
            return Ok(collections);
        }
        Ok(Default::default())
    })
    .await
    .map_err(|e| StoreError::ConnectionError(format!("store loader failed: {e}")))??;

    let store = InMemoryStore::from_collections(initial)?;
    info!(database = %config.database, "connected to document store");
    Ok(Arc::new(store))
}
