//! Shared handle to the ledger plus optional JSON snapshot persistence

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::services::ledger::{Ledger, LedgerSnapshot};

/// Cloneable handle to the single ledger instance.
///
/// Every mutation runs under the write lock, so a whole operation (item
/// update, transaction append, alert scan) is observed atomically by readers.
#[derive(Clone)]
pub struct LedgerStore {
    inner: Arc<RwLock<Ledger>>,
    snapshot_path: Option<PathBuf>,
    autosave: bool,
}

impl LedgerStore {
    /// Memory-only store
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            snapshot_path: None,
            autosave: false,
        }
    }

    /// Open the store described by `config`, loading the snapshot if one exists
    pub async fn open(config: &StorageConfig) -> AppResult<Self> {
        let Some(path) = config.snapshot_path.as_deref().map(PathBuf::from) else {
            tracing::info!("No snapshot path configured, ledger is memory-only");
            return Ok(Self::new(Ledger::new()));
        };

        let ledger = if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?
        {
            let snapshot = read_snapshot(&path).await?;
            tracing::info!(
                "Loaded ledger snapshot from {} ({} items, {} transactions)",
                path.display(),
                snapshot.items.len(),
                snapshot.transactions.len()
            );
            Ledger::from_snapshot(snapshot)
        } else {
            tracing::info!("Snapshot {} not found, starting empty", path.display());
            Ledger::new()
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(ledger)),
            snapshot_path: Some(path),
            autosave: config.autosave,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.snapshot_path.is_some()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().await
    }

    /// Write the current ledger to the snapshot file, if one is configured
    pub async fn save(&self) -> AppResult<()> {
        let ledger = self.inner.read().await;
        self.write_snapshot(&ledger).await
    }

    /// Called by services while still holding the write lock
    pub async fn persist_after_mutation(&self, ledger: &Ledger) -> AppResult<()> {
        if self.autosave {
            self.write_snapshot(ledger).await?;
        }
        Ok(())
    }

    async fn write_snapshot(&self, ledger: &Ledger) -> AppResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let body = serde_json::to_vec_pretty(&ledger.snapshot())
            .map_err(|e| AppError::Storage(format!("snapshot serialization failed: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
        }

        // Write next to the target, then rename over it
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Ledger snapshot written to {}", path.display());
        Ok(())
    }
}

async fn read_snapshot(path: &Path) -> AppResult<LedgerSnapshot> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Storage(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&body)
        .map_err(|e| AppError::Storage(format!("{} is not a valid snapshot: {}", path.display(), e)))
}
