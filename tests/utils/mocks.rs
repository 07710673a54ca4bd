use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

use league_ledger::store::{
    Collection, InMemoryStore, MultiUpdate, RealtimeStore, SnapshotStream, StoreError, StorePath,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// In-memory store that can be told to reject every write, the way a backend
/// does when security rules deny the caller
pub struct SwitchableStore {
    inner: InMemoryStore,
    deny_writes: AtomicBool,
}

impl SwitchableStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            deny_writes: AtomicBool::new(false),
        }
    }

    pub fn deny_writes(&self, deny: bool) {
        self.deny_writes.store(deny, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.deny_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("PERMISSION_DENIED: rules rejected write".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeStore for SwitchableStore {
    fn subscribe(&self, collection: Collection) -> SnapshotStream {
        self.inner.subscribe(collection)
    }

    fn generate_id(&self, collection: Collection) -> Result<String, StoreError> {
        self.inner.generate_id(collection)
    }

    async fn atomic_multi_update(&self, updates: MultiUpdate) -> Result<(), StoreError> {
        self.check()?;
        self.inner.atomic_multi_update(updates).await
    }

    async fn remove_path(&self, path: &StorePath) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove_path(path).await
    }

    async fn set_path(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_path(path, value).await
    }

    async fn update_path(&self, path: &StorePath, partial: Value) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update_path(path, partial).await
    }
}
