use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    Collection, InMemoryStore, MultiUpdate, RealtimeStore, SnapshotStream, StoreError, StorePath,
};

/// In-memory store whose id generation and writes can be switched to fail
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_ids: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_ids: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn fail_ids(&self, fail: bool) {
        self.fail_ids.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("PERMISSION_DENIED".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeStore for FlakyStore {
    fn subscribe(&self, collection: Collection) -> SnapshotStream {
        self.inner.subscribe(collection)
    }

    fn generate_id(&self, collection: Collection) -> Result<String, StoreError> {
        if self.fail_ids.load(Ordering::SeqCst) {
            return Err(StoreError::IdGeneration("no key returned".to_string()));
        }
        self.inner.generate_id(collection)
    }

    async fn atomic_multi_update(&self, updates: MultiUpdate) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.atomic_multi_update(updates).await
    }

    async fn remove_path(&self, path: &StorePath) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.remove_path(path).await
    }

    async fn set_path(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.set_path(path, value).await
    }

    async fn update_path(&self, path: &StorePath, partial: Value) -> Result<(), StoreError> {
        self.check_writes()?;
        self.inner.update_path(path, partial).await
    }
}
