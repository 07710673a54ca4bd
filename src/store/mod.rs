// Realtime key-value store abstraction
//
// The league core never talks to a concrete database. It reads full
// collection snapshots through push-style subscriptions and writes through
// path-addressed operations, the same shape a hosted realtime database offers.

pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use push_id::PushIdGenerator;

mod errors;
pub mod memory;
pub mod push_id;
pub mod records;
#[cfg(test)]
pub mod test_utils;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{AsRefStr, EnumIter};

/// Top-level collections persisted by the league
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Players,
    Weeks,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Absolute, slash-separated location inside the store, e.g. `/weeks/<id>/results`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn collection(collection: Collection) -> Self {
        Self {
            segments: vec![collection.as_ref().to_string()],
        }
    }

    pub fn record(collection: Collection, id: &str) -> Self {
        Self::collection(collection).child(id)
    }

    pub fn child(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Rejects empty segments and segments that would split into more path levels
    pub fn validate(&self) -> Result<(), StoreError> {
        if self
            .segments
            .iter()
            .any(|s| s.is_empty() || s.contains('/'))
        {
            return Err(StoreError::InvalidPath(self.to_string()));
        }
        Ok(())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// A full copy of one collection as delivered to subscribers.
/// Entries are ordered by key, which for push ids is insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub collection: Collection,
    pub entries: Vec<(String, Value)>,
}

impl CollectionSnapshot {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path -> value mapping written as one unit. `Value::Null` deletes the path.
pub type MultiUpdate = BTreeMap<StorePath, Value>;

/// Lazy, infinite stream of full collection snapshots. Dropping it unsubscribes.
pub type SnapshotStream = BoxStream<'static, Result<CollectionSnapshot, StoreError>>;

/// Contract of the external realtime store
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Subscribe to a collection. The current snapshot is delivered first,
    /// then one snapshot per change. Subscribing again restarts delivery.
    fn subscribe(&self, collection: Collection) -> SnapshotStream;

    /// Reserve a unique identifier for a record about to be written
    fn generate_id(&self, collection: Collection) -> Result<String, StoreError>;

    /// Apply every path write or none of them
    async fn atomic_multi_update(&self, updates: MultiUpdate) -> Result<(), StoreError>;

    async fn remove_path(&self, path: &StorePath) -> Result<(), StoreError>;

    async fn set_path(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Merge the keys of `partial` into the object at `path`
    async fn update_path(&self, path: &StorePath, partial: Value) -> Result<(), StoreError>;
}
