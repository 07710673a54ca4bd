use async_trait::async_trait;
use futures::stream;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, instrument, warn};

use super::{
    Collection, CollectionSnapshot, MultiUpdate, PushIdGenerator, RealtimeStore, SnapshotStream,
    StoreError, StorePath,
};

const SUBSCRIBER_CAPACITY: usize = 64;

struct Inner {
    root: RwLock<Map<String, Value>>,
    channels: HashMap<Collection, broadcast::Sender<CollectionSnapshot>>,
}

impl Inner {
    async fn snapshot(&self, collection: Collection) -> CollectionSnapshot {
        let root = self.root.read().await;
        snapshot_of(&root, collection)
    }

    fn subscribe_channel(&self, collection: Collection) -> broadcast::Receiver<CollectionSnapshot> {
        // Every collection gets a channel in `InMemoryStore::new`
        match self.channels.get(&collection) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(SUBSCRIBER_CAPACITY);
                drop(sender);
                receiver
            }
        }
    }

    /// Runs `mutate` against a copy of the tree and only commits it if every
    /// write succeeded. Subscribers of collections whose content changed get
    /// the new snapshot.
    async fn commit<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<(), StoreError>,
    {
        let mut root = self.root.write().await;
        let mut next = root.clone();
        mutate(&mut next)?;

        let changed: Vec<Collection> = Collection::iter()
            .filter(|c| root.get(c.as_ref()) != next.get(c.as_ref()))
            .collect();
        *root = next;

        for collection in changed {
            let snapshot = snapshot_of(&root, collection);
            if let Some(sender) = self.channels.get(&collection) {
                match sender.send(snapshot) {
                    Ok(receivers) => {
                        debug!(%collection, receivers, "Snapshot delivered to subscribers")
                    }
                    Err(_) => debug!(%collection, "Snapshot changed with no subscribers"),
                }
            }
        }

        Ok(())
    }
}

/// In-memory realtime store for development and testing
///
/// Data lives in a single JSON tree and is lost when the process exits.
/// Subscriptions are fed from per-collection broadcast channels.
pub struct InMemoryStore {
    inner: Arc<Inner>,
    ids: PushIdGenerator,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        let channels = Collection::iter()
            .map(|collection| {
                let (sender, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
                (collection, sender)
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                root: RwLock::new(Map::new()),
                channels,
            }),
            ids: PushIdGenerator::new(),
        }
    }

    /// Current content of a collection, without subscribing
    #[cfg(test)]
    pub async fn snapshot(&self, collection: Collection) -> CollectionSnapshot {
        self.inner.snapshot(collection).await
    }

    /// Value stored at `path`, if any
    #[cfg(test)]
    pub async fn value_at(&self, path: &StorePath) -> Option<Value> {
        let root = self.inner.root.read().await;
        let (first, rest) = path.segments().split_first()?;
        let mut current = root.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }
}

enum Subscription {
    Pending(Arc<Inner>, Collection),
    Live(
        Arc<Inner>,
        Collection,
        broadcast::Receiver<CollectionSnapshot>,
    ),
    Closed,
}

#[async_trait]
impl RealtimeStore for InMemoryStore {
    fn subscribe(&self, collection: Collection) -> SnapshotStream {
        let initial = Subscription::Pending(self.inner.clone(), collection);

        Box::pin(stream::unfold(initial, |state| async move {
            match state {
                Subscription::Pending(inner, collection) => {
                    // Subscribe before reading so no change can slip between the two
                    let receiver = inner.subscribe_channel(collection);
                    let snapshot = inner.snapshot(collection).await;
                    Some((
                        Ok(snapshot),
                        Subscription::Live(inner, collection, receiver),
                    ))
                }
                Subscription::Live(inner, collection, mut receiver) => {
                    match receiver.recv().await {
                        Ok(snapshot) => Some((
                            Ok(snapshot),
                            Subscription::Live(inner, collection, receiver),
                        )),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Every snapshot is complete, so skipping to the latest loses nothing
                            warn!(%collection, skipped, "Subscriber lagged, resending latest snapshot");
                            let snapshot = inner.snapshot(collection).await;
                            Some((
                                Ok(snapshot),
                                Subscription::Live(inner, collection, receiver),
                            ))
                        }
                        Err(broadcast::error::RecvError::Closed) => Some((
                            Err(StoreError::SubscriptionClosed(collection.to_string())),
                            Subscription::Closed,
                        )),
                    }
                }
                Subscription::Closed => None,
            }
        }))
    }

    fn generate_id(&self, collection: Collection) -> Result<String, StoreError> {
        let id = self.ids.next_id()?;
        debug!(%collection, id = %id, "Generated push id");
        Ok(id)
    }

    #[instrument(skip(self, updates), fields(paths = updates.len()))]
    async fn atomic_multi_update(&self, updates: MultiUpdate) -> Result<(), StoreError> {
        for path in updates.keys() {
            path.validate()?;
        }
        reject_overlapping(&updates)?;

        self.inner
            .commit(|root| {
                for (path, value) in updates {
                    write_at(root, path.segments(), value);
                }
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn remove_path(&self, path: &StorePath) -> Result<(), StoreError> {
        path.validate()?;
        self.inner
            .commit(|root| {
                write_at(root, path.segments(), Value::Null);
                Ok(())
            })
            .await
    }

    #[instrument(skip(self, value))]
    async fn set_path(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        path.validate()?;
        self.inner
            .commit(|root| {
                write_at(root, path.segments(), value);
                Ok(())
            })
            .await
    }

    #[instrument(skip(self, partial))]
    async fn update_path(&self, path: &StorePath, partial: Value) -> Result<(), StoreError> {
        path.validate()?;
        let Value::Object(fields) = partial else {
            return Err(StoreError::Serialization(format!(
                "update at {} requires an object",
                path
            )));
        };
        for key in fields.keys() {
            path.clone().child(key).validate()?;
        }

        self.inner
            .commit(|root| {
                for (key, value) in fields {
                    let child = path.clone().child(&key);
                    write_at(root, child.segments(), value);
                }
                Ok(())
            })
            .await
    }
}

fn snapshot_of(root: &Map<String, Value>, collection: Collection) -> CollectionSnapshot {
    let entries = match root.get(collection.as_ref()) {
        Some(Value::Object(records)) => {
            let mut entries: Vec<(String, Value)> = records
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            entries
        }
        _ => Vec::new(),
    };

    CollectionSnapshot {
        collection,
        entries,
    }
}

fn reject_overlapping(updates: &MultiUpdate) -> Result<(), StoreError> {
    let paths: Vec<&StorePath> = updates.keys().collect();
    for (index, path) in paths.iter().enumerate() {
        for other in &paths[index + 1..] {
            if is_ancestor(path, other) || is_ancestor(other, path) {
                return Err(StoreError::InvalidPath(format!(
                    "{} overlaps {} in the same update",
                    path, other
                )));
            }
        }
    }
    Ok(())
}

fn is_ancestor(ancestor: &StorePath, path: &StorePath) -> bool {
    ancestor.segments().len() < path.segments().len()
        && path.segments().starts_with(ancestor.segments())
}

/// Writes `value` at `segments`, creating intermediate objects. Null and empty
/// objects delete the location, and parents left empty are pruned.
fn write_at(node: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        match prune(value) {
            Some(value) => {
                node.insert(first.clone(), value);
            }
            None => {
                node.remove(first);
            }
        }
        return;
    }

    if value.is_null() && !matches!(node.get(first), Some(Value::Object(_))) {
        return;
    }

    let child = node
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(map) = child {
        write_at(map, rest, value);
        if map.is_empty() {
            node.remove(first);
        }
    }
}

/// Drops null fields and empty objects the way a realtime database does
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, value)| prune(value).map(|v| (key, v)))
                .collect();
            if pruned.is_empty() {
                None
            } else {
                Some(Value::Object(pruned))
            }
        }
        other => Some(other),
    }
}
