use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Collection, CollectionSnapshot, StoreError, StorePath};

/// A record persisted under `/<collection>/<id>`.
///
/// The id is the record's key in the store and is never written as a field.
pub trait StoredRecord: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn path(&self) -> StorePath {
        StorePath::record(Self::COLLECTION, self.id())
    }
}

pub fn encode<T: StoredRecord>(record: &T) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut value {
        fields.remove("id");
    }
    Ok(value)
}

pub fn decode<T: StoredRecord>(id: &str, value: &Value) -> Result<T, StoreError> {
    let mut record: T = serde_json::from_value(value.clone()).map_err(|err| {
        StoreError::Serialization(format!("{}/{}: {}", T::COLLECTION, id, err))
    })?;
    record.set_id(id.to_string());
    Ok(record)
}

/// Decodes every entry of a snapshot, keeping snapshot (insertion) order
pub fn decode_snapshot<T: StoredRecord>(
    snapshot: &CollectionSnapshot,
) -> Result<Vec<T>, StoreError> {
    if snapshot.collection != T::COLLECTION {
        return Err(StoreError::Serialization(format!(
            "expected a {} snapshot, got {}",
            T::COLLECTION,
            snapshot.collection
        )));
    }

    snapshot
        .entries
        .iter()
        .map(|(id, value)| decode(id, value))
        .collect()
}
