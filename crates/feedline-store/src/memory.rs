//! In-memory document store: the test fake and local-development backend.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::path::{validate_key, CollectionPath};
use crate::store::{Document, DocumentStore, Fields, OrderDirection};

/// Documents of one collection, keyed by document id. Key order doubles as
/// the store-native listing order.
type Collection = BTreeMap<String, Fields>;

/// In-memory [`DocumentStore`] behind an async lock.
///
/// Mirrors the hosted store's observable behavior: key-ordered listing,
/// upsert `set`, merge `update` with an existence precondition, idempotent
/// `delete`, and ordered reads that drop documents missing the order field.
/// Sub-collections are addressed by their full path, so documents under a
/// never-created parent stay reachable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_document(id: &str, fields: &Fields) -> Document {
    Document {
        id: id.to_string(),
        fields: fields.clone(),
    }
}

/// Total order over JSON values: rank by type, then by value within the
/// type (null < bool < number < string < array < object).
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(a, b)| compare_values(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.to_string())
            .map(|collection| {
                collection
                    .iter()
                    .map(|(id, fields)| to_document(id, fields))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.to_string())
            .map(|collection| {
                collection
                    .iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| to_document(id, fields))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_ordered(
        &self,
        path: &CollectionPath,
        field: &str,
        direction: OrderDirection,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut keyed: Vec<(Value, Document)> = collections
            .get(&path.to_string())
            .map(|collection| {
                collection
                    .iter()
                    .filter_map(|(id, fields)| {
                        fields
                            .get(field)
                            .cloned()
                            .map(|key| (key, to_document(id, fields)))
                    })
                    .collect()
            })
            .unwrap_or_default();

        match direction {
            OrderDirection::Ascending => keyed.sort_by(|a, b| compare_values(&a.0, &b.0)),
            OrderDirection::Descending => keyed.sort_by(|a, b| compare_values(&b.0, &a.0)),
        }

        Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn add(&self, path: &CollectionPath, fields: Fields) -> StoreResult<Document> {
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(path.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document { id, fields })
    }

    async fn get(&self, path: &CollectionPath, key: &str) -> StoreResult<Option<Document>> {
        validate_key(key)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.to_string())
            .and_then(|collection| collection.get(key))
            .map(|fields| to_document(key, fields)))
    }

    async fn set(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()> {
        validate_key(key)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(path.to_string())
            .or_default()
            .insert(key.to_string(), fields);
        Ok(())
    }

    async fn update(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()> {
        validate_key(key)?;
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(&path.to_string())
            .and_then(|collection| collection.get_mut(key))
            .ok_or_else(|| StoreError::DocumentNotFound(format!("{path}/{key}")))?;

        for (field, value) in fields {
            existing.insert(field, value);
        }
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(&path.to_string()) {
            collection.remove(key);
        }
        Ok(())
    }
}
