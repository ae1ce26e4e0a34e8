//! The document-store abstraction consumed by the HTTP facade.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::path::CollectionPath;

/// Field map of a document: arbitrary JSON object members.
pub type Fields = Map<String, Value>;

/// A stored document with its key.
///
/// Serializes flat, the id alongside the caller-supplied fields:
/// `{"id": "...", "title": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    /// Caller-supplied fields.
    #[serde(flatten)]
    pub fields: Fields,
}

/// Sort direction for ordered collection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Hierarchical document store: named collections of keyed documents, with
/// sub-collections nested under parent documents.
///
/// Creating a document in a sub-collection does not require the parent
/// document to exist; the store keeps orphaned sub-collections addressable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in the store's native order.
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Document>>;

    /// Documents whose `field` equals `value`.
    async fn query_eq(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// Documents ordered by `field`. Documents without the field are absent
    /// from the result.
    async fn list_ordered(
        &self,
        path: &CollectionPath,
        field: &str,
        direction: OrderDirection,
    ) -> StoreResult<Vec<Document>>;

    /// Insert with a store-assigned id; returns the stored document.
    async fn add(&self, path: &CollectionPath, fields: Fields) -> StoreResult<Document>;

    /// Document at `key`, if present.
    async fn get(&self, path: &CollectionPath, key: &str) -> StoreResult<Option<Document>>;

    /// Create or fully overwrite the document at `key`.
    async fn set(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()>;

    /// Merge `fields` into the existing document at `key`, top-level field
    /// granularity. Fails with `StoreError::DocumentNotFound` when the
    /// document does not exist.
    async fn update(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()>;

    /// Delete the document at `key`. Succeeds whether or not it existed.
    async fn delete(&self, path: &CollectionPath, key: &str) -> StoreResult<()>;

    /// Whether a document exists at `key`.
    async fn exists(&self, path: &CollectionPath, key: &str) -> StoreResult<bool> {
        Ok(self.get(path, key).await?.is_some())
    }

    /// Number of documents in the collection, via a full read.
    async fn count(&self, path: &CollectionPath) -> StoreResult<usize> {
        Ok(self.list(path).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_flat() {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), json!("hello"));
        fields.insert("userId".to_string(), json!("u1"));

        let doc = Document {
            id: "doc-1".to_string(),
            fields,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"id": "doc-1", "title": "hello", "userId": "u1"}));
    }

    #[test]
    fn test_empty_document_serializes_to_id_only() {
        let doc = Document {
            id: "doc-1".to_string(),
            fields: Fields::new(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"id": "doc-1"}));
    }
}
