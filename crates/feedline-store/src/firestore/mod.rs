//! REST client for the hosted document store.
//!
//! Speaks the Firestore v1 wire protocol: document paths under
//! `projects/{id}/databases/(default)/documents`, typed field values,
//! `:runQuery` for filtered and ordered reads, field-mask PATCH for merge
//! updates. Admin authorization comes from the shared [`TokenSource`].

pub mod value;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use feedline_core::{ServiceAccount, TokenSource};

use crate::error::{StoreError, StoreResult};
use crate::path::{validate_key, CollectionPath};
use crate::store::{Document, DocumentStore, Fields, OrderDirection};

const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Client for the hosted document store.
///
/// Cheap to share: holds a [`reqwest::Client`] and the process-wide token
/// source. All operations are single REST calls (listing follows page
/// tokens); retries and caching are left to the service.
pub struct FirestoreStore {
    http: reqwest::Client,
    tokens: Arc<TokenSource>,
    base: reqwest::Url,
    /// `projects/{id}/databases/(default)/documents`, pre-split.
    root: Vec<String>,
}

impl FirestoreStore {
    pub fn new(http: reqwest::Client, account: &ServiceAccount, tokens: Arc<TokenSource>) -> Self {
        let root = vec![
            "projects".to_string(),
            account.project_id.clone(),
            "databases".to_string(),
            "(default)".to_string(),
            "documents".to_string(),
        ];
        Self {
            http,
            tokens,
            base: reqwest::Url::parse(BASE_URL).expect("base URL parses"),
            root,
        }
    }

    fn collection_url(&self, path: &CollectionPath) -> reqwest::Url {
        let mut url = self.base.clone();
        {
            let mut parts = url.path_segments_mut().expect("base URL is not opaque");
            parts.extend(self.root.iter().map(String::as_str));
            parts.extend(path.segments().iter().map(String::as_str));
        }
        url
    }

    fn document_url(&self, path: &CollectionPath, key: &str) -> reqwest::Url {
        let mut url = self.collection_url(path);
        url.path_segments_mut()
            .expect("base URL is not opaque")
            .push(key);
        url
    }

    /// URL of the `:runQuery` method on the collection's parent document
    /// (or on the database root for a root collection).
    fn query_url(&self, path: &CollectionPath) -> reqwest::Url {
        let mut segments = self.root.clone();
        segments.extend(path.parent_segments().iter().cloned());
        let last = segments.pop().expect("root segments are non-empty");

        let mut url = self.base.clone();
        {
            let mut parts = url.path_segments_mut().expect("base URL is not opaque");
            parts.extend(segments.iter().map(String::as_str));
            parts.push(&format!("{last}:runQuery"));
        }
        url
    }

    async fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> StoreResult<reqwest::RequestBuilder> {
        Ok(request.bearer_auth(self.tokens.token().await?))
    }

    async fn run_query(&self, path: &CollectionPath, query: Value) -> StoreResult<Vec<Document>> {
        let body = json!({"structuredQuery": query});
        let response = self
            .authorized(self.http.post(self.query_url(path)))
            .await?
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        // The response is a JSON array; entries without a `document` member
        // carry read metadata only.
        let results: Value = response.json().await?;
        let mut documents = Vec::new();
        if let Some(entries) = results.as_array() {
            for entry in entries {
                if let Some(raw) = entry.get("document") {
                    documents.push(decode_document(raw)?);
                }
            }
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, path: &CollectionPath) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.collection_url(path);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self.authorized(self.http.get(url)).await?.send().await?;
            if !response.status().is_success() {
                return Err(error_from(response).await);
            }

            let body: Value = response.json().await?;
            if let Some(entries) = body.get("documents").and_then(|d| d.as_array()) {
                for entry in entries {
                    documents.push(decode_document(entry)?);
                }
            }

            match body.get("nextPageToken").and_then(|t| t.as_str()) {
                Some(token) => page_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(path = %path, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn query_eq(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.run_query(
            path,
            json!({
                "from": [{"collectionId": path.collection_id()}],
                "where": {
                    "fieldFilter": {
                        "field": {"fieldPath": field},
                        "op": "EQUAL",
                        "value": value::encode_value(value),
                    }
                }
            }),
        )
        .await
    }

    async fn list_ordered(
        &self,
        path: &CollectionPath,
        field: &str,
        direction: OrderDirection,
    ) -> StoreResult<Vec<Document>> {
        let direction = match direction {
            OrderDirection::Ascending => "ASCENDING",
            OrderDirection::Descending => "DESCENDING",
        };
        self.run_query(
            path,
            json!({
                "from": [{"collectionId": path.collection_id()}],
                "orderBy": [{"field": {"fieldPath": field}, "direction": direction}]
            }),
        )
        .await
    }

    async fn add(&self, path: &CollectionPath, fields: Fields) -> StoreResult<Document> {
        let body = json!({"fields": value::encode_fields(&fields)});
        let response = self
            .authorized(self.http.post(self.collection_url(path)))
            .await?
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let created: Value = response.json().await?;
        decode_document(&created)
    }

    async fn get(&self, path: &CollectionPath, key: &str) -> StoreResult<Option<Document>> {
        validate_key(key)?;
        let response = self
            .authorized(self.http.get(self.document_url(path, key)))
            .await?
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let raw: Value = response.json().await?;
        Ok(Some(decode_document(&raw)?))
    }

    async fn set(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()> {
        validate_key(key)?;
        // PATCH without a field mask replaces the whole document, creating
        // it when absent.
        let body = json!({"fields": value::encode_fields(&fields)});
        let response = self
            .authorized(self.http.patch(self.document_url(path, key)))
            .await?
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }

    async fn update(&self, path: &CollectionPath, key: &str, fields: Fields) -> StoreResult<()> {
        validate_key(key)?;
        let mut url = self.document_url(path, key);
        {
            let mut query = url.query_pairs_mut();
            for field in fields.keys() {
                query.append_pair("updateMask.fieldPaths", field);
            }
            query.append_pair("currentDocument.exists", "true");
        }

        let body = json!({"fields": value::encode_fields(&fields)});
        let response = self
            .authorized(self.http.patch(url))
            .await?
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::DocumentNotFound(format!("{path}/{key}")));
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let response = self
            .authorized(self.http.delete(self.document_url(path, key)))
            .await?
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("root", &self.root.join("/"))
            .finish_non_exhaustive()
    }
}

/// Decode a wire document (`name`, `fields`, timestamps) into a [`Document`].
fn decode_document(raw: &Value) -> StoreResult<Document> {
    let name = raw
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| StoreError::Decode("document without a name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();

    let fields = match raw.get("fields") {
        Some(fields) => value::decode_fields(fields)?,
        None => Fields::new(),
    };

    Ok(Document { id, fields })
}

async fn error_from(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = match response.json::<Value>().await {
        Ok(body) => body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown store error")
            .to_string(),
        Err(_) => "unknown store error".to_string(),
    };
    StoreError::Provider { status, message }
}
