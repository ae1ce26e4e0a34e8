//! Publication routes: the feed's top-level documents.
//!
//! Publication bodies pass through verbatim — any JSON object is accepted,
//! empty objects included. By convention clients send a `userId` and
//! arbitrary content fields; nothing here enforces a schema.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use feedline_store::{Document, Fields, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::routes::{publications_path, MessageResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for GET /publications/user.
#[derive(Debug, Deserialize)]
pub struct UserFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /publications — the whole feed, store-native order.
async fn list_publications(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let path = publications_path().map_err(fetch_error)?;
    let publications = state.store().list(&path).await.map_err(fetch_error)?;
    Ok(Json(publications))
}

/// GET /publications/user?userId= — filter by author, or the whole feed when
/// no filter is given.
async fn list_publications_by_user(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Vec<Document>>> {
    let path = publications_path().map_err(fetch_error)?;
    let store = state.store();

    let publications = match &filter.user_id {
        Some(user_id) => {
            store
                .query_eq(&path, "userId", &Value::String(user_id.clone()))
                .await
        }
        None => store.list(&path).await,
    }
    .map_err(fetch_error)?;

    Ok(Json(publications))
}

/// POST /publications — insert the body verbatim.
async fn create_publication(
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let path = publications_path().map_err(create_error)?;
    let publication = state.store().add(&path, body).await.map_err(create_error)?;

    tracing::info!(publication_id = %publication.id, "Publication created");
    Ok((StatusCode::CREATED, Json(publication)))
}

/// PUT /publications/{id} — partial field merge into an existing document.
async fn update_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Fields>,
) -> ApiResult<Json<MessageResponse>> {
    let path = publications_path().map_err(update_error)?;
    state
        .store()
        .update(&path, &id, body)
        .await
        .map_err(|e| match e {
            StoreError::DocumentNotFound(_) => {
                ApiError::NotFound("Publication not found".to_string())
            }
            other => update_error(other),
        })?;

    Ok(Json(MessageResponse {
        message: "Publication updated successfully".to_string(),
    }))
}

/// DELETE /publications/{id} — idempotent; succeeds whether or not the
/// document existed.
async fn remove_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let path = publications_path().map_err(delete_error)?;
    state.store().delete(&path, &id).await.map_err(delete_error)?;

    Ok(Json(MessageResponse {
        message: "Publication deleted successfully".to_string(),
    }))
}

fn fetch_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error fetching publications");
    ApiError::Feed("Failed to fetch publications".to_string())
}

fn create_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error adding publication");
    ApiError::Feed("Failed to add publication".to_string())
}

fn update_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error updating publication");
    ApiError::Feed("Failed to update publication".to_string())
}

fn delete_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error deleting publication");
    ApiError::Feed("Failed to delete publication".to_string())
}

/// Build publication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/publications",
            get(list_publications).post(create_publication),
        )
        .route("/publications/user", get(list_publications_by_user))
        .route(
            "/publications/{id}",
            put(update_publication).delete(remove_publication),
        )
}
