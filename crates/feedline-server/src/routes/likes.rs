//! Like routes: per-user engagement documents under a publication.
//!
//! A like is keyed by the liking user's id and carries that same id as its
//! only field, so re-liking overwrites the same document. Counting is a
//! full sub-collection read, not a maintained counter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use feedline_store::{Fields, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::routes::{likes_path, MessageResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /publications/{id}/likes.
#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response for GET /publications/{id}/likes/count.
#[derive(Debug, Serialize)]
pub struct LikeCountResponse {
    pub count: usize,
}

/// Response for GET /publications/{id}/likes/{userId}.
#[derive(Debug, Serialize)]
pub struct HasLikedResponse {
    #[serde(rename = "hasLiked")]
    pub has_liked: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /publications/{id}/likes — upsert the caller's like; re-liking is a
/// no-op overwrite.
async fn add_like(
    State(state): State<AppState>,
    Path(publication_id): Path<String>,
    Json(request): Json<LikeRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let path = likes_path(&publication_id).map_err(add_error)?;

    let mut fields = Fields::new();
    fields.insert(
        "userId".to_string(),
        Value::String(request.user_id.clone()),
    );
    state
        .store()
        .set(&path, &request.user_id, fields)
        .await
        .map_err(add_error)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Like added successfully".to_string(),
        }),
    ))
}

/// DELETE /publications/{id}/likes/{userId} — idempotent removal.
async fn remove_like(
    State(state): State<AppState>,
    Path((publication_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let path = likes_path(&publication_id).map_err(remove_error)?;
    state
        .store()
        .delete(&path, &user_id)
        .await
        .map_err(remove_error)?;

    Ok(Json(MessageResponse {
        message: "Like removed successfully".to_string(),
    }))
}

/// GET /publications/{id}/likes/count — cardinality via a full read.
async fn like_count(
    State(state): State<AppState>,
    Path(publication_id): Path<String>,
) -> ApiResult<Json<LikeCountResponse>> {
    let path = likes_path(&publication_id).map_err(count_error)?;
    let count = state.store().count(&path).await.map_err(count_error)?;
    Ok(Json(LikeCountResponse { count }))
}

/// GET /publications/{id}/likes/{userId} — existence probe; the document
/// body is never returned.
async fn has_liked(
    State(state): State<AppState>,
    Path((publication_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<HasLikedResponse>> {
    let path = likes_path(&publication_id).map_err(check_error)?;
    let has_liked = state
        .store()
        .exists(&path, &user_id)
        .await
        .map_err(check_error)?;
    Ok(Json(HasLikedResponse { has_liked }))
}

fn add_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error adding like");
    ApiError::Feed("Failed to add like".to_string())
}

fn remove_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error removing like");
    ApiError::Feed("Failed to remove like".to_string())
}

fn count_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error fetching likes count");
    ApiError::Feed("Failed to fetch likes count".to_string())
}

fn check_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error checking like");
    ApiError::Feed("Failed to check like".to_string())
}

/// Build like routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/publications/{id}/likes", post(add_like))
        .route("/publications/{id}/likes/count", get(like_count))
        .route(
            "/publications/{id}/likes/{user_id}",
            get(has_liked).delete(remove_like),
        )
}
