//! Comment routes: nested documents under a publication.
//!
//! Comments are created without checking that the parent publication exists,
//! so a client racing a deletion can leave orphaned comments behind; the
//! listing for a missing publication is simply empty.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use feedline_store::{Document, Fields, OrderDirection, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::routes::comments_path;
use crate::state::AppState;

/// Field used to order the comment listing.
const CREATED_AT: &str = "createdAt";

/// POST /publications/{id}/comments — insert the body verbatim.
async fn create_comment(
    State(state): State<AppState>,
    Path(publication_id): Path<String>,
    Json(body): Json<Fields>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let path = comments_path(&publication_id).map_err(create_error)?;
    let comment = state.store().add(&path, body).await.map_err(create_error)?;

    tracing::info!(
        publication_id = %publication_id,
        comment_id = %comment.id,
        "Comment created"
    );
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /publications/{id}/comments — newest first by `createdAt`. Comments
/// without that field do not appear.
async fn list_comments(
    State(state): State<AppState>,
    Path(publication_id): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    let path = comments_path(&publication_id).map_err(fetch_error)?;
    let comments = state
        .store()
        .list_ordered(&path, CREATED_AT, OrderDirection::Descending)
        .await
        .map_err(fetch_error)?;
    Ok(Json(comments))
}

fn create_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error adding comment");
    ApiError::Feed("Failed to add comment".to_string())
}

fn fetch_error(error: StoreError) -> ApiError {
    tracing::error!(error = %error, "Error fetching comments");
    ApiError::Feed("Failed to fetch comments".to_string())
}

/// Build comment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/publications/{id}/comments",
        get(list_comments).post(create_comment),
    )
}
