//! Route definitions for the HTTP API.

pub mod auth;
pub mod comments;
pub mod health;
pub mod likes;
pub mod publications;

use axum::Router;
use serde::Serialize;

use feedline_store::{CollectionPath, StoreResult};

use crate::state::AppState;

/// Root collection holding the feed.
pub(crate) const PUBLICATIONS: &str = "publications";

/// Confirmation-only response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub(crate) fn publications_path() -> StoreResult<CollectionPath> {
    CollectionPath::root(PUBLICATIONS)
}

pub(crate) fn comments_path(publication_id: &str) -> StoreResult<CollectionPath> {
    publications_path()?.child(publication_id, "comments")
}

pub(crate) fn likes_path(publication_id: &str) -> StoreResult<CollectionPath> {
    publications_path()?.child(publication_id, "likes")
}

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(publications::routes())
        .merge(comments::routes())
        .merge(likes::routes())
        .merge(auth::routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use feedline_core::ServiceAccount;
    use feedline_identity::MemoryIdentity;
    use feedline_store::MemoryStore;

    use super::*;
    use crate::config::ServerConfig;

    fn test_config() -> ServerConfig {
        let account = ServiceAccount::from_json(
            r#"{
                "project_id": "feedline-test",
                "client_email": "svc@feedline-test.iam.gserviceaccount.com",
                "private_key": "unused",
                "webApiKey": "unused"
            }"#,
        )
        .unwrap();
        ServerConfig {
            service_account: account,
            port: 0,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            static_dir: None,
        }
    }

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryIdentity::new()),
            test_config(),
        );
        build_router(state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        request
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let app = app();
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_publication_then_list_round_trips() {
        let app = app();

        let (status, created) = send(
            &app,
            json_request(
                Method::POST,
                "/publications",
                json!({"title": "first", "userId": "u1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["id"].is_string());
        assert_eq!(created["title"], "first");

        let (status, listed) = send(&app, get("/publications")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn test_create_empty_publication_is_allowed() {
        let app = app();
        let (status, created) =
            send(&app, json_request(Method::POST, "/publications", json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.as_object().unwrap().len(), 1);
        assert!(created["id"].is_string());
    }

    #[tokio::test]
    async fn test_list_publications_by_user_filters() {
        let app = app();
        send(
            &app,
            json_request(Method::POST, "/publications", json!({"userId": "u1"})),
        )
        .await;
        send(
            &app,
            json_request(Method::POST, "/publications", json!({"userId": "u2"})),
        )
        .await;

        let (status, filtered) = send(&app, get("/publications/user?userId=u1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(filtered.as_array().unwrap().len(), 1);
        assert_eq!(filtered[0]["userId"], "u1");

        let (status, all) = send(&app, get("/publications/user")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let app = app();
        let (_, created) = send(
            &app,
            json_request(
                Method::POST,
                "/publications",
                json!({"title": "old", "userId": "u1"}),
            ),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/publications/{id}"),
                json!({"title": "new"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Publication updated successfully");

        let (_, listed) = send(&app, get("/publications")).await;
        assert_eq!(listed[0]["title"], "new");
        assert_eq!(listed[0]["userId"], "u1");
    }

    #[tokio::test]
    async fn test_update_missing_publication_is_404() {
        let app = app();
        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                "/publications/missing",
                json!({"title": "new"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Publication not found");
    }

    #[tokio::test]
    async fn test_delete_publication_is_idempotent() {
        let app = app();
        let (_, created) = send(
            &app,
            json_request(Method::POST, "/publications", json!({"title": "x"})),
        )
        .await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/publications/{id}");

        for _ in 0..2 {
            let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Publication deleted successfully");
        }

        let (_, listed) = send(&app, get("/publications")).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_comments_list_newest_first() {
        let app = app();
        for (text, created_at) in [("a", 100), ("b", 300), ("c", 200)] {
            let (status, comment) = send(
                &app,
                json_request(
                    Method::POST,
                    "/publications/p1/comments",
                    json!({"text": text, "createdAt": created_at}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert!(comment["id"].is_string());
        }

        let (status, listed) = send(&app, get("/publications/p1/comments")).await;
        assert_eq!(status, StatusCode::OK);
        let texts: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_comments_for_unknown_publication_are_empty() {
        let app = app();
        let (status, listed) = send(&app, get("/publications/ghost/comments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_like_lifecycle() {
        let app = app();

        let (status, body) = send(&app, get("/publications/p1/likes/count")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"count": 0}));

        // Re-liking overwrites the same document.
        for _ in 0..2 {
            let (status, body) = send(
                &app,
                json_request(
                    Method::POST,
                    "/publications/p1/likes",
                    json!({"userId": "u1"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "Like added successfully");
        }

        let (_, body) = send(&app, get("/publications/p1/likes/count")).await;
        assert_eq!(body, json!({"count": 1}));

        let (_, body) = send(&app, get("/publications/p1/likes/u1")).await;
        assert_eq!(body, json!({"hasLiked": true}));

        let (status, body) =
            send(&app, empty_request(Method::DELETE, "/publications/p1/likes/u1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Like removed successfully");

        let (_, body) = send(&app, get("/publications/p1/likes/u1")).await;
        assert_eq!(body, json!({"hasLiked": false}));
        let (_, body) = send(&app, get("/publications/p1/likes/count")).await;
        assert_eq!(body, json!({"count": 0}));

        // Removing an absent like still succeeds.
        let (status, _) =
            send(&app, empty_request(Method::DELETE, "/publications/p1/likes/u1")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signup_issues_token_and_rejects_duplicates() {
        let app = app();
        let credentials = json!({"email": "a@b.com", "password": "secret1"});

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/signup", credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User successfully created");
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["email"], "a@b.com");

        let (status, body) =
            send(&app, json_request(Method::POST, "/api/signup", credentials)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "An account with this email already exists");
    }

    #[tokio::test]
    async fn test_signup_and_login_require_both_fields() {
        let app = app();
        for uri in ["/api/signup", "/api/login"] {
            let (status, body) = send(
                &app,
                json_request(Method::POST, uri, json!({"email": "a@b.com"})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Missing required fields");
        }
    }

    #[tokio::test]
    async fn test_login_ignores_password_value() {
        let app = app();
        send(
            &app,
            json_request(
                Method::POST,
                "/api/signup",
                json!({"email": "a@b.com", "password": "secret1"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login",
                json!({"email": "a@b.com", "password": "wrong"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_401() {
        let app = app();
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login",
                json!({"email": "nobody@b.com", "password": "x"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_current_user_auth_matrix() {
        let app = app();

        let (status, body) = send(&app, get("/api/user")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized access");

        let (status, _) = send(&app, with_bearer(get("/api/user"), "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, signed_up) = send(
            &app,
            json_request(
                Method::POST,
                "/api/signup",
                json!({"email": "a@b.com", "password": "secret1"}),
            ),
        )
        .await;
        let token = signed_up["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, with_bearer(get("/api/user"), &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "a@b.com");
        assert_eq!(body["user"]["uid"], signed_up["user"]["uid"]);
    }

    #[tokio::test]
    async fn test_logout_revokes_outstanding_sessions() {
        let app = app();
        let (_, signed_up) = send(
            &app,
            json_request(
                Method::POST,
                "/api/signup",
                json!({"email": "a@b.com", "password": "secret1"}),
            ),
        )
        .await;
        let token = signed_up["token"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            with_bearer(empty_request(Method::POST, "/api/logout"), &token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");

        let (status, _) = send(&app, with_bearer(get("/api/user"), &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // A fresh login issues a working session again.
        let (_, logged_in) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login",
                json!({"email": "a@b.com", "password": "secret1"}),
            ),
        )
        .await;
        let token = logged_in["token"].as_str().unwrap().to_string();
        let (status, _) = send(&app, with_bearer(get("/api/user"), &token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
