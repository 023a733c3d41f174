//! HTTP front end for [`UserStore`].
//!
//! Handlers decode at most one request body and encode at most one response.
//! `POST` and `PUT` do both. The codec keeps no state between calls. TOON
//! routes live under `/users`, JSON routes with the same behavior under
//! `/json/users`.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `GET` | `/users` | 200, all users as a tabular list |
//! | `POST` | `/users` | 201, the created user |
//! | `GET` | `/users/{id}` | 200 |
//! | `PUT` | `/users/{id}` | 200, the updated user |
//! | `DELETE` | `/users/{id}` | 204 |
//!
//! Undecodable bodies and non-numeric ids are answered with 400, unknown ids
//! with 404, other methods with 405 and encode failures with 500.

use crate::store::{User, UserStore};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
struct AppState {
    store: Arc<UserStore>,
}

/// Builds the router over `store`.
pub fn router(store: Arc<UserStore>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/json/users", get(list_users_json).post(create_user_json))
        .route(
            "/json/users/{id}",
            get(get_user_json).put(update_user_json).delete(delete_user),
        )
        .with_state(AppState { store })
}

/// Serves the router on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, store: Arc<UserStore>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn toon<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match crate::to_string(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, crate::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode TOON response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error encoding TOON: {e}"),
            )
                .into_response()
        }
    }
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode JSON response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error encoding JSON: {e}"),
            )
                .into_response()
        }
    }
}

fn bad_request(msg: String) -> Response {
    tracing::debug!(%msg, "rejecting request");
    (StatusCode::BAD_REQUEST, msg).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "User not found").into_response()
}

fn parse_id(raw: &str) -> Result<i64, Response> {
    raw.parse()
        .map_err(|_| bad_request(format!("Invalid user ID: {raw}")))
}

fn decode_toon(body: &[u8]) -> Result<User, Response> {
    crate::from_slice(body).map_err(|e| bad_request(format!("Invalid TOON data: {e}")))
}

fn decode_json(body: &[u8]) -> Result<User, Response> {
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid JSON data: {e}")))
}

async fn list_users(State(state): State<AppState>) -> Response {
    toon(StatusCode::OK, &state.store.get_all())
}

async fn create_user(State(state): State<AppState>, body: Bytes) -> Response {
    match decode_toon(&body) {
        Ok(user) => {
            let user = state.store.create(user);
            tracing::info!(id = user.id, "user created");
            toon(StatusCode::CREATED, &user)
        }
        Err(response) => response,
    }
}

async fn get_user(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.store.get(id) {
        Some(user) => toon(StatusCode::OK, &user),
        None => not_found(),
    }
}

async fn update_user(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let user = match decode_toon(&body) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.store.update(id, user) {
        Some(user) => {
            tracing::info!(id, "user updated");
            toon(StatusCode::OK, &user)
        }
        None => not_found(),
    }
}

async fn delete_user(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if state.store.delete(id) {
        tracing::info!(id, "user deleted");
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

async fn list_users_json(State(state): State<AppState>) -> Response {
    json(StatusCode::OK, &state.store.get_all())
}

async fn create_user_json(State(state): State<AppState>, body: Bytes) -> Response {
    match decode_json(&body) {
        Ok(user) => {
            let user = state.store.create(user);
            tracing::info!(id = user.id, "user created");
            json(StatusCode::CREATED, &user)
        }
        Err(response) => response,
    }
}

async fn get_user_json(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.store.get(id) {
        Some(user) => json(StatusCode::OK, &user),
        None => not_found(),
    }
}

async fn update_user_json(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let user = match decode_json(&body) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.store.update(id, user) {
        Some(user) => {
            tracing::info!(id, "user updated");
            json(StatusCode::OK, &user)
        }
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(UserStore::seeded()))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_is_tabular_toon() {
        let req = Request::builder().uri("/users").body(Body::empty()).unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            crate::CONTENT_TYPE
        );
        let body = body_text(resp).await;
        assert!(body.starts_with("[2 id name email createdAt]\n1,Alice,alice@example.com,\""));
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let req = Request::builder()
            .uri("/users/abc")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "Invalid user ID: abc");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let req = Request::builder()
            .method("DELETE")
            .uri("/users/42")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(resp).await, "User not found");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/users")
            .body(Body::from("id: abc"))
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.starts_with("Invalid TOON data: "));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let req = Request::builder()
            .method("PATCH")
            .uri("/users")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
