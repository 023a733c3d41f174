#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use toon_codec::server::router;
use toon_codec::store::{User, UserStore};
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(UserStore::seeded()))
}

async fn send(app: &Router, method: &str, uri: &str, body: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_toon_crud_round_trip() {
    let app = app();

    let resp = send(&app, "GET", "/users", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Alice");
    assert_eq!(users[1].email, "bob@example.com");

    let resp = send(&app, "POST", "/users", "name: Carol\nemail: carol@example.com").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/toon");
    let carol: User = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(carol.id, 3);
    assert_eq!(carol.name, "Carol");

    let resp = send(&app, "PUT", "/users/3", "name: \"Carol Ann\"\nemail: carol@example.com").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: User = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(updated.name, "Carol Ann");
    assert_eq!(updated.created_at, carol.created_at);

    let resp = send(&app, "GET", "/users/3", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(fetched, updated);

    let resp = send(&app, "DELETE", "/users/3", "").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, "GET", "/users/3", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_crud_round_trip() {
    let app = app();

    let resp = send(&app, "GET", "/json/users", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let users: Vec<serde_json::Value> = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "Alice");
    assert!(users[0]["createdAt"].is_string());

    let resp = send(
        &app,
        "POST",
        "/json/users",
        r#"{"name":"Dave","email":"dave@example.com"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let dave: User = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(dave.id, 3);

    let resp = send(
        &app,
        "PUT",
        "/json/users/3",
        r#"{"name":"David","email":"dave@example.com"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let david: User = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(david.name, "David");

    let resp = send(&app, "DELETE", "/json/users/3", "").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_formats_share_one_store() {
    let app = app();

    let resp = send(&app, "POST", "/users", "name: Erin\nemail: erin@example.com").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, "GET", "/json/users/3", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let erin: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(erin["name"], "Erin");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();

    let resp = send(&app, "GET", "/users/zero", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, "PUT", "/users/99", "name: Nobody").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, "PUT", "/users/1", "createdAt: yesterday").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.starts_with("Invalid TOON data: "));

    let resp = send(&app, "POST", "/json/users", "{not json").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.starts_with("Invalid JSON data: "));

    let resp = send(&app, "PATCH", "/users/1", "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    // nothing above changed the store
    let resp = send(&app, "GET", "/users", "").await;
    let users: Vec<User> = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Alice");
}

#[tokio::test]
async fn test_concurrent_creates() {
    let app = app();
    let mut handles = Vec::new();
    for n in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!("name: user{n}\nemail: user{n}@example.com");
            send(&app, "POST", "/users", &body).await.status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let resp = send(&app, "GET", "/users", "").await;
    let users: Vec<User> = toon_codec::from_str(&body_text(resp).await).unwrap();
    assert_eq!(users.len(), 18);
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, (1..=18).collect::<Vec<_>>());
}
