//! Router-level auth checks
//!
//! The Mongo client connects lazily, so the router can be exercised
//! without a database as long as requests are rejected before any query.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chat_server::config::Config;
use chat_server::directory::UserDirectory;
use chat_server::media::MediaStore;
use chat_server::notify::LogNotifier;
use chat_server::store::ChatStore;
use chat_server::{app, AppState};
use std::sync::Arc;
use tempfile::tempdir;
use tower::util::ServiceExt;

async fn test_state(media_dir: &std::path::Path) -> AppState {
    let config = Config {
        mongo_uri: "mongodb://127.0.0.1:27017".to_string(),
        mongo_db: "chat-service-test".to_string(),
        jwt_secret: "test-secret".to_string(),
        user_service: "http://127.0.0.1:1".to_string(),
        port: 0,
        media_dir: media_dir.to_path_buf(),
        public_base_url: "http://localhost:5002".to_string(),
    };

    let store = ChatStore::connect(&config.mongo_uri, &config.mongo_db)
        .await
        .unwrap();

    AppState {
        directory: Arc::new(UserDirectory::new(config.user_service.clone())),
        media: Arc::new(MediaStore::new(
            config.media_dir.clone(),
            config.public_base_url.clone(),
        )),
        store: Arc::new(store),
        notifier: Arc::new(LogNotifier),
        config: Arc::new(config),
    }
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_is_open() {
    let dir = tempdir().unwrap();
    let app = app(test_state(dir.path()).await);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let dir = tempdir().unwrap();
    let app = app(test_state(dir.path()).await);

    for uri in ["/api/v1/chat/all", "/api/v1/message/abc"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_wrong_scheme_is_rejected() {
    let dir = tempdir().unwrap();
    let app = app(test_state(dir.path()).await);

    let response = app
        .oneshot(get("/api/v1/chat/all", Some("Basic dXNlcjpwdw==")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let dir = tempdir().unwrap();
    let app = app(test_state(dir.path()).await);

    let response = app
        .oneshot(get("/api/v1/chat/all", Some("Bearer not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_media_is_not_found() {
    let dir = tempdir().unwrap();
    let app = app(test_state(dir.path()).await);

    let response = app
        .oneshot(get("/media/nope.png", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
