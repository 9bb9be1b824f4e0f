//! Integration tests for the authentication pieces: password store and
//! session resolution through the middleware.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use starling_forum::auth::{generate_session_token, hash_password, verify_password};
use starling_forum::config::Config;
use starling_forum::db::{create_session, create_user, get_session_by_token, Database};
use starling_forum::web::{create_app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

#[tokio::test]
async fn test_password_roundtrip() {
    let password = "pw1";
    let hash = hash_password(password).expect("Failed to hash password");

    assert!(verify_password(password, &hash).expect("Failed to verify password"));
    assert!(!verify_password("pw2", &hash).expect("Failed to verify password"));
}

#[tokio::test]
async fn test_session_tokens_are_unique() {
    let token1 = generate_session_token();
    let token2 = generate_session_token();

    assert_eq!(token1.len(), 64);
    assert_ne!(token1, token2);
}

fn test_config(db_path: std::path::PathBuf) -> Config {
    Config {
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        database_path: db_path,
        session_ttl_secs: 3600,
        require_auth_for_posting: true,
        exchange_rate_url: "http://127.0.0.1:9/latest/USD".to_string(),
        exchange_rate_api_key: None,
    }
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_deleted() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");

    let user_id = create_user(db.pool(), "alice", "a@x.com", "hash1")
        .await
        .expect("Failed to create user");
    create_session(db.pool(), user_id, "stale", "2000-01-01T00:00:00+00:00")
        .await
        .expect("Failed to create session");

    let app = create_app(AppState::new(test_config(db_path), db.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, "session=stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Treated as unauthenticated
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );

    // The stale session row was removed on sight
    assert!(get_session_by_token(db.pool(), "stale")
        .await
        .expect("Query failed")
        .is_none());
}

#[tokio::test]
async fn test_garbage_session_token_is_ignored() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");

    let app = create_app(AppState::new(test_config(db_path), db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, "session=never-issued")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}
