//! Integration tests for the web routes, driven through the real router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use starling_forum::config::Config;
use starling_forum::db::Database;
use starling_forum::web::{create_app, AppState};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

// Placeholder feed address for tests that never touch the rate routes.
const UNUSED_FEED: &str = "http://127.0.0.1:9/latest/USD";

struct TestApp {
    app: Router,
    _tmp: TempDir,
}

async fn spawn_app(require_auth: bool, feed_url: &str) -> TestApp {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");

    let config = Config {
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
        database_path: db_path,
        session_ttl_secs: 3600,
        require_auth_for_posting: require_auth,
        exchange_rate_url: feed_url.to_string(),
        exchange_rate_api_key: None,
    };

    TestApp {
        app: create_app(AppState::new(config, db)),
        _tmp: tmp,
    }
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("No Location header")
        .to_str()
        .unwrap()
}

/// Pull `session=<token>` out of a login response's Set-Cookie header.
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("No Set-Cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Sign up and log in `alice`, returning her session cookie.
async fn login_alice(app: &Router) -> String {
    let response = post_form(
        app,
        "/signup",
        "username=alice&email=a%40x.com&password=pw1",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_form(app, "/login", "username=alice&password=pw1", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    session_cookie(&response)
}

// ========== Public pages ==========

#[tokio::test]
async fn test_home_page() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = get(&t.app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Starling Forum"));
}

#[tokio::test]
async fn test_health() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = get(&t.app, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

// ========== Signup ==========

#[tokio::test]
async fn test_signup_success_redirects() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = post_form(
        &t.app,
        "/signup",
        "username=alice&email=a%40x.com&password=pw1",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/signup_success");

    let response = get(&t.app, "/signup_success").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Sign up complete"));
}

#[tokio::test]
async fn test_signup_duplicate_is_plain_text() {
    let t = spawn_app(true, UNUSED_FEED).await;

    post_form(
        &t.app,
        "/signup",
        "username=alice&email=a%40x.com&password=pw1",
        None,
    )
    .await;

    // Same username, fresh email
    let response = post_form(
        &t.app,
        "/signup",
        "username=alice&email=b%40x.com&password=pw2",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Username or email already exists!"
    );

    // Fresh username, same email
    let response = post_form(
        &t.app,
        "/signup",
        "username=bob&email=a%40x.com&password=pw2",
        None,
    )
    .await;
    assert_eq!(
        body_string(response).await,
        "Username or email already exists!"
    );
}

// ========== Login / logout ==========

#[tokio::test]
async fn test_login_establishes_session() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let cookie = login_alice(&t.app).await;
    assert!(cookie.starts_with("session="));

    let response = get_with_cookie(&t.app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("alice"));
}

#[tokio::test]
async fn test_login_failure_renders_failure_view() {
    let t = spawn_app(true, UNUSED_FEED).await;

    post_form(
        &t.app,
        "/signup",
        "username=alice&email=a%40x.com&password=pw1",
        None,
    )
    .await;

    let response = post_form(&t.app, "/login", "username=alice&password=wrong", None).await;
    // Dedicated failure page, not a 401
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_string(response)
        .await
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn test_login_unknown_user_renders_failure_view() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = post_form(&t.app, "/login", "username=ghost&password=pw1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains("Invalid username or password"));
}

#[tokio::test]
async fn test_dashboard_requires_session() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = get(&t.app, "/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let t = spawn_app(true, UNUSED_FEED).await;
    let cookie = login_alice(&t.app).await;

    let response = get_with_cookie(&t.app, "/logout", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The old cookie no longer resolves to a session
    let response = get_with_cookie(&t.app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

// ========== Forum ==========

#[tokio::test]
async fn test_posting_requires_auth_by_default() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = get(&t.app, "/forum_post").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = post_form(&t.app, "/forum_post", "post_content=hello", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_anonymous_posting_when_configured_public() {
    let t = spawn_app(false, UNUSED_FEED).await;

    let response = post_form(&t.app, "/forum_post", "post_content=hello", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/post/1");

    let response = get(&t.app, "/post/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("hello"));
}

#[tokio::test]
async fn test_full_forum_flow() {
    let t = spawn_app(true, UNUSED_FEED).await;
    let cookie = login_alice(&t.app).await;

    let response = post_form(&t.app, "/forum_post", "post_content=hello", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/post/1");

    let response = get_with_cookie(&t.app, "/forum_post", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("hello"));

    let response = post_form(&t.app, "/reply/1", "reply_content=hi", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/post/1");

    let response = get(&t.app, "/post/1").await;
    let body = body_string(response).await;
    assert!(body.contains("hello"));
    assert!(body.contains("hi"));
}

#[tokio::test]
async fn test_reply_to_missing_post_is_404() {
    let t = spawn_app(true, UNUSED_FEED).await;
    let cookie = login_alice(&t.app).await;

    let response = post_form(&t.app, "/reply/99", "reply_content=hi", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Post not found"));
}

#[tokio::test]
async fn test_missing_post_detail_is_404() {
    let t = spawn_app(true, UNUSED_FEED).await;

    let response = get(&t.app, "/post/99").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Post not found"));
}

#[tokio::test]
async fn test_empty_post_content_rerenders_with_error() {
    let t = spawn_app(true, UNUSED_FEED).await;
    let cookie = login_alice(&t.app).await;

    let response = post_form(&t.app, "/forum_post", "post_content=", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response)
        .await
        .contains("Post content is required"));
}

// ========== Exchange rates ==========

#[tokio::test]
async fn test_search_missing_param_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let t = spawn_app(true, &server.uri()).await;

    let response = get(&t.app, "/search").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Currency code parameter is required"));

    server.verify().await;
}

#[tokio::test]
async fn test_search_is_case_insensitive_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": { "EUR": 0.92, "USD": 1.0 }
        })))
        .mount(&server)
        .await;

    let t = spawn_app(true, &server.uri()).await;

    let lower = body_string(get(&t.app, "/search?currency_code=eur").await).await;
    let upper = body_string(get(&t.app, "/search?currency_code=EUR").await).await;
    assert_eq!(lower, upper);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&lower).unwrap(),
        json!({ "EUR": 0.92 })
    );
}

#[tokio::test]
async fn test_search_unknown_code_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": { "USD": 1.0 }
        })))
        .mount(&server)
        .await;

    let t = spawn_app(true, &server.uri()).await;

    let response = get(&t.app, "/search?currency_code=XYZ").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response)
        .await
        .contains("Exchange rate not found for the specified currency code"));
}

#[tokio::test]
async fn test_exchange_rates_upstream_status_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let t = spawn_app(true, &server.uri()).await;

    let response = get(&t.app, "/exchange_rates").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response)
        .await
        .contains("Failed to fetch exchange rates"));
}

#[tokio::test]
async fn test_exchange_rates_renders_sorted_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": { "USD": 1.0, "AUD": 1.52, "EUR": 0.92 }
        })))
        .mount(&server)
        .await;

    let t = spawn_app(true, &server.uri()).await;

    let response = get(&t.app, "/exchange_rates").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    // Sorted by currency code
    let aud = body.find("AUD").unwrap();
    let eur = body.find("EUR").unwrap();
    let usd = body.find("USD").unwrap();
    assert!(aud < eur && eur < usd);
}
