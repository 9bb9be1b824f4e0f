use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Json};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use super::{auth, pages, AppState};
use crate::auth::MaybeUser;
use crate::db::User;
use crate::forum::ForumError;
use crate::rates::RatesError;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(auth::login_page).post(auth::login_post))
        .route("/dashboard", get(auth::dashboard))
        .route("/logout", get(auth::logout))
        .route("/signup", get(auth::signup_page).post(auth::signup_post))
        .route("/signup_success", get(auth::signup_success))
        .route("/exchange_rates", get(exchange_rates))
        .route("/search", get(search_rate))
        .route("/forum_post", get(forum_posts).post(create_post))
        .route("/reply/:post_id", get(reply_form).post(submit_reply))
        .route("/post/:post_id", get(post_detail))
        .route("/healthz", get(health))
        .route("/favicon.ico", get(favicon))
}

// ========== Forum Routes ==========

/// Resolve the acting identity for posting under the configured policy.
/// With `require_auth_for_posting` set, anonymous callers are redirected to
/// the login page.
fn acting_user(state: &AppState, user: Option<User>) -> Result<Option<User>, Response> {
    if state.config.require_auth_for_posting && user.is_none() {
        return Err(Redirect::to("/login").into_response());
    }
    Ok(user)
}

async fn home(MaybeUser(user): MaybeUser) -> Response {
    Html(pages::home_page(user.as_ref()).into_string()).into_response()
}

async fn forum_posts(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    let user = match acting_user(&state, user) {
        Ok(u) => u,
        Err(redirect) => return redirect,
    };

    match state.forum.list_posts().await {
        Ok(posts) => {
            Html(pages::posts_page(user.as_ref(), &posts, None).into_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list posts: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    post_content: String,
}

async fn create_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<PostForm>,
) -> Response {
    let user = match acting_user(&state, user) {
        Ok(u) => u,
        Err(redirect) => return redirect,
    };

    match state.forum.create_post(user.as_ref(), &form.post_content).await {
        Ok(post) => Redirect::to(&format!("/post/{}", post.id)).into_response(),
        Err(ForumError::EmptyContent) => {
            let posts = match state.forum.list_posts().await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!("Failed to list posts: {e}");
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
                }
            };
            Html(
                pages::posts_page(user.as_ref(), &posts, Some("Post content is required"))
                    .into_string(),
            )
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create post: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn reply_form(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    MaybeUser(user): MaybeUser,
) -> Response {
    let user = match acting_user(&state, user) {
        Ok(u) => u,
        Err(redirect) => return redirect,
    };

    match state.forum.view_post(post_id).await {
        Ok((post, _)) => {
            Html(pages::reply_page(user.as_ref(), &post, None).into_string()).into_response()
        }
        Err(ForumError::PostNotFound(_)) => post_not_found(),
        Err(e) => {
            tracing::error!("Failed to fetch post: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    reply_content: String,
}

async fn submit_reply(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<ReplyForm>,
) -> Response {
    let user = match acting_user(&state, user) {
        Ok(u) => u,
        Err(redirect) => return redirect,
    };

    match state
        .forum
        .reply_to_post(user.as_ref(), post_id, &form.reply_content)
        .await
    {
        Ok(reply) => Redirect::to(&format!("/post/{}", reply.post_id)).into_response(),
        Err(ForumError::PostNotFound(_)) => post_not_found(),
        Err(ForumError::EmptyContent) => match state.forum.view_post(post_id).await {
            Ok((post, _)) => Html(
                pages::reply_page(user.as_ref(), &post, Some("Reply content is required"))
                    .into_string(),
            )
            .into_response(),
            Err(_) => post_not_found(),
        },
        Err(e) => {
            tracing::error!("Failed to create reply: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    MaybeUser(user): MaybeUser,
) -> Response {
    match state.forum.view_post(post_id).await {
        Ok((post, replies)) => {
            Html(pages::post_page(user.as_ref(), &post, &replies).into_string()).into_response()
        }
        Err(ForumError::PostNotFound(_)) => post_not_found(),
        Err(e) => {
            tracing::error!("Failed to fetch post: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

fn post_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found_page("Post not found").into_string()),
    )
        .into_response()
}

// ========== Exchange Rate Routes ==========

async fn exchange_rates(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    match state.rates.fetch_rates().await {
        Ok(rates) => Html(pages::rates_page(user.as_ref(), &rates).into_string()).into_response(),
        Err(e) => rates_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct RateSearchParams {
    currency_code: Option<String>,
}

async fn search_rate(
    State(state): State<AppState>,
    Query(params): Query<RateSearchParams>,
) -> Response {
    // Reject before touching the upstream feed.
    let Some(code) = params.currency_code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Currency code parameter is required" })),
        )
            .into_response();
    };

    match state.rates.search_rate(&code).await {
        Ok((code, rate)) => {
            let mut body = serde_json::Map::new();
            body.insert(code, rate.into());
            Json(serde_json::Value::Object(body)).into_response()
        }
        Err(e) => rates_error_response(e),
    }
}

/// Map gateway failures to the JSON error surface: 404 for missing data,
/// upstream status passthrough, 500 with the message on transport errors.
fn rates_error_response(err: RatesError) -> Response {
    match err {
        RatesError::Upstream(status) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({ "error": "Failed to fetch exchange rates" })),
        )
            .into_response(),
        RatesError::NoData => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No exchange rates data found" })),
        )
            .into_response(),
        RatesError::UnknownCurrency => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Exchange rate not found for the specified currency code" })),
        )
            .into_response(),
        RatesError::Transport(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response(),
    }
}

// ========== Service Routes ==========

async fn health() -> &'static str {
    "OK"
}

async fn favicon() -> Response {
    // Return a simple SVG favicon (speech balloon emoji)
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><text y=".9em" font-size="90">💬</text></svg>"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response()
}
