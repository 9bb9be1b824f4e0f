//! Session and account handlers: login, logout, signup, dashboard.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::auth::{extract_session_token, generate_session_token, verify_password, MaybeUser, RequireUser};
use crate::db as queries;
use crate::forum::ForumError;
use crate::web::{pages, AppState};

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// GET /login - Show login form.
pub async fn login_page(MaybeUser(user): MaybeUser) -> Response {
    // Already logged in: straight to the dashboard.
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    Html(pages::login_page(None).into_string()).into_response()
}

/// POST /login - Verify credentials and establish a session.
///
/// A failed login renders the dedicated failure view rather than a
/// machine-readable 401.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if form.username.is_empty() || form.password.is_empty() {
        return login_failure();
    }

    let user = match queries::find_user_by_username(state.db.pool(), &form.username).await {
        Ok(Some(u)) => u,
        Ok(None) => return login_failure(),
        Err(e) => {
            tracing::error!("Database error during login: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    let password_valid = match verify_password(&form.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification error: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    if !password_valid {
        return login_failure();
    }

    let session_token = generate_session_token();
    let ttl = state.config.session_ttl_secs;
    let expires_at = (Utc::now() + Duration::seconds(ttl)).to_rfc3339();

    if let Err(e) =
        queries::create_session(state.db.pool(), user.id, &session_token, &expires_at).await
    {
        tracing::error!("Failed to create session: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
    }

    tracing::info!(user_id = user.id, "User logged in");

    let cookie = format!("session={session_token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={ttl}");

    ([(header::SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response()
}

fn login_failure() -> Response {
    Html(pages::login_page(Some("Invalid username or password")).into_string()).into_response()
}

/// GET /logout - Tear down the presented session.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    RequireUser(user): RequireUser,
) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(e) = queries::delete_session(state.db.pool(), token).await {
            tracing::error!("Failed to delete session: {e}");
        }
    }

    tracing::info!(user_id = user.id, "User logged out");

    let cookie = "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0";

    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

/// GET /dashboard - Authenticated landing page.
pub async fn dashboard(RequireUser(user): RequireUser) -> Response {
    Html(pages::dashboard_page(&user).into_string()).into_response()
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// GET /signup - Show signup form.
pub async fn signup_page(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    Html(pages::signup_page(None).into_string()).into_response()
}

/// POST /signup - Create a new account.
pub async fn signup_post(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    if form.username.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Html(
            pages::signup_page(Some("Username, email and password are required")).into_string(),
        )
        .into_response();
    }

    match state
        .forum
        .register_user(form.username.trim(), form.email.trim(), &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, "New user registered");
            Redirect::to("/signup_success").into_response()
        }
        Err(ForumError::Duplicate) => "Username or email already exists!".into_response(),
        Err(e) => {
            tracing::error!("Failed to register user: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Signup failed").into_response()
        }
    }
}

/// GET /signup_success - Confirmation with a login link.
pub async fn signup_success() -> Response {
    Html(r#"Sign up complete, proceed to login from here <a href="/login">Log in</a>"#)
        .into_response()
}
