use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{Post, Reply, Session, User};

// ========== Users ==========

/// Create a new user. The UNIQUE constraints on username and email make
/// this fail on collision; callers map that to their duplicate error.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO users (username, email, password_hash)
        VALUES (?, ?, ?)
        ",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

/// Get a user by username.
pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Get a user holding either the given username or the given email.
/// Used for the signup collision check.
pub async fn find_user_by_username_or_email(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ? OR email = ?")
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username or email")
}

/// Get a user by id.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by id")
}

// ========== Posts ==========

/// Insert a new post.
pub async fn insert_post(pool: &SqlitePool, content: &str, user_id: Option<i64>) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO posts (content, user_id)
        VALUES (?, ?)
        ",
    )
    .bind(content)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(result.last_insert_rowid())
}

/// Get a post by id.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// List all posts in creation order.
pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<Post>> {
    sqlx::query_as("SELECT * FROM posts ORDER BY id ASC")
        .fetch_all(pool)
        .await
        .context("Failed to list posts")
}

// ========== Replies ==========

/// Insert a new reply to an existing post.
pub async fn insert_reply(
    pool: &SqlitePool,
    post_id: i64,
    content: &str,
    user_id: Option<i64>,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO replies (post_id, content, user_id)
        VALUES (?, ?, ?)
        ",
    )
    .bind(post_id)
    .bind(content)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to insert reply")?;

    Ok(result.last_insert_rowid())
}

/// Get a reply by id.
pub async fn get_reply(pool: &SqlitePool, id: i64) -> Result<Option<Reply>> {
    sqlx::query_as("SELECT * FROM replies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch reply")
}

/// List the replies to a post in creation order.
pub async fn list_replies_for_post(pool: &SqlitePool, post_id: i64) -> Result<Vec<Reply>> {
    sqlx::query_as("SELECT * FROM replies WHERE post_id = ? ORDER BY id ASC")
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list replies")
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES (?, ?, ?)
        ",
    )
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(result.last_insert_rowid())
}

/// Get a session by token.
pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session by token")
}

/// Delete a session. Deleting an absent token is a no-op, so logout stays
/// idempotent.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(())
}

/// Delete all sessions for a user.
pub async fn delete_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete user sessions")?;
    Ok(())
}
