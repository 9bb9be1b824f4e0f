//! Forum service: signup, posts, and replies over the relational store.
//!
//! Handlers pass the acting identity in explicitly; nothing here reads
//! ambient request state.

use thiserror::Error;

use crate::auth::hash_password;
use crate::db::{self, Database, Post, Reply, User};

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("username or email already exists")]
    Duplicate,
    #[error("post {0} not found")]
    PostNotFound(i64),
    #[error("content must not be empty")]
    EmptyContent,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Orchestrates user, post, and reply operations.
#[derive(Debug, Clone)]
pub struct ForumService {
    db: Database,
}

impl ForumService {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new user, hashing the password before storage.
    ///
    /// # Errors
    ///
    /// `Duplicate` if the username or email is already taken.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ForumError> {
        let pool = self.db.pool();

        if db::find_user_by_username_or_email(pool, username, email)
            .await?
            .is_some()
        {
            return Err(ForumError::Duplicate);
        }

        let password_hash = hash_password(password)?;

        // A concurrent signup can still win the race between the check and
        // the insert; the UNIQUE constraints report it here.
        let id = match db::create_user(pool, username, email, &password_hash).await {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Err(ForumError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        db::get_user_by_id(pool, id)
            .await?
            .ok_or_else(|| ForumError::Storage(anyhow::anyhow!("created user {id} not found")))
    }

    /// Create a new post, optionally attributed to `author`.
    ///
    /// # Errors
    ///
    /// `EmptyContent` if `content` is blank.
    pub async fn create_post(
        &self,
        author: Option<&User>,
        content: &str,
    ) -> Result<Post, ForumError> {
        let content = non_empty(content)?;
        let pool = self.db.pool();

        let id = db::insert_post(pool, content, author.map(|u| u.id)).await?;
        db::get_post(pool, id)
            .await?
            .ok_or_else(|| ForumError::Storage(anyhow::anyhow!("created post {id} not found")))
    }

    /// Reply to an existing post.
    ///
    /// # Errors
    ///
    /// `PostNotFound` if the parent post does not exist, `EmptyContent` if
    /// `content` is blank.
    pub async fn reply_to_post(
        &self,
        author: Option<&User>,
        post_id: i64,
        content: &str,
    ) -> Result<Reply, ForumError> {
        let content = non_empty(content)?;
        let pool = self.db.pool();

        let post = db::get_post(pool, post_id)
            .await?
            .ok_or(ForumError::PostNotFound(post_id))?;

        let id = db::insert_reply(pool, post.id, content, author.map(|u| u.id)).await?;
        db::get_reply(pool, id)
            .await?
            .ok_or_else(|| ForumError::Storage(anyhow::anyhow!("created reply {id} not found")))
    }

    /// Fetch a post together with its replies in creation order.
    ///
    /// # Errors
    ///
    /// `PostNotFound` if the post does not exist.
    pub async fn view_post(&self, post_id: i64) -> Result<(Post, Vec<Reply>), ForumError> {
        let pool = self.db.pool();

        let post = db::get_post(pool, post_id)
            .await?
            .ok_or(ForumError::PostNotFound(post_id))?;
        let replies = db::list_replies_for_post(pool, post_id).await?;

        Ok((post, replies))
    }

    /// List all posts in creation order.
    ///
    /// A storage failure is surfaced to the caller; an unreachable store is
    /// never reported as an empty forum.
    ///
    /// # Errors
    ///
    /// `Storage` if the underlying store is unavailable.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ForumError> {
        Ok(db::list_posts(self.db.pool()).await?)
    }
}

fn non_empty(content: &str) -> Result<&str, ForumError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ForumError::EmptyContent);
    }
    Ok(trimmed)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(sqlx::Error::as_database_error)
            .is_some_and(|db_err| db_err.is_unique_violation())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  hello ").unwrap(), "hello");
        assert!(matches!(non_empty("   "), Err(ForumError::EmptyContent)));
        assert!(matches!(non_empty(""), Err(ForumError::EmptyContent)));
    }
}
