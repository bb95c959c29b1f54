//! Collaborator interfaces over the forum's user and post data.
//!
//! The pipeline only sees these traits; the Postgres implementations below
//! are what the service wires in. Tests substitute in-memory fakes.

use async_trait::async_trait;
use sqlx::PgPool;

use herald_common::error::AppError;

/// User-profile collaborator: language settings and the linked Telegram id.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user's stored language preference, if any.
    async fn language(&self, uid: i64) -> Result<Option<String>, AppError>;

    /// The user's linked Telegram chat id, if they registered one.
    async fn telegram_id(&self, uid: i64) -> Result<Option<i64>, AppError>;

    /// Set or clear the user's linked Telegram chat id.
    async fn set_telegram_id(&self, uid: i64, telegram_id: Option<i64>) -> Result<(), AppError>;

    /// Total number of registered users, used to size the language cache.
    async fn total_users(&self) -> Result<i64, AppError>;
}

/// Post/topic collaborator: the data a permalink is composed from.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Slug of the topic containing `pid`.
    async fn topic_slug(&self, pid: i64) -> Result<String, AppError>;

    /// 1-based position of `pid` within its topic. The contract allows a
    /// recipient-relative index; this deployment sorts uniformly.
    async fn post_index(&self, pid: i64, uid: i64) -> Result<i64, AppError>;
}

/// `UserStore` over the forum's `users` and `user_settings` tables.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn language(&self, uid: i64) -> Result<Option<String>, AppError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT language FROM user_settings WHERE uid = $1")
                .bind(uid)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(language,)| language))
    }

    async fn telegram_id(&self, uid: i64) -> Result<Option<i64>, AppError> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT telegram_id FROM users WHERE uid = $1")
                .bind(uid)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(telegram_id,)| telegram_id))
    }

    async fn set_telegram_id(&self, uid: i64, telegram_id: Option<i64>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET telegram_id = $1 WHERE uid = $2")
            .bind(telegram_id)
            .bind(uid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", uid)));
        }

        tracing::info!(uid, linked = telegram_id.is_some(), "Telegram id updated");
        Ok(())
    }

    async fn total_users(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// `PostStore` over the forum's `posts` and `topics` tables.
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn topic_slug(&self, pid: i64) -> Result<String, AppError> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT t.slug
            FROM topics t
            JOIN posts p ON p.tid = t.tid
            WHERE p.pid = $1
            "#,
        )
        .bind(pid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(slug,)| slug)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", pid)))
    }

    async fn post_index(&self, pid: i64, _uid: i64) -> Result<i64, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM posts p
            JOIN posts target ON target.pid = $1
            WHERE p.tid = target.tid
              AND p.pid <= target.pid
            "#,
        )
        .bind(pid)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((index,)) if index > 0 => Ok(index),
            _ => Err(AppError::NotFound(format!("Post {} not found", pid))),
        }
    }
}
