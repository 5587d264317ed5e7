//! Visitor repository
//!
//! - list: every entry, newest `created_at` first
//! - insert: single statement, id and timestamp assigned by PostgreSQL

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};

use super::DbError;

/// Guestbook entry as stored in `visitors`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Visitor {
    pub id: i32,
    pub name: String,
    pub message: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Storage operations the request handlers need.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// All entries ordered by `created_at` descending
    async fn list_recent(&self) -> Result<Vec<Visitor>, DbError>;

    /// Insert one entry
    async fn insert(&self, name: &str, message: Option<&str>) -> Result<(), DbError>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgVisitorStore {
    pool: PgPool,
}

impl PgVisitorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorStore for PgVisitorStore {
    async fn list_recent(&self) -> Result<Vec<Visitor>, DbError> {
        let rows = sqlx::query_as::<_, Visitor>(
            r#"
            SELECT id, name, message, created_at
            FROM visitors
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, name: &str, message: Option<&str>) -> Result<(), DbError> {
        sqlx::query("INSERT INTO visitors (name, message) VALUES ($1, $2)")
            .bind(name)
            .bind(message)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p guestbook-server -- --ignored

    async fn store() -> PgVisitorStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("pool creation failed");
        ensure_schema(&pool).await.expect("schema failed");
        PgVisitorStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn inserted_entry_is_listed_first() {
        let store = store().await;
        store.insert("Ann", Some("hi")).await.expect("insert failed");

        let visitors = store.list_recent().await.expect("list failed");
        let first = visitors.first().expect("no rows");
        assert_eq!(first.name, "Ann");
        assert_eq!(first.message.as_deref(), Some("hi"));
        assert!(first.created_at.is_some());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn oversized_name_is_rejected() {
        let store = store().await;
        let name = "x".repeat(101);
        assert!(matches!(
            store.insert(&name, None).await,
            Err(DbError::Sqlx(_))
        ));
    }
}
