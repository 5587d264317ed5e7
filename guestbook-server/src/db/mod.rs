//! Database layer - connection pool, schema, and visitor storage
//!
//! The pool connects lazily: creating it never touches the network, so a
//! missing database only shows up as failed queries.

pub mod pool;
pub mod schema;
pub mod visitors;

#[cfg(test)]
pub(crate) mod memory;

pub use pool::init_pool;
pub use schema::ensure_schema;
pub use visitors::{PgVisitorStore, Visitor, VisitorStore};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("database unavailable: {0}")]
    Unavailable(String),
}
