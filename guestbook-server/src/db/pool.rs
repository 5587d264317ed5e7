//! Database connection pool management

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Create a PostgreSQL connection pool bound to `config`.
///
/// No connection is opened here; credentials are checked by the driver on
/// first use.
pub fn init_pool(config: &DatabaseConfig) -> PgPool {
    init_pool_with_options(config, DEFAULT_MAX_CONNECTIONS)
}

/// Create a pool with a custom connection limit.
pub fn init_pool_with_options(config: &DatabaseConfig, max_connections: u32) -> PgPool {
    tracing::debug!(
        host = config.host(),
        port = ?config.port(),
        database = %config.database,
        max_connections,
        "Creating lazy connection pool"
    );

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(config.connect_options())
}
