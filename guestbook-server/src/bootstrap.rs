//! Startup sequence for the database
//!
//! Secret lookup, config assembly, pool creation, schema check; run once,
//! in that order, on a background task. The listener does not wait for it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::{build_config, DatabaseConfig, DbEnv};
use crate::db::{ensure_schema, init_pool, PgVisitorStore};
use crate::secrets::{fetch_secret, SecretSource};
use crate::state::AppState;

/// Inputs for [`bootstrap`]
pub struct Bootstrap {
    pub env: DbEnv,
    pub secrets: Arc<dyn SecretSource>,
    pub secret_name: String,
}

/// Resolve the secret and assemble the database config.
pub async fn resolve_config(
    env: &DbEnv,
    secrets: &dyn SecretSource,
    secret_name: &str,
) -> DatabaseConfig {
    let secret = fetch_secret(secrets, secret_name).await;
    if secret.is_some() {
        tracing::info!(secret = secret_name, "Fetched database password from Secret Manager");
    } else {
        tracing::info!("Using local/fallback database password");
    }

    build_config(env, secret.as_deref())
}

/// Run the full startup sequence against `state`.
///
/// The store is published as soon as the pool exists; a failed schema check
/// is logged and leaves the store in place.
pub async fn bootstrap(state: AppState, init: Bootstrap) {
    let config = resolve_config(&init.env, init.secrets.as_ref(), &init.secret_name).await;
    tracing::info!(
        host = config.host(),
        port = ?config.port(),
        database = %config.database,
        user = %config.user,
        "Database configuration resolved"
    );

    let pool = init_pool(&config);
    drop(config);

    if !state.install_store(Arc::new(PgVisitorStore::new(pool.clone()))) {
        tracing::warn!("Visitor store already installed, keeping existing one");
        return;
    }

    if let Err(e) = ensure_schema(&pool).await {
        tracing::error!(
            error = %e,
            "Error initializing database (is the Cloud SQL proxy running for local dev?)"
        );
    }
}

/// Spawn [`bootstrap`] without awaiting it.
pub fn spawn_bootstrap(state: AppState, init: Bootstrap) -> JoinHandle<()> {
    tokio::spawn(bootstrap(state, init))
}
