//! guestbook-server: visitor log over PostgreSQL
//!
//! Serves a page listing every signature newest-first and a form endpoint
//! to add one. Database settings come from the environment, with the
//! password optionally pulled from GCP Secret Manager at startup.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod secrets;
pub mod state;

use std::sync::Arc;

pub use bootstrap::{spawn_bootstrap, Bootstrap};
pub use config::{build_config, DatabaseConfig, DbEnv};
pub use error::{Error, Result};
pub use http::ServerConfig;
pub use state::AppState;

use secrets::{NoSecrets, SecretManagerRest, SecretSource};

/// Options for [`serve`]
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub server: ServerConfig,
    /// Secret holding the database password; empty skips the lookup
    pub secret_name: String,
    /// Query GCP Secret Manager for `secret_name`
    pub use_secret_manager: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            secret_name: secrets::DB_PASSWORD_SECRET.to_string(),
            use_secret_manager: true,
        }
    }
}

/// Secret source selected by `use_secret_manager`
pub fn secret_source(use_secret_manager: bool) -> Arc<dyn SecretSource> {
    if use_secret_manager {
        Arc::new(SecretManagerRest::from_env())
    } else {
        Arc::new(NoSecrets)
    }
}

/// Start the database bootstrap in the background and serve HTTP.
pub async fn serve(options: ServeOptions) -> Result<()> {
    let state = AppState::new();

    spawn_bootstrap(
        state.clone(),
        Bootstrap {
            env: DbEnv::from_env(),
            secrets: secret_source(options.use_secret_manager),
            secret_name: options.secret_name,
        },
    );

    http::run_server(state, options.server).await
}
