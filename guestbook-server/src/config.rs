//! Database configuration - environment loading and address selection
//!
//! Configuration is loaded from environment variables:
//! - `DB_USER`: Database role (default: postgres)
//! - `DB_PASSWORD`: Fallback password when no secret resolves (default: password)
//! - `DB_NAME`: Database name (default: visitor_log)
//! - `INSTANCE_CONNECTION_NAME`: Cloud SQL instance; selects unix-socket addressing

use std::fmt;

use sqlx::postgres::PgConnectOptions;

const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_DATABASE: &str = "visitor_log";

/// Directory Cloud SQL mounts instance sockets under.
pub const CLOUD_SQL_SOCKET_DIR: &str = "/cloudsql/";

const LOOPBACK_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5432;

/// Snapshot of the database-related environment.
///
/// Empty values are stored as `None` so every rule below only has to
/// distinguish "set" from "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbEnv {
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub instance_connection_name: Option<String>,
}

impl DbEnv {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            db_user: get("DB_USER"),
            db_password: get("DB_PASSWORD"),
            db_name: get("DB_NAME"),
            instance_connection_name: get("INSTANCE_CONNECTION_NAME"),
        }
    }
}

/// How the pool reaches PostgreSQL. Exactly one mode is ever active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Unix socket directory, e.g. `/cloudsql/project:region:instance`
    Socket { path: String },
    /// Plain TCP
    Tcp { host: String, port: u16 },
}

/// Connection parameters, built once at startup and dropped after the pool exists.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub addressing: Addressing,
}

impl DatabaseConfig {
    /// Socket path or TCP host
    pub fn host(&self) -> &str {
        match &self.addressing {
            Addressing::Socket { path } => path,
            Addressing::Tcp { host, .. } => host,
        }
    }

    /// TCP port; `None` in socket mode
    pub fn port(&self) -> Option<u16> {
        match &self.addressing {
            Addressing::Socket { .. } => None,
            Addressing::Tcp { port, .. } => Some(*port),
        }
    }

    /// Convert into sqlx connect options.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .username(&self.user)
            .password(&self.password)
            .database(&self.database);

        match &self.addressing {
            Addressing::Socket { path } => options.socket(path),
            Addressing::Tcp { host, port } => options.host(host).port(*port),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("addressing", &self.addressing)
            .finish()
    }
}

impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "user:     {}", self.user)?;
        writeln!(f, "password: <redacted>")?;
        writeln!(f, "database: {}", self.database)?;
        match &self.addressing {
            Addressing::Socket { path } => write!(f, "socket:   {}", path),
            Addressing::Tcp { host, port } => write!(f, "host:     {}:{}", host, port),
        }
    }
}

/// Assemble connection parameters.
///
/// A non-empty `resolved_secret` always wins over `DB_PASSWORD`.
pub fn build_config(env: &DbEnv, resolved_secret: Option<&str>) -> DatabaseConfig {
    let password = resolved_secret
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .or_else(|| env.db_password.clone())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

    let addressing = match &env.instance_connection_name {
        Some(instance) => Addressing::Socket {
            path: format!("{}{}", CLOUD_SQL_SOCKET_DIR, instance),
        },
        None => Addressing::Tcp {
            host: LOOPBACK_HOST.to_string(),
            port: DEFAULT_PORT,
        },
    };

    DatabaseConfig {
        user: env
            .db_user
            .clone()
            .unwrap_or_else(|| DEFAULT_USER.to_string()),
        password,
        database: env
            .db_name
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        addressing,
    }
}
