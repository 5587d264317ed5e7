//! Secret resolution
//!
//! A single lookup against a remote secret store. Every failure is
//! downgraded to "no override available" so startup can fall back to
//! plain environment configuration.

pub mod gcp;

use async_trait::async_trait;

pub use gcp::SecretManagerRest;

/// Logical name of the database password secret
pub const DB_PASSWORD_SECRET: &str = "DB_PASSWORD";

/// Secret lookup error
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("secret manager returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not determine GCP project id")]
    MissingProject,

    #[error("secret payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("secret payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("secret lookup is disabled")]
    Disabled,
}

/// A remote store that can return the current value of a named secret.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn access(&self, name: &str) -> Result<String, SecretError>;
}

/// Fetch a secret, treating any failure as absent.
///
/// An empty `name` short-circuits without touching `source`.
pub async fn fetch_secret(source: &dyn SecretSource, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    match source.access(name).await {
        Ok(value) => Some(value),
        Err(SecretError::Disabled) => {
            tracing::debug!(secret = name, "Secret lookup disabled");
            None
        }
        Err(e) => {
            tracing::warn!(
                secret = name,
                error = %e,
                "Could not fetch secret, using default/local value if available"
            );
            None
        }
    }
}

/// Source used when remote lookup is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecrets;

#[async_trait]
impl SecretSource for NoSecrets {
    async fn access(&self, _name: &str) -> Result<String, SecretError> {
        Err(SecretError::Disabled)
    }
}
