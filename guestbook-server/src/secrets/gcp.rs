//! GCP Secret Manager REST client
//!
//! Reads the latest version of a secret through the Secret Manager v1 REST
//! API. Credentials come from the instance metadata server, which is what
//! App Engine, Cloud Run and GCE provide.
//!
//! Environment variables:
//!   GOOGLE_CLOUD_PROJECT / GCP_PROJECT   # Project id (else asked from metadata)
//!   SECRET_MANAGER_ENDPOINT              # API base URL override
//!   GCE_METADATA_HOST                    # Metadata server host override

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{SecretError, SecretSource};

const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";
const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// `GET .../versions/{version}:access` response
#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

/// Base64-encoded secret data
#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: String,
}

/// Standard Google API error envelope
#[derive(Debug, Deserialize)]
struct GcpErrorResponse {
    error: GcpError,
}

#[derive(Debug, Deserialize)]
struct GcpError {
    message: String,
    #[serde(default)]
    status: String,
}

/// Metadata server token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Secret Manager client authenticated through the metadata server
pub struct SecretManagerRest {
    http_client: Client,
    base_url: String,
    metadata_base: String,
    project_id: Option<String>,
}

impl std::fmt::Debug for SecretManagerRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerRest")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl SecretManagerRest {
    /// Build a client from environment variables.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let base_url = var("SECRET_MANAGER_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into());
        let metadata_host =
            var("GCE_METADATA_HOST").unwrap_or_else(|| DEFAULT_METADATA_HOST.into());
        let project_id = var("GOOGLE_CLOUD_PROJECT").or_else(|| var("GCP_PROJECT"));

        Self::new(base_url, format!("http://{}", metadata_host), project_id)
    }

    pub fn new(base_url: String, metadata_base: String, project_id: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            metadata_base: metadata_base.trim_end_matches('/').to_string(),
            project_id,
        }
    }

    async fn metadata(&self, path: &str) -> Result<reqwest::Response, SecretError> {
        let url = format!("{}/computeMetadata/v1/{}", self.metadata_base, path);
        let response = self
            .http_client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SecretError::Api { status, message });
        }
        Ok(response)
    }

    async fn access_token(&self) -> Result<String, SecretError> {
        let token: TokenResponse = self
            .metadata("instance/service-accounts/default/token")
            .await?
            .json()
            .await?;
        debug!("Retrieved access token from metadata server");
        Ok(token.access_token)
    }

    async fn project_id(&self) -> Result<String, SecretError> {
        if let Some(project) = &self.project_id {
            return Ok(project.clone());
        }
        let project = self.metadata("project/project-id").await?.text().await?;
        let project = project.trim();
        if project.is_empty() {
            return Err(SecretError::MissingProject);
        }
        Ok(project.to_string())
    }
}

#[async_trait]
impl SecretSource for SecretManagerRest {
    async fn access(&self, name: &str) -> Result<String, SecretError> {
        let path = if is_resource_name(name) {
            version_path(name, None)?
        } else {
            version_path(name, Some(self.project_id().await?.as_str()))?
        };
        let token = self.access_token().await?;

        debug!(secret = %path, "Accessing secret version");
        let response = self
            .http_client
            .get(format!("{}/v1/{}:access", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let body: AccessSecretVersionResponse = response.json().await?;
        decode_payload(&body.payload.data)
    }
}

fn is_resource_name(name: &str) -> bool {
    name.starts_with("projects/")
}

/// Resolve a secret identifier into a `projects/*/secrets/*/versions/*` path.
///
/// Full resource names pass through, gaining `/versions/latest` when no
/// version is named. Short names need a project.
fn version_path(name: &str, project: Option<&str>) -> Result<String, SecretError> {
    let resource = if is_resource_name(name) {
        name.trim_end_matches('/').to_string()
    } else {
        let project = project.ok_or(SecretError::MissingProject)?;
        format!("projects/{}/secrets/{}", project, name)
    };

    if resource.contains("/versions/") {
        Ok(resource)
    } else {
        Ok(format!("{}/versions/latest", resource))
    }
}

fn decode_payload(data: &str) -> Result<String, SecretError> {
    let bytes = general_purpose::STANDARD.decode(data.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

fn api_error(status: u16, body: &str) -> SecretError {
    let message = match serde_json::from_str::<GcpErrorResponse>(body) {
        Ok(resp) if resp.error.status.is_empty() => resp.error.message,
        Ok(resp) => format!("{} ({})", resp.error.message, resp.error.status),
        Err(_) => body.to_string(),
    };
    SecretError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_uses_project_and_latest() {
        assert_eq!(
            version_path("DB_PASSWORD", Some("guestbook-prod")).unwrap(),
            "projects/guestbook-prod/secrets/DB_PASSWORD/versions/latest"
        );
    }

    #[test]
    fn short_name_without_project_fails() {
        assert!(matches!(
            version_path("DB_PASSWORD", None),
            Err(SecretError::MissingProject)
        ));
    }

    #[test]
    fn resource_name_passes_through() {
        assert_eq!(
            version_path("projects/p/secrets/DB_PASSWORD", None).unwrap(),
            "projects/p/secrets/DB_PASSWORD/versions/latest"
        );
        assert_eq!(
            version_path("projects/p/secrets/DB_PASSWORD/versions/3", None).unwrap(),
            "projects/p/secrets/DB_PASSWORD/versions/3"
        );
    }

    #[test]
    fn payload_decodes_base64() {
        assert_eq!(decode_payload("czNjcjN0").unwrap(), "s3cr3t");
    }

    #[test]
    fn malformed_payload_is_error() {
        assert!(matches!(
            decode_payload("not base64!"),
            Err(SecretError::Base64(_))
        ));
        // 0xff is never valid UTF-8
        assert!(matches!(decode_payload("/w=="), Err(SecretError::Utf8(_))));
    }

    #[test]
    fn api_error_reads_google_envelope() {
        let body = r#"{"error":{"code":404,"message":"Secret not found","status":"NOT_FOUND"}}"#;
        match api_error(404, body) {
            SecretError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Secret not found (NOT_FOUND)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_keeps_raw_body() {
        match api_error(502, "bad gateway") {
            SecretError::Api { message, .. } => assert_eq!(message, "bad gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Local stand-in for the metadata server and the Secret Manager API
    mod fake_gcp {
        use axum::{
            http::{header, HeaderMap, StatusCode, Uri},
            response::{IntoResponse, Response},
            routing::get,
            Json, Router,
        };
        use serde_json::json;

        pub const PROJECT: &str = "guestbook-test";
        const TOKEN: &str = "fake-access-token";

        fn header_is(headers: &HeaderMap, name: impl header::AsHeaderName, value: &str) -> bool {
            headers.get(name).and_then(|v| v.to_str().ok()) == Some(value)
        }

        async fn token(headers: HeaderMap) -> Response {
            if !header_is(&headers, "metadata-flavor", "Google") {
                return StatusCode::FORBIDDEN.into_response();
            }
            Json(json!({
                "access_token": TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            }))
            .into_response()
        }

        async fn project_id(headers: HeaderMap) -> Response {
            if !header_is(&headers, "metadata-flavor", "Google") {
                return StatusCode::FORBIDDEN.into_response();
            }
            PROJECT.into_response()
        }

        async fn access_granted(uri: Uri, headers: HeaderMap) -> Response {
            let expected =
                format!("/v1/projects/{PROJECT}/secrets/DB_PASSWORD/versions/latest:access");
            let bearer = format!("Bearer {TOKEN}");
            if uri.path() != expected || !header_is(&headers, header::AUTHORIZATION, &bearer) {
                return (StatusCode::NOT_FOUND, format!("unexpected request {}", uri.path()))
                    .into_response();
            }
            Json(json!({
                "name": format!("projects/{PROJECT}/secrets/DB_PASSWORD/versions/1"),
                "payload": { "data": "czNjcjN0" }
            }))
            .into_response()
        }

        async fn access_denied() -> Response {
            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": {
                        "code": 403,
                        "message": "Permission denied on resource",
                        "status": "PERMISSION_DENIED"
                    }
                })),
            )
                .into_response()
        }

        /// Serve on an ephemeral loopback port and return its base URL.
        pub async fn start(grant_access: bool) -> String {
            let metadata = Router::new()
                .route(
                    "/computeMetadata/v1/instance/service-accounts/default/token",
                    get(token),
                )
                .route("/computeMetadata/v1/project/project-id", get(project_id));
            let app = if grant_access {
                metadata.fallback(access_granted)
            } else {
                metadata.fallback(access_denied)
            };

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{addr}")
        }
    }

    #[tokio::test]
    async fn reads_latest_version_with_metadata_credentials() {
        let base = fake_gcp::start(true).await;
        let client = SecretManagerRest::new(base.clone(), base, None);

        assert_eq!(client.project_id().await.unwrap(), fake_gcp::PROJECT);
        assert_eq!(
            crate::secrets::fetch_secret(&client, crate::secrets::DB_PASSWORD_SECRET)
                .await
                .as_deref(),
            Some("s3cr3t")
        );
    }

    #[tokio::test]
    async fn full_resource_name_skips_project_lookup() {
        let base = fake_gcp::start(true).await;
        let client = SecretManagerRest::new(base.clone(), base, Some("ignored".into()));

        let name = format!("projects/{}/secrets/DB_PASSWORD", fake_gcp::PROJECT);
        assert_eq!(client.access(&name).await.unwrap(), "s3cr3t");
    }

    #[tokio::test]
    async fn permission_denied_is_api_error_and_absent() {
        let base = fake_gcp::start(false).await;
        let client = SecretManagerRest::new(base.clone(), base, None);

        match client.access("DB_PASSWORD").await {
            Err(SecretError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied on resource (PERMISSION_DENIED)");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(
            crate::secrets::fetch_secret(&client, "DB_PASSWORD").await,
            None
        );
    }

    #[tokio::test]
    async fn unreachable_metadata_server_is_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let client = SecretManagerRest::new(
            "http://127.0.0.1:9".into(),
            "http://127.0.0.1:9".into(),
            Some("p".into()),
        );
        assert!(client.access("DB_PASSWORD").await.is_err());
    }
}
