//! Ambient credential resolution for the agent service.
//!
//! Inside App Service the workload identity endpoint mints tokens for the
//! app's managed identity; locally an `AZURE_AI_TOKEN` variable stands in.
//! Tokens are cached until shortly before expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use relay_core::RelayError;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

const IDENTITY_API_VERSION: &str = "2019-08-01";
const TOKEN_RESOURCE: &str = "https://ai.azure.com";

// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

#[derive(Deserialize)]
struct IdentityTokenResponse {
    access_token: String,
    expires_on: String,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: u64,
}

enum TokenSource {
    /// App Service / workload identity endpoint.
    ManagedIdentity { endpoint: String, header: String },
    /// Pre-issued token from the environment, for local development.
    Static(String),
}

/// Resolves and caches bearer tokens for the agent service.
///
/// Constructed once at startup and shared read-only; the token text never
/// leaves this module except inside the `Authorization` header.
pub struct TokenProvider {
    client: Client,
    source: TokenSource,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Picks a credential source from the environment.
    ///
    /// Prefers the managed identity endpoint (`IDENTITY_ENDPOINT` +
    /// `IDENTITY_HEADER`, injected by the hosting platform), falling back
    /// to a static `AZURE_AI_TOKEN`. Fails if neither is present.
    pub fn from_env() -> Result<Self, RelayError> {
        let source = match (
            std::env::var("IDENTITY_ENDPOINT"),
            std::env::var("IDENTITY_HEADER"),
        ) {
            (Ok(endpoint), Ok(header)) if !endpoint.is_empty() => {
                debug!("using managed identity endpoint for agent service auth");
                TokenSource::ManagedIdentity { endpoint, header }
            }
            _ => match std::env::var("AZURE_AI_TOKEN") {
                Ok(token) if !token.trim().is_empty() => {
                    debug!("using static token from AZURE_AI_TOKEN");
                    TokenSource::Static(token)
                }
                _ => {
                    return Err(RelayError::Upstream(
                        "no credential source: set IDENTITY_ENDPOINT/IDENTITY_HEADER \
                         or AZURE_AI_TOKEN"
                            .into(),
                    ))
                }
            },
        };

        Ok(Self {
            client: Client::new(),
            source,
            cached: RwLock::new(None),
        })
    }

    /// Returns a bearer token valid for at least [`EXPIRY_MARGIN`].
    pub async fn token(&self) -> Result<String, RelayError> {
        let (endpoint, header) = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ManagedIdentity { endpoint, header } => (endpoint, header),
        };

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at > unix_now() + EXPIRY_MARGIN.as_secs() {
                return Ok(cached.token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > unix_now() + EXPIRY_MARGIN.as_secs() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch_token(endpoint, header).await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    async fn fetch_token(&self, endpoint: &str, header: &str) -> Result<CachedToken, RelayError> {
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("api-version", IDENTITY_API_VERSION),
                ("resource", TOKEN_RESOURCE),
            ])
            .header("X-IDENTITY-HEADER", header)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RelayError::Upstream(format!("identity endpoint: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream(format!(
                "identity endpoint returned {status}: {body}"
            )));
        }

        let resp: IdentityTokenResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(format!("identity endpoint: {e}")))?;

        let expires_at = resp.expires_on.parse().unwrap_or(0);
        debug!(expires_at, "acquired agent service token");

        Ok(CachedToken {
            token: resp.access_token,
            expires_at,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
