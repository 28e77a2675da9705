//! Main Melodia API client.

use crate::error::{Result, ServerClientError};
use crate::history::HistoryClient;
use crate::stream::ApiStreamResolver;
use crate::types::ServerConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Request timeout applied to every API call
pub const API_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the Melodia REST API.
///
/// Holds the base URL and the optional bearer token, and hands out
/// sub-clients for history operations and stream URL resolution.
///
/// # Example
///
/// ```ignore
/// use melodia_server_client::{MelodiaClient, ServerConfig};
///
/// let client = MelodiaClient::new(ServerConfig::new("http://localhost:8080"))?;
/// client.set_token("eyJhbGciOi...").await;
///
/// let history = client.history().await;
/// history.client().record_play("USR001", "SNG042").await?;
/// ```
pub struct MelodiaClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl MelodiaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        // Validate URL
        if config.url.trim().is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim().trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ServerConfig {
            url,
            access_token: config.access_token,
        };

        let http = Client::builder()
            .timeout(API_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Melodia/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        debug!(url = %normalized_config.url, "Created API client");

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the API base URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Set the bearer token (e.g., after sign-in).
    pub async fn set_token(&self, access_token: impl Into<String>) {
        let mut config = self.config.write().await;
        config.access_token = Some(access_token.into());
    }

    /// Clear the stored token (sign-out).
    pub async fn clear_token(&self) {
        let mut config = self.config.write().await;
        config.access_token = None;
        info!("Cleared API token");
    }

    /// Get a history client for play history operations.
    pub async fn history(&self) -> HistoryClientHandle {
        let config = self.config.read().await;
        HistoryClientHandle {
            http: self.http.clone(),
            url: config.url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Resolver producing `{base}/api/songs/stream/{id}` URLs.
    pub async fn stream_resolver(&self) -> ApiStreamResolver {
        ApiStreamResolver::new(self.url().await)
    }
}

/// Handle for history operations.
///
/// Returned by `MelodiaClient::history()`; owns a snapshot of the URL and
/// token so it can move into a spawned task.
pub struct HistoryClientHandle {
    http: Client,
    url: String,
    access_token: Option<String>,
}

impl HistoryClientHandle {
    /// Get the history client.
    pub fn client(&self) -> HistoryClient<'_> {
        HistoryClient::new(&self.http, &self.url, self.access_token.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        // Valid URLs
        assert!(MelodiaClient::new(ServerConfig::new("https://example.com")).is_ok());
        assert!(MelodiaClient::new(ServerConfig::new("http://localhost:8080")).is_ok());

        // Invalid URLs
        assert!(MelodiaClient::new(ServerConfig::new("")).is_err());
        assert!(MelodiaClient::new(ServerConfig::new("   ")).is_err());
        assert!(MelodiaClient::new(ServerConfig::new("not-a-url")).is_err());
        assert!(MelodiaClient::new(ServerConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client =
            MelodiaClient::new(ServerConfig::new("http://localhost:8080//")).expect("valid url");

        let url = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(client.url());
        assert_eq!(url, "http://localhost:8080");
    }
}
