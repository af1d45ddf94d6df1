use crate::api::types::*;
use crate::config::ApiConfig;
use crate::error::TorrentFilterError;
use crate::metrics::Metrics;
use anyhow::Result;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, trace, warn};

/// HTTP client for interacting with an rqbit server
pub struct RqbitClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    auth_credentials: Option<(String, String)>,
    metrics: Option<Arc<Metrics>>,
}

impl RqbitClient {
    /// Create a new RqbitClient with default configuration
    pub fn new(base_url: String) -> Result<Self> {
        Self::with_config(
            base_url,
            3,
            Duration::from_millis(500),
            Duration::from_secs(60),
            None,
            None,
        )
    }

    /// Create a new RqbitClient with custom retry configuration
    pub fn with_config(
        base_url: String,
        max_retries: u32,
        retry_delay: Duration,
        timeout: Duration,
        auth_credentials: Option<(String, String)>,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self> {
        // Validate URL at construction time (fail fast on invalid URL)
        let _ = reqwest::Url::parse(&base_url)
            .map_err(|e| TorrentFilterError::InvalidArgument(format!("Invalid URL: {}", e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| {
                TorrentFilterError::IoError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_delay,
            auth_credentials,
            metrics,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create Authorization header for HTTP Basic Auth
    fn create_auth_header(&self) -> Option<String> {
        self.auth_credentials.as_ref().map(|(username, password)| {
            let credentials = format!("{}:{}", username, password);
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            format!("Basic {}", encoded)
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.create_auth_header() {
            Some(auth_header) => req.header("Authorization", auth_header),
            None => req,
        }
    }

    /// Execute request with automatic retry for transient failures
    async fn execute_with_retry<F, Fut>(
        &self,
        endpoint: &str,
        operation: F,
    ) -> Result<reqwest::Response>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = reqwest::Result<reqwest::Response>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if let Some(metrics) = &self.metrics {
                metrics.api.record_request(endpoint);
            }

            match operation().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempt < self.max_retries {
                        warn!(
                            endpoint,
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            "Server error, retrying"
                        );
                        self.record_retry(endpoint, attempt + 1);
                        sleep(self.retry_delay * (attempt + 1)).await;
                        continue;
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .map(Duration::from_secs)
                            .unwrap_or_else(|| self.retry_delay * (attempt + 1));

                        warn!(
                            endpoint,
                            status = status.as_u16(),
                            retry_after_secs = retry_after.as_secs(),
                            attempt = attempt + 1,
                            "Rate limited"
                        );
                        self.record_retry(endpoint, attempt + 1);
                        sleep(retry_after).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let api_error: TorrentFilterError = e.into();

                    if api_error.is_transient() && attempt < self.max_retries {
                        warn!(endpoint, attempt = attempt + 1, error = %api_error, "Retrying");
                        self.record_retry(endpoint, attempt + 1);
                        sleep(self.retry_delay * (attempt + 1)).await;
                        last_error = Some(api_error);
                    } else {
                        if let Some(metrics) = &self.metrics {
                            metrics.api.record_failure(endpoint, &api_error.to_string());
                        }
                        return Err(api_error.into());
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| TorrentFilterError::NetworkError("Retry limit exceeded".to_string()))
            .into())
    }

    fn record_retry(&self, endpoint: &str, attempt: u32) {
        if let Some(metrics) = &self.metrics {
            metrics.api.record_retry(endpoint, attempt);
        }
    }

    /// Helper to check response status and convert errors
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            Err(TorrentFilterError::PermissionDenied(format!(
                "Authentication failed: {}",
                if message.is_empty() {
                    "Invalid credentials".to_string()
                } else {
                    message
                }
            ))
            .into())
        } else {
            let message = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    return Err(TorrentFilterError::NetworkError(format!(
                        "Failed to read error response body: {}",
                        e
                    ))
                    .into());
                }
            };
            Err(TorrentFilterError::ApiError {
                status: status.as_u16(),
                message,
            }
            .into())
        }
    }

    /// Decode a JSON body, mapping failures to `ParseError`
    async fn decode_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.bytes().await.map_err(TorrentFilterError::from)?;
        Ok(serde_json::from_slice(&body).map_err(TorrentFilterError::from)?)
    }

    fn not_found_as(e: anyhow::Error, id: u64) -> anyhow::Error {
        if let Some(TorrentFilterError::ApiError { status: 404, .. }) =
            e.downcast_ref::<TorrentFilterError>()
        {
            return TorrentFilterError::NotFound(format!("torrent {}", id)).into();
        }
        e
    }

    // =========================================================================
    // Torrent Management
    // =========================================================================

    /// Add a torrent from raw `.torrent` bytes, restricted to `opts.only_files`
    #[instrument(skip(self, torrent), fields(api_op = "add_torrent", bytes = torrent.len()))]
    pub async fn add_torrent_bytes(
        &self,
        torrent: Bytes,
        opts: &AddTorrentOptions,
    ) -> Result<AddTorrentResponse> {
        let url = format!("{}/torrents", self.base_url);

        trace!(api_op = "add_torrent", only_files = ?opts.only_files);

        let response = self
            .execute_with_retry("/torrents", || {
                self.authorize(
                    self.client
                        .post(&url)
                        .query(opts)
                        .header("Content-Type", "application/x-bittorrent")
                        .body(torrent.clone()),
                )
                .send()
            })
            .await?;
        let response = self.check_response(response).await?;
        let result: AddTorrentResponse = Self::decode_json(response).await?;

        debug!(
            api_op = "add_torrent",
            id = ?result.id,
            info_hash = %result.details.info_hash,
            output_folder = %result.output_folder,
        );
        Ok(result)
    }

    /// Get statistics for a torrent
    #[instrument(skip(self), fields(api_op = "get_torrent_stats", id))]
    pub async fn get_torrent_stats(&self, id: u64) -> Result<TorrentStats> {
        let url = format!("{}/torrents/{}/stats/v1", self.base_url, id);
        let endpoint = format!("/torrents/{}/stats", id);

        let response = self
            .execute_with_retry(&endpoint, || self.authorize(self.client.get(&url)).send())
            .await?;
        let response = self
            .check_response(response)
            .await
            .map_err(|e| Self::not_found_as(e, id))?;
        let stats: TorrentStats = Self::decode_json(response).await?;

        trace!(
            api_op = "get_torrent_stats",
            id = id,
            state = %stats.state,
            progress_bytes = stats.progress_bytes,
            total_bytes = stats.total_bytes,
            finished = stats.finished,
        );
        Ok(stats)
    }

    // =========================================================================
    // Torrent Control
    // =========================================================================

    /// Execute a torrent action such as `forget`
    async fn torrent_action(&self, id: u64, action: &str) -> Result<()> {
        let url = format!("{}/torrents/{}/{}", self.base_url, id, action);
        let endpoint = format!("/torrents/{}/{}", id, action);

        trace!(api_op = "torrent_action", id = id, action = action);

        let response = self
            .execute_with_retry(&endpoint, || self.authorize(self.client.post(&url)).send())
            .await?;

        self.check_response(response)
            .await
            .map_err(|e| Self::not_found_as(e, id))?;
        debug!(api_op = "torrent_action", id = id, action = action, "Success");
        Ok(())
    }

    /// Remove torrent from session (keep files)
    #[instrument(skip(self), fields(api_op = "forget_torrent", id))]
    pub async fn forget_torrent(&self, id: u64) -> Result<()> {
        self.torrent_action(id, "forget").await
    }

    /// Check if the rqbit server is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/torrents", self.base_url);

        match self.authorize(self.client.get(&url)).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    Ok(true)
                } else {
                    warn!("Health check returned status: {}", response.status());
                    Ok(false)
                }
            }
            Err(e) => {
                let api_error: TorrentFilterError = e.into();
                warn!("Health check failed: {}", api_error);
                Ok(false)
            }
        }
    }

    /// Wait for the server to become available with exponential backoff
    pub async fn wait_for_server(&self, max_wait: Duration) -> Result<()> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match self.health_check().await {
                Ok(true) => {
                    debug!("Server is available after {:?}", start.elapsed());
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => error!("Error during server wait: {}", e),
            }

            if start.elapsed() >= max_wait {
                break;
            }
            attempt += 1;
            let delay = (self.retry_delay * 2_u32.pow(attempt.min(5)))
                .min(max_wait.saturating_sub(start.elapsed()));
            debug!(
                "Server not ready, waiting {:?} before retry {}...",
                delay, attempt
            );
            sleep(delay).await;
        }

        Err(TorrentFilterError::NetworkError(format!(
            "rqbit server at {} is not reachable",
            self.base_url
        ))
        .into())
    }
}

/// Create an RqbitClient from the API configuration
pub fn create_api_client(
    api_config: &ApiConfig,
    metrics: Option<Arc<Metrics>>,
) -> Result<RqbitClient> {
    RqbitClient::with_config(
        api_config.url.clone(),
        api_config.max_retries,
        api_config.retry_delay(),
        api_config.timeout(),
        api_config.credentials(),
        metrics,
    )
}
