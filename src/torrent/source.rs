use crate::config::FetchConfig;
use crate::error::TorrentFilterError;
use crate::metrics::Metrics;
use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use futures::stream::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Where the torrent descriptor comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    Url(String),
    Path(PathBuf),
}

impl TorrentSource {
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            TorrentSource::Url(arg.to_string())
        } else {
            TorrentSource::Path(PathBuf::from(arg))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TorrentSource::Url(_))
    }

    /// Read the raw descriptor bytes.
    pub async fn load(&self, fetcher: &Fetcher) -> Result<Bytes> {
        match self {
            TorrentSource::Url(url) => fetcher
                .fetch(url)
                .await
                .context("Error downloading torrent"),
            TorrentSource::Path(path) => {
                let buf = tokio::fs::read(path)
                    .await
                    .map_err(TorrentFilterError::from)
                    .with_context(|| format!("Error reading torrent {}", path.display()))?;
                debug!(path = %path.display(), bytes = buf.len(), "Read torrent file");
                Ok(Bytes::from(buf))
            }
        }
    }
}

/// HTTP downloader for remote torrent files.
pub struct Fetcher {
    client: Client,
    max_size: u64,
    metrics: Option<Arc<Metrics>>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig, metrics: Option<Arc<Metrics>>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                TorrentFilterError::IoError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_size: config.max_torrent_size,
            metrics,
        })
    }

    /// GET `url`, failing on non-success status or bodies over the size cap.
    #[instrument(skip(self), fields(op = "fetch_torrent"))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TorrentFilterError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentFilterError::ApiError {
                status: status.as_u16(),
                message: format!("GET {} returned {}", url, status),
            }
            .into());
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(self.too_large(len).into());
            }
        }

        let mut stream = response.bytes_stream();
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(TorrentFilterError::from)?;
            if (buf.len() + chunk.len()) as u64 > self.max_size {
                return Err(self.too_large((buf.len() + chunk.len()) as u64).into());
            }
            buf.extend_from_slice(&chunk);
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(buf.len() as u64);
        }
        debug!(url, bytes = buf.len(), "Fetched torrent");
        Ok(buf.freeze())
    }

    fn too_large(&self, len: u64) -> TorrentFilterError {
        TorrentFilterError::InvalidArgument(format!(
            "torrent file is {} bytes, limit is {}",
            len, self.max_size
        ))
    }
}
