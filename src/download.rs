//! Drives an rqbit download restricted to the selected files and reports
//! progress until it completes or the user interrupts it.

use crate::api::client::RqbitClient;
use crate::api::types::{AddTorrentOptions, TorrentState, TorrentStats};
use crate::config::DownloadConfig;
use crate::error::TorrentFilterError;
use crate::metrics::Metrics;
use crate::torrent::TorrentFile;
use anyhow::{Context, Result};
use bytes::Bytes;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How a download session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    Interrupted,
}

/// One status line, rewritten in place with `\r`.
pub fn format_progress(stats: &TorrentStats) -> String {
    let (down, up) = stats
        .live
        .as_ref()
        .map(|l| {
            (
                l.download_speed.kilobytes_per_sec(),
                l.upload_speed.kilobytes_per_sec(),
            )
        })
        .unwrap_or((0.0, 0.0));

    format!(
        "Progress: {:.2}% | Download: {:.1} kB/s | Upload: {:.1} kB/s | Peers: {} | State: {}",
        stats.progress() * 100.0,
        down,
        up,
        stats.peers(),
        stats.torrent_state()
    )
}

/// Resolve the download directory: explicit, configured, or the current one.
pub fn resolve_output_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(TorrentFilterError::from)?,
    };
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(std::env::current_dir()
            .map_err(TorrentFilterError::from)?
            .join(dir))
    }
}

pub struct DownloadDriver {
    client: Arc<RqbitClient>,
    poll_interval: Duration,
    server_wait: Duration,
    forget_on_exit: bool,
    metrics: Option<Arc<Metrics>>,
}

impl DownloadDriver {
    pub fn new(
        client: Arc<RqbitClient>,
        config: &DownloadConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            client,
            poll_interval: config.poll_interval(),
            server_wait: config.server_wait(),
            forget_on_exit: config.forget_on_exit,
            metrics,
        }
    }

    /// Add the original descriptor with only `files` selected, then poll
    /// until done. `shutdown` resolving counts as a user interrupt.
    pub async fn run<W, F>(
        &self,
        torrent: Bytes,
        files: &[TorrentFile],
        output_dir: &Path,
        out: &mut W,
        shutdown: F,
    ) -> Result<DownloadOutcome>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(TorrentFilterError::from)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        self.client.wait_for_server(self.server_wait).await?;

        let only_files: Vec<usize> = files.iter().map(TorrentFile::engine_index).collect();
        let opts = AddTorrentOptions::new(Some(output_dir.display().to_string()), &only_files);
        let added = self
            .client
            .add_torrent_bytes(torrent, &opts)
            .await
            .context("Failed to add torrent to rqbit")?;
        let id = added.id.ok_or_else(|| {
            TorrentFilterError::EngineError("rqbit did not return a torrent id".to_string())
        })?;
        info!(id, info_hash = %added.details.info_hash, files = files.len(), "Torrent added");

        writeln!(
            out,
            "Starting download of {} files to {}",
            files.len(),
            output_dir.display()
        )?;
        writeln!(out, "Press Ctrl+C to stop the download")?;

        let result = self.poll(id, out, shutdown).await;

        if self.forget_on_exit {
            if let Err(e) = self.client.forget_torrent(id).await {
                let unreachable = e
                    .downcast_ref::<TorrentFilterError>()
                    .is_some_and(TorrentFilterError::is_server_unavailable);
                warn!(id, unreachable, error = %e, "Failed to remove torrent from rqbit session");
            }
        }

        let outcome = result?;
        writeln!(out, "Download session ended")?;
        Ok(outcome)
    }

    async fn poll<W, F>(&self, id: u64, out: &mut W, shutdown: F) -> Result<DownloadOutcome>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let outcome = loop {
            let stats = tokio::select! {
                _ = &mut shutdown => break DownloadOutcome::Interrupted,
                stats = self.client.get_torrent_stats(id) => stats?,
            };
            if let Some(metrics) = &self.metrics {
                metrics.record_poll();
            }

            if stats.torrent_state() == TorrentState::Error {
                writeln!(out)?;
                return Err(TorrentFilterError::EngineError(
                    stats
                        .error
                        .unwrap_or_else(|| "unknown error".to_string()),
                )
                .into());
            }

            if stats.is_complete() {
                break DownloadOutcome::Completed;
            }

            write!(out, "\r{}", format_progress(&stats))?;
            out.flush()?;

            tokio::select! {
                _ = &mut shutdown => break DownloadOutcome::Interrupted,
                _ = sleep(self.poll_interval) => {}
            }
        };

        match outcome {
            DownloadOutcome::Completed => writeln!(out, "\nDownload complete!")?,
            DownloadOutcome::Interrupted => writeln!(out, "\nDownload stopped by user")?,
        }
        debug!(id, ?outcome, "Download loop finished");
        Ok(outcome)
    }
}
