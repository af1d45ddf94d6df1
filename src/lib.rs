pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod report;
pub mod subset;
pub mod torrent;

pub use cli::Cli;
pub use config::Config;
pub use download::{DownloadDriver, DownloadOutcome};
pub use error::{TorrentFilterError, TorrentFilterResult};
pub use filter::MonthFilter;
pub use metrics::Metrics;
pub use torrent::{MetaInfo, TorrentFile, TorrentSource};

use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// What a run did, for callers that want more than the exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_files: usize,
    pub matched: Vec<TorrentFile>,
    pub filtered_torrent: Option<PathBuf>,
    pub download: Option<DownloadOutcome>,
}

/// Run the whole pipeline against the real stdout, stopping downloads on Ctrl+C.
pub async fn run(cli: &Cli, config: &Config) -> Result<RunSummary> {
    let mut stdout = std::io::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    execute(cli, config, &mut stdout, shutdown).await
}

/// Fetch, list, filter, optionally write the reduced torrent and download.
pub async fn execute<W, F>(
    cli: &Cli,
    config: &Config,
    out: &mut W,
    shutdown: F,
) -> Result<RunSummary>
where
    W: Write,
    F: Future<Output = ()>,
{
    tracing::info!(operation = "startup", torrent = %cli.torrent, "torrent-month-filter starting");
    tracing::debug!(config = ?config, "Configuration loaded");

    let filter = MonthFilter::new(cli.month, cli.year)?;
    let metrics = Arc::new(Metrics::new());

    let fetcher = torrent::Fetcher::new(&config.fetch, Some(Arc::clone(&metrics)))?;
    let source = TorrentSource::parse(&cli.torrent);
    tracing::debug!(remote = source.is_remote(), "Loading torrent");
    let raw = source.load(&fetcher).await?;

    let meta = MetaInfo::from_bytes(&raw).context("Error parsing torrent")?;
    match torrent::info_hash(&raw) {
        Ok(hash) => tracing::info!(
            info_hash = %hash,
            name = %meta.info.name,
            total_bytes = meta.total_size(),
            "Parsed torrent"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not compute info hash"),
    }

    let files = meta.files();
    let matched = filter.apply(&files);
    tracing::debug!(total = files.len(), matched = matched.len(), "Filtered file list");

    let mut summary = RunSummary {
        total_files: files.len(),
        matched: Vec::new(),
        filtered_torrent: None,
        download: None,
    };

    if matched.is_empty() {
        report::write_no_matches(out, &filter)?;
        metrics.log_full_summary();
        return Ok(summary);
    }

    report::write_listing(out, &filter, &matched)?;

    if let Some(ref output) = cli.output {
        let written = subset::save_subset(&meta, &matched, output)
            .await
            .context("Failed to write filtered torrent")?;
        writeln!(out, "Created filtered torrent: {}", written.display())?;
        summary.filtered_torrent = Some(written);
    }

    if cli.download {
        let output_dir = download::resolve_output_dir(config.download.output_dir.as_deref())?;
        let client = Arc::new(api::create_api_client(&config.api, Some(Arc::clone(&metrics)))?);
        let driver = DownloadDriver::new(client, &config.download, Some(Arc::clone(&metrics)));
        let outcome = driver
            .run(raw, &matched, &output_dir, out, shutdown)
            .await?;
        summary.download = Some(outcome);
    }

    metrics.log_full_summary();
    summary.matched = matched;
    Ok(summary)
}
