use serde::{Deserialize, Serialize};
use std::fmt;

/// Query parameters for `POST /torrents`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddTorrentOptions {
    pub overwrite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_folder: Option<String>,
    /// Comma-separated 0-based file indices to download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_files: Option<String>,
}

impl AddTorrentOptions {
    pub fn new(output_folder: Option<String>, only_files: &[usize]) -> Self {
        let only_files = if only_files.is_empty() {
            None
        } else {
            Some(
                only_files
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };
        Self {
            overwrite: true,
            output_folder,
            only_files,
        }
    }
}

/// Response from adding a torrent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTorrentResponse {
    pub id: Option<u64>,
    pub details: TorrentDetails,
    #[serde(default)]
    pub output_folder: String,
}

/// Torrent details as reported by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentDetails {
    pub info_hash: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<FileDetails>,
}

/// File information from API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDetails {
    pub name: String,
    pub length: u64,
    #[serde(default = "default_included")]
    pub included: bool,
}

fn default_included() -> bool {
    true
}

/// Response from `GET /torrents/{id}/stats/v1`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentStats {
    pub state: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub progress_bytes: u64,
    #[serde(default)]
    pub uploaded_bytes: u64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub live: Option<LiveStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveStats {
    #[serde(default)]
    pub snapshot: Snapshot,
    #[serde(default)]
    pub download_speed: Speed,
    #[serde(default)]
    pub upload_speed: Speed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub peer_stats: PeerStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerStats {
    #[serde(default)]
    pub live: u32,
    #[serde(default)]
    pub queued: u32,
    #[serde(default)]
    pub connecting: u32,
}

/// Transfer speed; `mbps` is mebibytes per second.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Speed {
    #[serde(default)]
    pub mbps: f64,
    #[serde(default)]
    pub human_readable: String,
}

impl Speed {
    pub fn kilobytes_per_sec(&self) -> f64 {
        self.mbps * 1024.0 * 1024.0 / 1000.0
    }
}

/// Status of a torrent for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentState {
    /// Engine is checking existing data
    CheckingFiles,
    /// Torrent is downloading
    Downloading,
    /// Selected files are complete
    Finished,
    /// Torrent is paused
    Paused,
    /// Torrent has encountered an error
    Error,
    /// Unknown state
    Unknown,
}

impl fmt::Display for TorrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TorrentState::CheckingFiles => write!(f, "checking files"),
            TorrentState::Downloading => write!(f, "downloading"),
            TorrentState::Finished => write!(f, "finished"),
            TorrentState::Paused => write!(f, "paused"),
            TorrentState::Error => write!(f, "error"),
            TorrentState::Unknown => write!(f, "unknown"),
        }
    }
}

impl TorrentStats {
    pub fn torrent_state(&self) -> TorrentState {
        match self.state.as_str() {
            "error" => TorrentState::Error,
            _ if self.finished => TorrentState::Finished,
            "initializing" => TorrentState::CheckingFiles,
            "live" => TorrentState::Downloading,
            "paused" => TorrentState::Paused,
            _ => TorrentState::Unknown,
        }
    }

    /// Fraction of the selected bytes that are downloaded, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_bytes == 0 {
            if self.finished {
                1.0
            } else {
                0.0
            }
        } else {
            (self.progress_bytes as f64 / self.total_bytes as f64).min(1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.finished || (self.total_bytes > 0 && self.progress_bytes >= self.total_bytes)
    }

    pub fn peers(&self) -> u32 {
        self.live
            .as_ref()
            .map(|l| l.snapshot.peer_stats.live)
            .unwrap_or(0)
    }
}
