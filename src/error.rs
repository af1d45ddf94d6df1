use std::fmt;
use thiserror::Error;

/// A single problem found while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Unified error type for torrent-month-filter.
#[derive(Error, Debug, Clone)]
pub enum TorrentFilterError {
    /// Entity not found (file, torrent id)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Permission denied, including failed API authentication
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    TimedOut(String),

    /// Network error, e.g. connection refused
    #[error("Network error: {0}")]
    NetworkError(String),

    /// HTTP endpoint returned an error status
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid argument supplied by the user
    #[error("{0}")]
    InvalidArgument(String),

    /// Configuration validation failed
    #[error("Validation error: {}", join_issues(.0))]
    ValidationError(Vec<ValidationIssue>),

    /// Bencode/JSON/TOML decoding failed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Nothing left to put in a reduced torrent
    #[error("No files to include in the filtered torrent")]
    EmptySelection,

    /// The download engine reported the torrent in an error state
    #[error("Download engine error: {0}")]
    EngineError(String),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TorrentFilterError {
    /// Check if this error is transient and retryable
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TorrentFilterError::TimedOut(_)
                | TorrentFilterError::NetworkError(_)
                | TorrentFilterError::ApiError {
                    status: 408 | 429 | 502 | 503 | 504,
                    ..
                }
        )
    }

    /// Check if this error indicates the download engine is unreachable
    pub fn is_server_unavailable(&self) -> bool {
        matches!(
            self,
            TorrentFilterError::TimedOut(_) | TorrentFilterError::NetworkError(_)
        )
    }
}

// === Conversion Implementations ===

macro_rules! impl_from_error {
    ($err_type:ty, $arm:pat => $body:expr) => {
        impl From<$err_type> for TorrentFilterError {
            fn from(err: $err_type) -> Self {
                match err {
                    $arm => $body,
                }
            }
        }
    };
}

impl_from_error!(std::io::Error, e => match e.kind() {
    std::io::ErrorKind::NotFound => TorrentFilterError::NotFound(e.to_string()),
    std::io::ErrorKind::PermissionDenied => TorrentFilterError::PermissionDenied(e.to_string()),
    std::io::ErrorKind::TimedOut => TorrentFilterError::TimedOut(e.to_string()),
    std::io::ErrorKind::InvalidInput => TorrentFilterError::InvalidArgument(e.to_string()),
    _ => TorrentFilterError::IoError(e.to_string()),
});

impl_from_error!(reqwest::Error, e => if e.is_timeout() {
    TorrentFilterError::TimedOut(e.to_string())
} else if e.is_connect() {
    TorrentFilterError::NetworkError(format!("Server disconnected: {}", e))
} else if e.is_request() {
    TorrentFilterError::NetworkError(e.to_string())
} else if let Some(status) = e.status() {
    TorrentFilterError::ApiError {
        status: status.as_u16(),
        message: e.to_string(),
    }
} else {
    TorrentFilterError::IoError(format!("HTTP error: {}", e))
});

impl_from_error!(serde_json::Error, e => TorrentFilterError::ParseError(e.to_string()));
impl_from_error!(serde_bencode::Error, e => TorrentFilterError::ParseError(e.to_string()));
impl_from_error!(toml::de::Error, e => TorrentFilterError::ParseError(e.to_string()));

/// Result type alias for operations that can fail with TorrentFilterError.
pub type TorrentFilterResult<T> = Result<T, TorrentFilterError>;
