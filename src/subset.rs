//! Reduced torrent containing only the selected files.
//!
//! The reduced descriptor keeps the trackers, comment, name and piece
//! length of the original and lists only the selected files. Piece hashes
//! are not carried over: pieces straddle file boundaries, so the original
//! hashes do not describe the reduced layout. Downloads therefore always go
//! through the original descriptor.

use crate::error::{TorrentFilterError, TorrentFilterResult};
use crate::torrent::{FileEntry, Info, MetaInfo, TorrentFile};
use serde_bytes::ByteBuf;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const CREATED_BY: &str = "Torrent Month Filter";

/// Append `.torrent` unless the path already ends with it.
pub fn normalize_output_path(path: &Path) -> PathBuf {
    let as_str = path.to_string_lossy();
    if as_str.ends_with(".torrent") {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}.torrent", as_str))
    }
}

/// Build a descriptor listing only `selected` (1-based indices into `original`).
pub fn build_subset(
    original: &MetaInfo,
    selected: &[TorrentFile],
) -> TorrentFilterResult<MetaInfo> {
    let info = match &original.info.files {
        Some(entries) => {
            let files: Vec<FileEntry> = selected
                .iter()
                .filter_map(|f| {
                    let entry = entries.get(f.engine_index()).cloned();
                    if entry.is_none() {
                        warn!(index = f.index, "Selected index beyond original file list");
                    }
                    entry
                })
                .collect();
            if files.is_empty() {
                return Err(TorrentFilterError::EmptySelection);
            }
            Info {
                name: original.info.name.clone(),
                piece_length: original.info.piece_length,
                pieces: ByteBuf::new(),
                length: None,
                files: Some(files),
                private: original.info.private,
                source: original.info.source.clone(),
            }
        }
        None => {
            if !selected.iter().any(|f| f.index == 1) {
                return Err(TorrentFilterError::EmptySelection);
            }
            Info {
                pieces: ByteBuf::new(),
                ..original.info.clone()
            }
        }
    };

    let creation_date = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .ok();

    Ok(MetaInfo {
        announce: original.announce.clone(),
        announce_list: original.announce_list.clone(),
        comment: original.comment.clone(),
        created_by: Some(CREATED_BY.to_string()),
        creation_date,
        info,
    })
}

/// Build the reduced descriptor and write it to `output` (normalized).
/// Returns the path actually written.
pub async fn save_subset(
    original: &MetaInfo,
    selected: &[TorrentFile],
    output: &Path,
) -> anyhow::Result<PathBuf> {
    let subset = build_subset(original, selected)?;
    let bytes = subset.to_bytes()?;
    let path = normalize_output_path(output);

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(TorrentFilterError::from)?;
    debug!(
        path = %path.display(),
        files = selected.len(),
        bytes = bytes.len(),
        "Wrote filtered torrent"
    );

    Ok(path)
}
