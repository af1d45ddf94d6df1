//! Bencoded torrent descriptor model.
//!
//! Decoding and encoding is delegated to `serde_bencode`; this module only
//! declares the dictionary layout and derives the flattened file list.

use crate::error::{TorrentFilterError, TorrentFilterResult};
use serde::{Deserialize, Serialize};
use serde_bencode::value::Value;
use serde_bytes::ByteBuf;
use sha1::{Digest, Sha1};
use std::fmt;

/// A `.torrent` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announce: Option<String>,
    #[serde(
        default,
        rename = "announce-list",
        skip_serializing_if = "Option::is_none"
    )]
    pub announce_list: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, rename = "created by", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(
        default,
        rename = "creation date",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<i64>,
    pub info: Info,
}

/// The `info` dictionary. Single-file torrents carry `length`, multi-file
/// torrents carry `files` and `name` is the root directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    #[serde(rename = "piece length")]
    pub piece_length: u64,
    pub pieces: ByteBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One element of `info.files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
}

/// A file of the torrent as presented to the user.
///
/// `index` is 1-based and always refers to the position in the original
/// descriptor, even after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub index: usize,
    pub path: String,
    pub length: u64,
}

impl TorrentFile {
    /// Position in the engine's 0-based file list. An index of 0 maps to 0.
    pub fn engine_index(&self) -> usize {
        self.index.saturating_sub(1)
    }
}

/// SHA-1 of the bencoded info dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl MetaInfo {
    pub fn from_bytes(buf: &[u8]) -> TorrentFilterResult<Self> {
        let meta: MetaInfo = serde_bencode::from_bytes(buf)?;
        if meta.info.length.is_none() && meta.info.files.is_none() {
            return Err(TorrentFilterError::ParseError(
                "info dictionary has neither 'length' nor 'files'".to_string(),
            ));
        }
        Ok(meta)
    }

    pub fn to_bytes(&self) -> TorrentFilterResult<Vec<u8>> {
        Ok(serde_bencode::to_bytes(self)?)
    }

    /// Flattened file list in descriptor order.
    pub fn files(&self) -> Vec<TorrentFile> {
        match &self.info.files {
            Some(files) => files
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let mut path = self.info.name.clone();
                    for component in &f.path {
                        path.push('/');
                        path.push_str(component);
                    }
                    TorrentFile {
                        index: i + 1,
                        path,
                        length: f.length,
                    }
                })
                .collect(),
            None => vec![TorrentFile {
                index: 1,
                path: self.info.name.clone(),
                length: self.info.length.unwrap_or(0),
            }],
        }
    }

    /// Every announce URL, the primary one first, without duplicates.
    pub fn announce_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.announce.iter().cloned().collect();
        for url in self.announce_list.iter().flatten().flatten() {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }

    pub fn total_size(&self) -> u64 {
        self.files().iter().map(|f| f.length).sum()
    }
}

/// Compute the info hash from the raw descriptor bytes.
///
/// The info dictionary is re-encoded through the generic bencode value so
/// that keys this crate does not model still contribute to the hash.
pub fn info_hash(buf: &[u8]) -> TorrentFilterResult<InfoHash> {
    let value: Value = serde_bencode::from_bytes(buf)?;
    let info = match value {
        Value::Dict(mut dict) => dict.remove(b"info".as_slice()),
        _ => None,
    }
    .ok_or_else(|| TorrentFilterError::ParseError("missing info dictionary".to_string()))?;

    let encoded = serde_bencode::to_bytes(&info)?;
    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    Ok(InfoHash(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_file() -> MetaInfo {
        MetaInfo {
            announce: Some("http://tracker.example/announce".to_string()),
            announce_list: Some(vec![
                vec!["http://tracker.example/announce".to_string()],
                vec!["udp://backup.example:6969".to_string()],
            ]),
            comment: Some("monthly dumps".to_string()),
            created_by: None,
            creation_date: None,
            info: Info {
                name: "reddit".to_string(),
                piece_length: 16384,
                pieces: ByteBuf::from(vec![0u8; 40]),
                length: None,
                files: Some(vec![
                    FileEntry {
                        length: 100,
                        path: vec!["comments".to_string(), "RC_2023-01.zst".to_string()],
                    },
                    FileEntry {
                        length: 200,
                        path: vec!["submissions".to_string(), "RS_2023-01.zst".to_string()],
                    },
                ]),
                private: None,
                source: None,
            },
        }
    }

    #[test]
    fn test_files_are_one_based_and_rooted_at_name() {
        let files = multi_file().files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].index, 1);
        assert_eq!(files[0].path, "reddit/comments/RC_2023-01.zst");
        assert_eq!(files[1].engine_index(), 1);
        assert_eq!(files[1].length, 200);
    }

    #[test]
    fn test_engine_index_does_not_underflow() {
        let file = TorrentFile {
            index: 0,
            path: "RC_2023-01.zst".to_string(),
            length: 1,
        };
        assert_eq!(file.engine_index(), 0);
    }

    #[test]
    fn test_single_file_torrent() {
        let mut meta = multi_file();
        meta.info.files = None;
        meta.info.length = Some(4096);
        meta.info.name = "RC_2020-05.zst".to_string();

        let files = meta.files();
        assert_eq!(
            files,
            vec![TorrentFile {
                index: 1,
                path: "RC_2020-05.zst".to_string(),
                length: 4096
            }]
        );
    }

    #[test]
    fn test_bencode_roundtrip_keeps_optional_fields_absent() {
        let meta = multi_file();
        let bytes = meta.to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("created by"));
        assert!(text.contains("13:announce-list"));

        let parsed = MetaInfo::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_rejects_info_without_files_or_length() {
        let mut meta = multi_file();
        meta.info.files = None;
        let bytes = meta.to_bytes().unwrap();
        assert!(matches!(
            MetaInfo::from_bytes(&bytes),
            Err(TorrentFilterError::ParseError(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(MetaInfo::from_bytes(b"<html>not a torrent</html>").is_err());
    }

    #[test]
    fn test_announce_urls_deduplicated() {
        assert_eq!(
            multi_file().announce_urls(),
            vec![
                "http://tracker.example/announce".to_string(),
                "udp://backup.example:6969".to_string()
            ]
        );
    }

    #[test]
    fn test_info_hash_matches_encoded_info() {
        let meta = multi_file();
        let bytes = meta.to_bytes().unwrap();

        let mut hasher = Sha1::new();
        hasher.update(serde_bencode::to_bytes(&meta.info).unwrap());
        let expected: [u8; 20] = hasher.finalize().into();

        let hash = info_hash(&bytes).unwrap();
        assert_eq!(hash.0, expected);
        assert_eq!(hash.to_string().len(), 40);
    }

    #[test]
    fn test_info_hash_changes_with_files() {
        let meta = multi_file();
        let mut other = meta.clone();
        other.info.files.as_mut().unwrap().pop();

        let a = info_hash(&meta.to_bytes().unwrap()).unwrap();
        let b = info_hash(&other.to_bytes().unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
