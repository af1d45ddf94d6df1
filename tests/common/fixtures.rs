//! Test fixtures for torrent data
//!
//! Descriptors are built through the crate's own model and encoded with
//! serde_bencode, so fixture bytes are always well-formed.

use serde_bytes::ByteBuf;
use std::path::{Path, PathBuf};
use torrent_month_filter::torrent::{FileEntry, Info, MetaInfo};

/// A multi-file torrent laid out like the monthly Reddit dumps.
///
/// | index | path                                |
/// |-------|-------------------------------------|
/// | 1     | reddit/comments/RC_2022-12.zst      |
/// | 2     | reddit/comments/RC_2023-01.zst      |
/// | 3     | reddit/comments/RC_2023-02.zst      |
/// | 4     | reddit/submissions/RS_2022-01.zst   |
/// | 5     | reddit/submissions/RS_2023-01.zst   |
/// | 6     | reddit/README.txt                   |
pub fn monthly_dump() -> MetaInfo {
    let file = |dir: &str, name: &str, length: u64| FileEntry {
        length,
        path: vec![dir.to_string(), name.to_string()],
    };

    MetaInfo {
        announce: Some("http://tracker.example/announce".to_string()),
        announce_list: Some(vec![
            vec!["http://tracker.example/announce".to_string()],
            vec!["udp://tracker.backup.example:1337/announce".to_string()],
        ]),
        comment: Some("Monthly comment and submission dumps".to_string()),
        created_by: Some("mktorrent 1.1".to_string()),
        creation_date: Some(1_700_000_000),
        info: Info {
            name: "reddit".to_string(),
            piece_length: 4 * 1024 * 1024,
            pieces: ByteBuf::from(vec![0xAB; 20 * 8]),
            length: None,
            files: Some(vec![
                file("comments", "RC_2022-12.zst", 30 * 1024 * 1024 * 1024),
                file("comments", "RC_2023-01.zst", 31 * 1024 * 1024 * 1024),
                file("comments", "RC_2023-02.zst", 28 * 1024 * 1024 * 1024),
                file("submissions", "RS_2022-01.zst", 5 * 1024 * 1024 * 1024),
                file("submissions", "RS_2023-01.zst", 700 * 1024 * 1024),
                FileEntry {
                    length: 512,
                    path: vec!["README.txt".to_string()],
                },
            ]),
            private: None,
            source: None,
        },
    }
}

pub fn monthly_dump_bytes() -> Vec<u8> {
    monthly_dump().to_bytes().unwrap()
}

/// Write `bytes` as `name` inside `dir` and return the full path.
pub fn write_torrent(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
