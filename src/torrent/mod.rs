pub mod metainfo;
pub mod source;

pub use metainfo::{info_hash, FileEntry, Info, InfoHash, MetaInfo, TorrentFile};
pub use source::{Fetcher, TorrentSource};
