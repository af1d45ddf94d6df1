pub mod client;
pub mod types;

pub use client::{create_api_client, RqbitClient};
pub use types::{AddTorrentOptions, AddTorrentResponse, TorrentState, TorrentStats};
