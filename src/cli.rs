use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "torrent-month-filter")]
#[command(about = "List and filter torrent files by month", version)]
pub struct Cli {
    /// Path or URL to the torrent file
    pub torrent: String,

    /// Month to filter (1-12)
    #[arg(short, long, allow_negative_numbers = true)]
    pub month: i64,

    /// Optional year to filter
    #[arg(short, long)]
    pub year: Option<u32>,

    /// Output path for filtered torrent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download filtered files
    #[arg(short, long)]
    pub download: bool,

    /// Directory to save downloaded files
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// URL of the rqbit HTTP API
    #[arg(long, env = "TORRENT_MONTH_FILTER_API_URL")]
    pub api_url: Option<String>,

    /// Path to a TOML or JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
