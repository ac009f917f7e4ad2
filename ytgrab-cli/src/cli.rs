// ytgrab-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "ytgrab: YouTube download and media analysis tools",
    long_about = "Downloads YouTube videos and playlists via yt-dlp with a defined \
                  quality fallback policy, and analyzes local downloads with \
                  ffprobe/mediainfo."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed logging output (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download videos or playlists from YouTube URLs
    Download(DownloadArgs),
    /// List the available formats for a video URL
    Formats(FormatsArgs),
    /// Analyze local video files for resolution and size
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// YouTube video/playlist URLs
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Video quality: best | worst | <height>p (e.g. 1080p)
    #[arg(short, long, default_value = "best", value_name = "QUALITY")]
    pub quality: String,

    /// Download audio only (extracted to MP3)
    #[arg(short, long)]
    pub audio_only: bool,

    /// Output merge container
    #[arg(short = 'f', long = "format", value_name = "FORMAT",
          value_parser = ["mp4", "webm", "mkv"], default_value = "mp4")]
    pub output_format: String,

    /// Preferred container for breaking ties between equal formats
    #[arg(long, value_name = "EXT")]
    pub container: Option<String>,

    /// Output directory (defaults to the platform download folder)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Disable the playlist download archive (may redownload items)
    #[arg(long)]
    pub no_archive: bool,

    /// Custom path to the yt-dlp download archive file
    #[arg(long, value_name = "FILE")]
    pub archive_file: Option<PathBuf>,

    /// Append [id] to filenames to avoid title collisions
    #[arg(long)]
    pub append_id: bool,

    /// Download retry count
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub retries: u32,

    /// Fragment retry count
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub fragment_retries: u32,
}

#[derive(Parser, Debug)]
pub struct FormatsArgs {
    /// YouTube video URL (for playlists, the first entry is shown)
    #[arg(required = true, value_name = "URL")]
    pub url: String,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Folder containing downloaded video files
    #[arg(default_value = ".", value_name = "DIR")]
    pub path: PathBuf,
}
