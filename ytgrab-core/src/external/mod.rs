//! Interactions with external CLI tools.
//!
//! This module encapsulates the subprocess boundaries of ytgrab: yt-dlp for
//! listing formats and downloading, the ffprobe crate and a mediainfo
//! fallback for local file inspection, and dependency checking for all of
//! them. Nothing outside this module spawns processes.

use crate::error::{CoreError, CoreResult, command_start_error};
use std::io;
use std::process::{Command, Stdio};

pub mod ffprobe_executor;
pub mod mediainfo_executor;
pub mod ytdlp;

pub use ffprobe_executor::probe_ffprobe;
pub use mediainfo_executor::probe_mediainfo;
pub use ytdlp::{
    DownloadJob, PlaylistInfo, SyncStatus, VideoInfo, build_selector, download, fetch_playlist_info,
    fetch_video_info, list_formats, playlist_sync_status, quality_selector, read_archive_ids,
};

/// Checks that a required external command is available and executable by
/// invoking it with `--version`.
///
/// Returns `CoreError::DependencyNotFound` when the binary is absent and
/// `CoreError::CommandStart` when it exists but cannot be started.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(command_start_error(cmd_name, e))
        }
    }
}

/// Whether ffmpeg is present. Muxing separate video and audio streams is
/// only possible when it is; without it the downloader restricts itself to
/// combined streams.
pub fn is_ffmpeg_available() -> bool {
    check_dependency("ffmpeg").is_ok()
}
