//! Core configuration for download operations.
//!
//! Instances of [`CoreConfig`] are created by the consumer (the CLI) and
//! passed into the yt-dlp executor. The download directory is always an
//! explicit value here, never ambient process state.

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

/// Default retry count for whole-file downloads.
pub const DEFAULT_RETRIES: u32 = 10;

/// Default retry count for individual HLS/DASH fragments.
pub const DEFAULT_FRAGMENT_RETRIES: u32 = 10;

/// Default merge container for video downloads.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp4";

/// Subdirectory of the platform download folder used by default.
const DOWNLOAD_SUBDIR: &str = "YouTube_Downloads";

/// Configuration for download operations.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory downloads are written to (playlists get a subfolder).
    pub download_dir: PathBuf,
    /// Merge container passed to yt-dlp (`mp4`, `webm`, `mkv`).
    pub output_format: String,
    /// Extract audio to mp3 instead of downloading video.
    pub audio_only: bool,
    /// Track completed playlist items in a download archive file.
    pub use_archive: bool,
    /// Custom archive file path; defaults to one inside the playlist folder.
    pub archive_file: Option<PathBuf>,
    /// Append `[id]` to filenames to avoid title collisions.
    pub append_id: bool,
    pub retries: u32,
    pub fragment_retries: u32,
}

impl CoreConfig {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            audio_only: false,
            use_archive: true,
            archive_file: None,
            append_id: false,
            retries: DEFAULT_RETRIES,
            fragment_retries: DEFAULT_FRAGMENT_RETRIES,
        }
    }

    /// Checks the configuration for values the executor cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.download_dir.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "download directory must not be empty".to_string(),
            ));
        }
        match self.output_format.as_str() {
            "mp4" | "webm" | "mkv" => Ok(()),
            other => Err(CoreError::Config(format!(
                "unsupported output format '{other}' (expected mp4, webm, or mkv)"
            ))),
        }
    }
}

/// Platform default download path: `<Downloads>/YouTube_Downloads`, falling
/// back to `~/Downloads/YouTube_Downloads` when the platform folder cannot
/// be determined.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DOWNLOAD_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CoreConfig::new(PathBuf::from("/tmp/downloads"));
        assert!(config.validate().is_ok());
        assert_eq!(config.output_format, "mp4");
        assert!(config.use_archive);
        assert_eq!(config.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let mut config = CoreConfig::new(PathBuf::from("/tmp/downloads"));
        config.output_format = "avi".to_string();
        assert!(matches!(
            config.validate(),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn rejects_empty_download_dir() {
        let config = CoreConfig::new(PathBuf::new());
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn default_dir_ends_with_subfolder() {
        assert!(default_download_dir().ends_with(DOWNLOAD_SUBDIR));
    }
}
