//! yt-dlp integration: metadata extraction, format listing, and downloads.
//!
//! All network work is delegated to the yt-dlp binary. Metadata comes from
//! `yt-dlp -J`, which prints one JSON document per URL; downloads run with
//! inherited stdio so yt-dlp's own progress output reaches the terminal.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::resolver::{FormatDescriptor, QualityMode, ResolutionResult, Selection, StreamKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const YTDLP_BIN: &str = "yt-dlp";

/// Metadata for a single video, with its available formats.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub uploader: String,
    pub duration_secs: Option<f64>,
    pub formats: Vec<FormatDescriptor>,
}

/// One entry of a flat playlist listing.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub title: String,
    pub url: Option<String>,
}

/// Metadata for a playlist, extracted without resolving each entry.
#[derive(Debug, Clone)]
pub struct PlaylistInfo {
    pub title: String,
    pub uploader: String,
    pub entries: Vec<PlaylistEntry>,
}

// ---- yt-dlp -J output (only the fields we read) ----

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    formats: Option<Vec<RawFormat>>,
    entries: Option<Vec<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    ext: Option<String>,
    height: Option<u32>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<u64>,
    filesize_approx: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
}

impl RawFormat {
    /// yt-dlp reports absent tracks as the literal string "none".
    fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(codec) if codec != "none" && !codec.is_empty())
    }

    fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(codec) if codec != "none" && !codec.is_empty())
    }

    fn filesize_estimate(&self) -> Option<u64> {
        self.filesize
            .or_else(|| self.filesize_approx.map(|approx| approx as u64))
    }

    /// Classifies into a descriptor; storyboard/image entries with neither
    /// track are dropped.
    fn into_descriptor(self) -> Option<FormatDescriptor> {
        let has_video = self.has_video();
        let has_audio = self.has_audio();
        let kind = match (has_video, has_audio) {
            (true, true) => StreamKind::Combined,
            (true, false) => StreamKind::Video,
            (false, true) => StreamKind::Audio,
            (false, false) => return None,
        };
        let filesize_estimate = self.filesize_estimate();
        Some(FormatDescriptor {
            id: self.format_id,
            kind,
            height: self.height,
            ext: self.ext.unwrap_or_else(|| "unknown".to_string()),
            has_audio,
            has_video,
            filesize_estimate,
        })
    }
}

fn run_json_query(args: &[&str], url: &str) -> CoreResult<RawInfo> {
    log::debug!("Running {YTDLP_BIN} {} {url}", args.join(" "));
    let output = Command::new(YTDLP_BIN)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::DependencyNotFound(YTDLP_BIN.to_string())
            } else {
                command_start_error(YTDLP_BIN, e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(command_failed_error(
            YTDLP_BIN,
            output.status,
            stderr.trim().to_string(),
        ));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| CoreError::JsonParse(format!("yt-dlp metadata for {url}: {e}")))
}

/// Fetches title, uploader, duration, and the format list for one video.
pub fn fetch_video_info(url: &str) -> CoreResult<VideoInfo> {
    let info = run_json_query(&["-J", "--no-warnings", "--no-playlist"], url)?;

    let formats = info
        .formats
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawFormat::into_descriptor)
        .collect();

    Ok(VideoInfo {
        title: info.title.unwrap_or_else(|| "Unknown".to_string()),
        uploader: info.uploader.unwrap_or_else(|| "Unknown".to_string()),
        duration_secs: info.duration,
        formats,
    })
}

/// Lists the available formats for one video.
pub fn list_formats(url: &str) -> CoreResult<Vec<FormatDescriptor>> {
    Ok(fetch_video_info(url)?.formats)
}

/// Fetches playlist metadata without resolving individual entries.
pub fn fetch_playlist_info(url: &str) -> CoreResult<PlaylistInfo> {
    let info = run_json_query(&["-J", "--no-warnings", "--flat-playlist"], url)?;

    let entries = info
        .entries
        .unwrap_or_default()
        .into_iter()
        .map(|e| PlaylistEntry {
            id: e.id,
            title: e.title.unwrap_or_else(|| "Unknown".to_string()),
            url: e.url,
        })
        .collect();

    Ok(PlaylistInfo {
        title: info.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
        uploader: info.uploader.unwrap_or_else(|| "Unknown".to_string()),
        entries,
    })
}

/// Builds the yt-dlp `-f` selector for a resolved format choice.
///
/// Resolved selections always name exact format ids; a paired selection
/// becomes `<video_id>+<audio_id>`, which yt-dlp muxes after download.
pub fn build_selector(result: &ResolutionResult) -> String {
    match &result.selected {
        Selection::Single(format) => format.id.clone(),
        Selection::Paired { video, audio } => format!("{}+{}", video.id, audio.id),
    }
}

/// Builds a quality-expression selector for cases where per-item resolution
/// is skipped (playlists, audio-only mode, or missing ffmpeg).
///
/// Without ffmpeg, only pre-merged formats are eligible since separate
/// streams could not be muxed.
pub fn quality_selector(mode: QualityMode, audio_only: bool, ffmpeg_available: bool) -> String {
    if audio_only {
        return "bestaudio/best".to_string();
    }

    match mode {
        QualityMode::Best | QualityMode::ListOnly => {
            if ffmpeg_available {
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio/best[ext=mp4]/best"
                    .to_string()
            } else {
                "best[ext=mp4]/best".to_string()
            }
        }
        QualityMode::Worst => "worst[ext=mp4]/worst".to_string(),
        QualityMode::Exact(height) => {
            if ffmpeg_available {
                format!(
                    "bestvideo[height={height}][ext=mp4]+bestaudio[ext=m4a]/\
                     bestvideo[height={height}]+bestaudio/\
                     best[height={height}]/best[height<={height}]"
                )
            } else {
                format!(
                    "best[height={height}][vcodec!=none][acodec!=none]/\
                     best[height<={height}][vcodec!=none][acodec!=none]/best"
                )
            }
        }
    }
}

/// Video ids recorded in a yt-dlp download archive file.
///
/// Archive lines look like `youtube <id>`; the last whitespace token of each
/// line is the id. A missing or unreadable archive reads as empty, matching
/// a fresh playlist folder.
pub fn read_archive_ids(archive_path: &Path) -> HashSet<String> {
    let Ok(contents) = std::fs::read_to_string(archive_path) else {
        return HashSet::new();
    };
    contents
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

/// How much of a playlist the download archive already covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub total: usize,
    pub downloaded: usize,
    pub remaining: usize,
}

/// Compares a flat playlist listing against a download archive file.
pub fn playlist_sync_status(entries: &[PlaylistEntry], archive_path: &Path) -> SyncStatus {
    let ids = read_archive_ids(archive_path);
    let downloaded = entries
        .iter()
        .filter(|e| e.id.as_deref().is_some_and(|id| ids.contains(id)))
        .count();
    SyncStatus {
        total: entries.len(),
        downloaded,
        remaining: entries.len().saturating_sub(downloaded),
    }
}

/// One download invocation: a URL, the selector to use, and where the
/// output goes.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub selector: String,
    pub output_template: PathBuf,
    pub playlist: bool,
    /// Archive file for resumable playlist downloads.
    pub archive: Option<PathBuf>,
}

/// Runs yt-dlp to perform the actual download. Progress output is yt-dlp's
/// own, written straight to the terminal.
pub fn download(job: &DownloadJob, config: &CoreConfig) -> CoreResult<()> {
    let mut cmd = Command::new(YTDLP_BIN);
    cmd.arg("-f")
        .arg(&job.selector)
        .arg("-o")
        .arg(&job.output_template)
        .arg("--restrict-filenames")
        .arg("--continue")
        .arg("--no-overwrites")
        .arg("--retries")
        .arg(config.retries.to_string())
        .arg("--fragment-retries")
        .arg(config.fragment_retries.to_string());

    if config.audio_only {
        cmd.args(["-x", "--audio-format", "mp3", "--audio-quality", "192K"]);
    } else {
        cmd.args(["--merge-output-format", &config.output_format]);
    }

    if job.playlist {
        // Keep going when individual playlist items fail.
        cmd.args(["--yes-playlist", "--ignore-errors"]);
        if let Some(archive) = &job.archive {
            cmd.arg("--download-archive").arg(archive);
        }
    } else {
        cmd.arg("--no-playlist");
    }

    cmd.arg(&job.url);

    log::debug!("Starting download: {cmd:?}");
    let status = cmd.status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoreError::DependencyNotFound(YTDLP_BIN.to_string())
        } else {
            command_start_error(YTDLP_BIN, e)
        }
    })?;

    if !status.success() {
        return Err(CoreError::Download(format!(
            "yt-dlp exited with {status} for {}",
            job.url
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FallbackReason;

    const SAMPLE_INFO: &str = r#"{
        "title": "Test Video",
        "uploader": "Test Channel",
        "duration": 212.5,
        "formats": [
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none"},
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
             "filesize": 3400000},
            {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1.640028",
             "acodec": "none", "filesize_approx": 52000000.7},
            {"format_id": "22", "ext": "mp4", "height": 720, "vcodec": "avc1.64001F",
             "acodec": "mp4a.40.2", "filesize": 31000000}
        ]
    }"#;

    fn parse_sample() -> Vec<FormatDescriptor> {
        let info: RawInfo = serde_json::from_str(SAMPLE_INFO).unwrap();
        info.formats
            .unwrap()
            .into_iter()
            .filter_map(RawFormat::into_descriptor)
            .collect()
    }

    #[test]
    fn classifies_formats_and_drops_storyboards() {
        let formats = parse_sample();
        assert_eq!(formats.len(), 3);

        let audio = &formats[0];
        assert_eq!(audio.kind, StreamKind::Audio);
        assert_eq!(audio.height, None);
        assert_eq!(audio.filesize_estimate, Some(3_400_000));

        let video = &formats[1];
        assert_eq!(video.kind, StreamKind::Video);
        assert_eq!(video.height, Some(1080));
        // filesize_approx is used when filesize is absent.
        assert_eq!(video.filesize_estimate, Some(52_000_000));

        let combined = &formats[2];
        assert_eq!(combined.kind, StreamKind::Combined);
        assert!(combined.has_audio && combined.has_video);
    }

    #[test]
    fn selector_for_single_selection_is_the_id() {
        let formats = parse_sample();
        let result = ResolutionResult {
            selected: Selection::Single(formats[2].clone()),
            fallback_applied: false,
            reason: None,
        };
        assert_eq!(build_selector(&result), "22");
    }

    #[test]
    fn selector_for_paired_selection_joins_ids() {
        let formats = parse_sample();
        let result = ResolutionResult {
            selected: Selection::Paired {
                video: formats[1].clone(),
                audio: formats[0].clone(),
            },
            fallback_applied: true,
            reason: Some(FallbackReason::NeedsMux),
        };
        assert_eq!(build_selector(&result), "137+140");
    }

    #[test]
    fn archive_ids_take_the_last_token_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join(".download-archive.txt");
        std::fs::write(&archive, "youtube abc123\nyoutube def-456\n\n").unwrap();

        let ids = read_archive_ids(&archive);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("abc123"));
        assert!(ids.contains("def-456"));
    }

    #[test]
    fn missing_archive_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_archive_ids(&dir.path().join("absent.txt")).is_empty());
    }

    fn entry(id: Option<&str>) -> PlaylistEntry {
        PlaylistEntry {
            id: id.map(str::to_string),
            title: "Entry".to_string(),
            url: None,
        }
    }

    #[test]
    fn sync_status_counts_archived_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join(".download-archive.txt");
        std::fs::write(&archive, "youtube abc\nyoutube gone\n").unwrap();

        let entries = vec![entry(Some("abc")), entry(Some("new")), entry(None)];
        let status = playlist_sync_status(&entries, &archive);
        assert_eq!(status.total, 3);
        assert_eq!(status.downloaded, 1);
        assert_eq!(status.remaining, 2);
    }

    #[test]
    fn sync_status_against_missing_archive_counts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(Some("abc"))];
        let status = playlist_sync_status(&entries, &dir.path().join("absent.txt"));
        assert_eq!(status.downloaded, 0);
        assert_eq!(status.remaining, 1);
    }

    #[test]
    fn quality_selector_expressions() {
        assert_eq!(
            quality_selector(QualityMode::Best, true, true),
            "bestaudio/best"
        );
        assert_eq!(
            quality_selector(QualityMode::Worst, false, true),
            "worst[ext=mp4]/worst"
        );

        let exact = quality_selector(QualityMode::Exact(1080), false, true);
        assert!(exact.starts_with("bestvideo[height=1080][ext=mp4]+bestaudio[ext=m4a]"));
        assert!(exact.ends_with("best[height<=1080]"));

        // Without ffmpeg only pre-merged formats are acceptable.
        let no_ffmpeg = quality_selector(QualityMode::Exact(720), false, false);
        assert!(no_ffmpeg.contains("[vcodec!=none][acodec!=none]"));
        assert!(!no_ffmpeg.contains('+'));
    }
}
