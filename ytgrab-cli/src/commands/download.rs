//! The `download` command: fetch videos and playlists.
//!
//! Single videos go through the format resolver so the user sees exactly
//! which stream was picked and why a fallback happened. Playlists hand a
//! quality-expression selector to yt-dlp instead, which avoids probing every
//! entry up front and lets yt-dlp degrade per item.

use crate::cli::DownloadArgs;
use crate::output::{
    print_heading, print_info, print_section, print_success, print_warning, spinner,
};
use log::info;
use std::path::{Path, PathBuf};
use ytgrab_core::external::{
    self, DownloadJob, build_selector, download, fetch_playlist_info, fetch_video_info,
    playlist_sync_status, quality_selector,
};
use ytgrab_core::url::{is_playlist_url, validate_and_normalize};
use ytgrab_core::{
    CoreConfig, CoreError, CoreResult, FallbackReason, QualityMode, QualityRequest,
    ResolutionResult, Selection, default_download_dir, find_video_files, format_bytes,
    format_duration, probe, resolve, sanitize_filename,
};

const ARCHIVE_FILENAME: &str = ".download-archive.txt";

pub fn run_download(args: DownloadArgs) -> CoreResult<()> {
    let request = build_request(&args)?;
    let config = build_config(&args);
    config.validate()?;
    std::fs::create_dir_all(&config.download_dir)?;

    info!(
        "Download run {} starting with {} url(s)",
        crate::logging::get_timestamp(),
        args.urls.len()
    );

    external::check_dependency("yt-dlp")?;
    let ffmpeg_available = external::is_ffmpeg_available();
    if ffmpeg_available {
        print_success("ffmpeg detected - muxed high quality downloads available");
    } else {
        print_warning(
            "ffmpeg not found; downloads are limited to pre-merged formats \
             and high resolutions may be unavailable",
        );
    }
    print_info("Download directory", config.download_dir.display());

    let total = args.urls.len();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for (index, url) in args.urls.iter().enumerate() {
        if total > 1 {
            print_section(&format!("Processing {}/{}", index + 1, total));
        }
        match download_one(url, &request, &config, ffmpeg_available) {
            Ok(()) => successful += 1,
            Err(e) => {
                log::error!("Download failed for {url}: {e}");
                crate::output::print_error(&format!("{url}: {e}"));
                failed += 1;
            }
        }
    }

    if total > 1 {
        print_heading(&format!(
            "Summary: {successful} successful, {failed} failed"
        ));
    }

    if successful == 0 && failed > 0 {
        Err(CoreError::Download(format!(
            "all {failed} download(s) failed"
        )))
    } else {
        Ok(())
    }
}

fn build_request(args: &DownloadArgs) -> CoreResult<QualityRequest> {
    let mut request = QualityRequest::parse(&args.quality)?;
    if request.mode == QualityMode::ListOnly {
        return Err(CoreError::InvalidRequest(
            "quality 'list' is not valid here; use the formats command".to_string(),
        ));
    }
    request.preferred_container = args.container.clone();
    Ok(request)
}

fn build_config(args: &DownloadArgs) -> CoreConfig {
    let download_dir = args
        .output
        .clone()
        .unwrap_or_else(default_download_dir);
    let mut config = CoreConfig::new(download_dir);
    config.output_format = args.output_format.clone();
    config.audio_only = args.audio_only;
    config.use_archive = !args.no_archive;
    config.archive_file = args.archive_file.clone();
    config.append_id = args.append_id;
    config.retries = args.retries;
    config.fragment_retries = args.fragment_retries;
    config
}

fn download_one(
    url: &str,
    request: &QualityRequest,
    config: &CoreConfig,
    ffmpeg_available: bool,
) -> CoreResult<()> {
    let url = validate_and_normalize(url)?;
    if is_playlist_url(&url) {
        download_playlist(&url, request, config, ffmpeg_available)
    } else {
        download_video(&url, request, config, ffmpeg_available)
    }
}

fn download_video(
    url: &str,
    request: &QualityRequest,
    config: &CoreConfig,
    ffmpeg_available: bool,
) -> CoreResult<()> {
    let bar = spinner("Analyzing video...");
    let video = fetch_video_info(url);
    bar.finish_and_clear();
    let video = video?;

    print_info("Title", &video.title);
    print_info("Uploader", &video.uploader);
    if let Some(duration) = video.duration_secs {
        print_info("Duration", format_duration(duration));
    }

    let selector = if config.audio_only {
        quality_selector(request.mode, true, ffmpeg_available)
    } else {
        let result = resolve(request, &video.formats)?.into_selected();

        if let Some(notice) = fallback_notice(request.mode, &result) {
            print_warning(&notice);
        }
        if let Some(size) = result.selected.filesize_estimate() {
            print_info("Estimated size", format_bytes(size));
        }

        if matches!(result.selected, Selection::Paired { .. }) && !ffmpeg_available {
            // The resolved pair cannot be muxed; let yt-dlp pick from
            // pre-merged formats instead.
            print_warning(
                "resolved formats require muxing but ffmpeg is missing; \
                 using best pre-merged format",
            );
            quality_selector(request.mode, false, false)
        } else {
            build_selector(&result)
        }
    };

    info!("Using format selector: {selector}");

    let job = DownloadJob {
        url: url.to_string(),
        selector,
        output_template: config.download_dir.join(output_template(config, false)),
        playlist: false,
        archive: None,
    };
    download(&job, config)?;

    if let QualityMode::Exact(requested) = request.mode {
        if !config.audio_only {
            verify_downloaded_quality(&config.download_dir, requested);
        }
    }

    print_success(&format!("Downloaded: {}", video.title));
    Ok(())
}

/// Probes the file that just landed on disk and warns when it falls short
/// of an exact-height request. Verification failures are non-fatal; the
/// download itself already succeeded.
fn verify_downloaded_quality(dir: &Path, requested: u32) {
    let Some(path) = newest_video_file(dir) else {
        log::debug!("No video file found in {} to verify", dir.display());
        return;
    };
    match probe(&path) {
        Ok(result) => {
            print_info("Downloaded resolution", result.resolution_label());
            if let Some(notice) = quality_shortfall(requested, result.height) {
                print_warning(&notice);
            }
        }
        Err(e) => {
            log::debug!("Could not verify quality of {}: {e}", path.display());
        }
    }
}

fn newest_video_file(dir: &Path) -> Option<PathBuf> {
    let discovered = find_video_files(dir).ok()?;
    discovered
        .videos
        .into_iter()
        .max_by_key(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok())
}

/// Warning text when the downloaded height falls short of the request.
fn quality_shortfall(requested: u32, actual: u32) -> Option<String> {
    if actual < requested {
        Some(format!(
            "expected {requested}p but got {actual}p; the video may not be \
             available in the requested quality"
        ))
    } else {
        None
    }
}

fn download_playlist(
    url: &str,
    request: &QualityRequest,
    config: &CoreConfig,
    ffmpeg_available: bool,
) -> CoreResult<()> {
    let bar = spinner("Analyzing playlist...");
    let playlist = fetch_playlist_info(url);
    bar.finish_and_clear();
    let playlist = playlist?;

    print_info("Playlist", &playlist.title);
    print_info("Uploader", &playlist.uploader);
    print_info("Videos", playlist.entries.len());

    let folder = config
        .download_dir
        .join(sanitize_filename(&playlist.title));
    std::fs::create_dir_all(&folder)?;

    let archive = archive_path(config, &folder);
    if let Some(path) = &archive {
        info!("Using download archive: {}", path.display());
        let status = playlist_sync_status(&playlist.entries, path);
        print_info(
            "Sync status",
            format!(
                "{} downloaded, {} remaining, total {}",
                status.downloaded, status.remaining, status.total
            ),
        );
    }

    let selector = quality_selector(request.mode, config.audio_only, ffmpeg_available);
    info!("Using format selector: {selector}");

    let job = DownloadJob {
        url: url.to_string(),
        selector,
        output_template: folder.join(output_template(config, true)),
        playlist: true,
        archive,
    };
    download(&job, config)?;

    print_success(&format!(
        "Playlist downloaded to: {}",
        folder.display()
    ));
    Ok(())
}

fn archive_path(config: &CoreConfig, playlist_folder: &std::path::Path) -> Option<PathBuf> {
    if !config.use_archive {
        return None;
    }
    Some(
        config
            .archive_file
            .clone()
            .unwrap_or_else(|| playlist_folder.join(ARCHIVE_FILENAME)),
    )
}

fn output_template(config: &CoreConfig, playlist: bool) -> String {
    match (playlist, config.append_id) {
        (true, true) => "%(playlist_index)s - %(title)s [%(id)s].%(ext)s".to_string(),
        (true, false) => "%(playlist_index)s - %(title)s.%(ext)s".to_string(),
        (false, true) => "%(title)s [%(id)s].%(ext)s".to_string(),
        (false, false) => "%(title)s.%(ext)s".to_string(),
    }
}

/// User-facing notice for a degraded selection, e.g.
/// "requested 1080p unavailable, falling back to 720p".
fn fallback_notice(mode: QualityMode, result: &ResolutionResult) -> Option<String> {
    if !result.fallback_applied {
        return None;
    }
    let reason = result.reason?;

    let selected_height = result.selected.height();
    Some(match (reason, mode, selected_height) {
        (FallbackReason::NeedsMux, _, _) => {
            "no combined stream at this quality; video and audio will be \
             downloaded separately and muxed"
                .to_string()
        }
        (FallbackReason::HeightDowngrade, QualityMode::Exact(requested), Some(height)) => {
            format!("requested {requested}p unavailable, falling back to {height}p")
        }
        (FallbackReason::NoMatchLowestAvailable, QualityMode::Exact(requested), Some(height)) => {
            format!(
                "nothing available at or below {requested}p, using lowest available ({height}p)"
            )
        }
        (reason, _, _) => reason.describe().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytgrab_core::{FormatDescriptor, StreamKind};

    fn descriptor(id: &str, kind: StreamKind, height: Option<u32>) -> FormatDescriptor {
        FormatDescriptor {
            id: id.to_string(),
            kind,
            height,
            ext: "mp4".to_string(),
            has_audio: kind != StreamKind::Video,
            has_video: kind != StreamKind::Audio,
            filesize_estimate: None,
        }
    }

    #[test]
    fn no_notice_without_fallback() {
        let result = ResolutionResult {
            selected: Selection::Single(descriptor("22", StreamKind::Combined, Some(720))),
            fallback_applied: false,
            reason: None,
        };
        assert!(fallback_notice(QualityMode::Exact(720), &result).is_none());
    }

    #[test]
    fn downgrade_notice_names_both_heights() {
        let result = ResolutionResult {
            selected: Selection::Single(descriptor("22", StreamKind::Combined, Some(720))),
            fallback_applied: true,
            reason: Some(FallbackReason::HeightDowngrade),
        };
        let notice = fallback_notice(QualityMode::Exact(1080), &result).unwrap();
        assert!(notice.contains("1080p"));
        assert!(notice.contains("720p"));
    }

    #[test]
    fn mux_notice_mentions_muxing() {
        let result = ResolutionResult {
            selected: Selection::Paired {
                video: descriptor("137", StreamKind::Video, Some(1080)),
                audio: descriptor("140", StreamKind::Audio, None),
            },
            fallback_applied: true,
            reason: Some(FallbackReason::NeedsMux),
        };
        let notice = fallback_notice(QualityMode::Exact(1080), &result).unwrap();
        assert!(notice.contains("muxed"));
    }

    #[test]
    fn shortfall_warns_only_below_the_request() {
        let notice = quality_shortfall(1080, 720).unwrap();
        assert!(notice.contains("1080p"));
        assert!(notice.contains("720p"));

        assert!(quality_shortfall(1080, 1080).is_none());
        assert!(quality_shortfall(720, 1080).is_none());
    }

    #[test]
    fn playlist_template_numbers_entries() {
        let mut config = CoreConfig::new(PathBuf::from("/tmp"));
        assert_eq!(
            output_template(&config, true),
            "%(playlist_index)s - %(title)s.%(ext)s"
        );
        config.append_id = true;
        assert!(output_template(&config, false).contains("[%(id)s]"));
    }
}
