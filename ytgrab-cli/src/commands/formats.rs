//! The `formats` command: print every available format for a URL.
//!
//! Formats come back through the resolver's list-only mode and are grouped
//! the way people actually pick them: combined streams first, then
//! video-only (which need a mux), then audio-only.

use crate::cli::FormatsArgs;
use crate::output::{print_info, print_section, print_warning, spinner};
use ytgrab_core::external::{self, fetch_playlist_info, fetch_video_info};
use ytgrab_core::url::{is_playlist_url, validate_and_normalize, watch_url};
use ytgrab_core::{
    CoreError, CoreResult, FormatDescriptor, QualityMode, QualityRequest, Resolution, StreamKind,
    format_bytes, resolve,
};

pub fn run_formats(args: FormatsArgs) -> CoreResult<()> {
    external::check_dependency("yt-dlp")?;

    let mut url = validate_and_normalize(&args.url)?;
    if is_playlist_url(&url) {
        print_warning("URL is a playlist; showing formats for the first item only");
        url = first_entry_url(&url)?;
    }

    let bar = spinner("Getting available formats...");
    let video = fetch_video_info(&url);
    bar.finish_and_clear();
    let video = video?;

    print_info("Title", &video.title);

    let request = QualityRequest::new(QualityMode::ListOnly);
    let listing = match resolve(&request, &video.formats)? {
        Resolution::Listing(listing) => listing,
        Resolution::Selected(_) => unreachable!("list-only mode never selects"),
    };

    let mut combined: Vec<&FormatDescriptor> = Vec::new();
    let mut video_only: Vec<&FormatDescriptor> = Vec::new();
    let mut audio_only: Vec<&FormatDescriptor> = Vec::new();
    for format in listing.iter() {
        match format.kind {
            StreamKind::Combined => combined.push(format),
            StreamKind::Video => video_only.push(format),
            StreamKind::Audio => audio_only.push(format),
        }
    }

    // Height descending, size as the secondary key; audio by size alone.
    let by_quality = |f: &&FormatDescriptor| {
        (
            std::cmp::Reverse(f.height.unwrap_or(0)),
            std::cmp::Reverse(f.filesize_estimate.unwrap_or(0)),
        )
    };
    combined.sort_by_key(by_quality);
    video_only.sort_by_key(by_quality);
    audio_only.sort_by_key(|f| std::cmp::Reverse(f.filesize_estimate.unwrap_or(0)));

    if !combined.is_empty() {
        print_section("Combined (video+audio)");
        for format in &combined {
            println!("  {}", format_row(format));
        }
    }
    if !video_only.is_empty() {
        print_section("Video-only (requires merge for audio)");
        for format in &video_only {
            println!("  {}", format_row(format));
        }
    }
    if !audio_only.is_empty() {
        print_section("Audio-only");
        for format in &audio_only {
            println!("  {}", format_row(format));
        }
    }

    Ok(())
}

/// Resolves a playlist URL to its first entry's watch URL.
fn first_entry_url(url: &str) -> CoreResult<String> {
    let bar = spinner("Loading playlist...");
    let playlist = fetch_playlist_info(url);
    bar.finish_and_clear();
    let playlist = playlist?;

    let entry = playlist.entries.first().ok_or_else(|| {
        CoreError::InvalidUrl(format!("playlist has no entries: {url}"))
    })?;

    if let Some(id) = &entry.id {
        Ok(watch_url(id))
    } else if let Some(entry_url) = &entry.url {
        Ok(entry_url.clone())
    } else {
        Err(CoreError::InvalidUrl(
            "could not resolve first playlist entry".to_string(),
        ))
    }
}

fn format_row(format: &FormatDescriptor) -> String {
    let height = format
        .height
        .map(|h| format!("{h}p"))
        .unwrap_or_else(|| "-".to_string());
    let size = format
        .filesize_estimate
        .map(format_bytes)
        .unwrap_or_else(|| "?".to_string());
    format!(
        "id={:<10} {:>6}  {:<5} {}",
        format.id, height, format.ext, size
    )
}
