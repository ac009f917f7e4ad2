//! MediaInfo integration, the fallback probe for machines without ffprobe.
//!
//! Runs `mediainfo --Output=JSON` and picks the video track out of the
//! track list. MediaInfo reports numeric fields as strings.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::probe::ProbeResult;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

const MEDIAINFO_BIN: &str = "mediainfo";

#[derive(Debug, Deserialize)]
struct MediaInfoOutput {
    media: Option<MediaInfoMedia>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoMedia {
    #[serde(rename = "track", default)]
    tracks: Vec<MediaInfoTrack>,
}

#[derive(Debug, Deserialize)]
struct MediaInfoTrack {
    #[serde(rename = "@type")]
    track_type: String,
    #[serde(rename = "Width")]
    width: Option<String>,
    #[serde(rename = "Height")]
    height: Option<String>,
    #[serde(rename = "Duration")]
    duration: Option<String>,
    #[serde(rename = "Format")]
    format: Option<String>,
}

/// Probes a local file with mediainfo.
pub fn probe_mediainfo(input_path: &Path) -> CoreResult<ProbeResult> {
    log::debug!("Running mediainfo on: {}", input_path.display());

    let output = Command::new(MEDIAINFO_BIN)
        .arg("--Output=JSON")
        .arg(input_path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::DependencyNotFound(MEDIAINFO_BIN.to_string())
            } else {
                command_start_error(MEDIAINFO_BIN, e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(command_failed_error(MEDIAINFO_BIN, output.status, stderr));
    }

    let parsed: MediaInfoOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| CoreError::JsonParse(format!("mediainfo output: {e}")))?;

    extract_video_track(parsed, input_path)
}

fn extract_video_track(parsed: MediaInfoOutput, input_path: &Path) -> CoreResult<ProbeResult> {
    let tracks = parsed.media.map(|m| m.tracks).unwrap_or_default();

    let video = tracks
        .iter()
        .find(|t| t.track_type == "Video")
        .ok_or_else(|| {
            CoreError::Probe(format!("no video track in {}", input_path.display()))
        })?;

    let width = parse_numeric(video.width.as_deref());
    let height = parse_numeric(video.height.as_deref());
    let (Some(width), Some(height)) = (width, height) else {
        return Err(CoreError::Probe(format!(
            "video track missing dimensions in {}",
            input_path.display()
        )));
    };

    let duration_secs = video
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());

    Ok(ProbeResult {
        width,
        height,
        duration_secs,
        container: video.format.clone(),
    })
}

fn parse_numeric(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.parse::<u32>().ok()).filter(|&v| v > 0)
}
