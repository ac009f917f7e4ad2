//! FFprobe integration for local media inspection.
//!
//! Uses the ffprobe crate to extract the dimensions, duration, and container
//! of a downloaded file. This is the primary probe; `mediainfo_executor`
//! covers machines without an ffmpeg install.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::probe::ProbeResult;
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Probes a local file with ffprobe.
///
/// Fails with `CoreError::Probe` when the file has no video stream or is
/// missing dimensions, and with command errors when ffprobe itself fails.
pub fn probe_ffprobe(input_path: &Path) -> CoreResult<ProbeResult> {
    log::debug!("Running ffprobe (via crate) on: {}", input_path.display());

    let metadata = ffprobe(input_path).map_err(map_ffprobe_error)?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());

    let container = Some(metadata.format.format_name.clone());

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::Probe(format!("no video stream in {}", input_path.display()))
        })?;

    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
        _ => {
            return Err(CoreError::Probe(format!(
                "video stream missing dimensions in {}",
                input_path.display()
            )));
        }
    };

    Ok(ProbeResult {
        width,
        height,
        duration_secs,
        container,
    })
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                CoreError::DependencyNotFound("ffprobe".to_string())
            } else {
                command_start_error("ffprobe", io_err)
            }
        }
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error("ffprobe", output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::JsonParse(format!("ffprobe output deserialization: {err}"))
        }
        _ => CoreError::Probe(format!("unknown ffprobe error: {err:?}")),
    }
}
