//! Local media probing facade.
//!
//! Tries ffprobe first and mediainfo second, since ffprobe ships with every
//! ffmpeg install while mediainfo is a separate package.

use crate::error::{CoreError, CoreResult};
use crate::external::{probe_ffprobe, probe_mediainfo};
use std::path::Path;

/// Container/stream metadata for one local file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub duration_secs: Option<f64>,
    pub container: Option<String>,
}

impl ProbeResult {
    /// Display form like "1920x1080 (1080p)".
    pub fn resolution_label(&self) -> String {
        format!("{}x{} ({}p)", self.width, self.height, self.height)
    }
}

/// Probes a local file, trying ffprobe and then mediainfo.
///
/// Fails with the mediainfo error when both tools fail; the ffprobe failure
/// is logged at debug level so a missing ffprobe install stays quiet.
pub fn probe(path: &Path) -> CoreResult<ProbeResult> {
    match probe_ffprobe(path) {
        Ok(result) => Ok(result),
        Err(ffprobe_err) => {
            log::debug!(
                "ffprobe failed on {} ({ffprobe_err}), trying mediainfo",
                path.display()
            );
            probe_mediainfo(path).map_err(|mediainfo_err| {
                log::warn!(
                    "Both probe tools failed on {}: ffprobe: {ffprobe_err}; mediainfo: {mediainfo_err}",
                    path.display()
                );
                match mediainfo_err {
                    // Neither tool installed: surface that, not a file error.
                    CoreError::DependencyNotFound(_) => CoreError::Probe(
                        "no analysis tool available (install ffprobe or mediainfo)".to_string(),
                    ),
                    other => other,
                }
            })
        }
    }
}
