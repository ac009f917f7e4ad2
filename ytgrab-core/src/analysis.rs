//! Local download analysis: resolution checks and size heuristics.
//!
//! Checks whether a file on disk actually has the quality its download was
//! supposed to deliver. The
//! size notes are heuristics only; small files often indicate low-quality
//! downloads, but the probe result is the authoritative resolution.

use crate::discovery::find_video_files;
use crate::error::CoreResult;
use crate::probe::{ProbeResult, probe};
use std::path::{Path, PathBuf};

const MIB: u64 = 1024 * 1024;

/// Size-based quality note, keyed off thresholds that have proven useful
/// for typical YouTube content lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeHint {
    /// < 20 MiB: likely a very low quality download.
    VerySmall,
    /// < 50 MiB: possibly 480p or lower.
    Small,
    /// < 100 MiB: possibly 720p.
    Moderate,
    /// 100 to 200 MiB: nothing to say either way.
    Unremarkable,
    /// > 200 MiB: likely 1080p or better.
    Large,
}

impl SizeHint {
    pub fn for_size(bytes: u64) -> Self {
        match bytes {
            b if b < 20 * MIB => SizeHint::VerySmall,
            b if b < 50 * MIB => SizeHint::Small,
            b if b < 100 * MIB => SizeHint::Moderate,
            b if b <= 200 * MIB => SizeHint::Unremarkable,
            _ => SizeHint::Large,
        }
    }

    /// Note text for display; `None` when there is nothing worth flagging.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            SizeHint::VerySmall => Some("very small - likely low quality"),
            SizeHint::Small => Some("small - possibly 480p or lower"),
            SizeHint::Moderate => Some("moderate - possibly 720p"),
            SizeHint::Unremarkable => None,
            SizeHint::Large => Some("large - likely 1080p+"),
        }
    }
}

/// Analysis outcome for one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size_hint: SizeHint,
    /// Probe outcome; the error is kept so the caller can report files that
    /// no available tool could read.
    pub probe: CoreResult<ProbeResult>,
}

/// Analysis outcome for a directory.
#[derive(Debug)]
pub struct FolderReport {
    pub files: Vec<FileReport>,
    /// In-progress `.part` files, flagged as incomplete rather than probed.
    pub incomplete: Vec<PathBuf>,
    pub total_bytes: u64,
}

/// Analyzes every video file in the top level of `dir`.
///
/// Returns `CoreError::NoFilesFound` when the directory holds nothing to
/// analyze. Probe failures for individual files do not fail the run; they
/// are carried in the per-file reports.
pub fn analyze_folder(dir: &Path) -> CoreResult<FolderReport> {
    let discovered = find_video_files(dir)?;

    let mut total_bytes = 0u64;
    let mut files = Vec::with_capacity(discovered.videos.len());
    for path in discovered.videos {
        let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        total_bytes += size_bytes;

        let probe_result = probe(&path);
        if let Err(e) = &probe_result {
            log::warn!("Could not probe {}: {e}", path.display());
        }

        files.push(FileReport {
            path,
            size_bytes,
            size_hint: SizeHint::for_size(size_bytes),
            probe: probe_result,
        });
    }

    Ok(FolderReport {
        files,
        incomplete: discovered.partials,
        total_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_hints_follow_thresholds() {
        assert_eq!(SizeHint::for_size(5 * MIB), SizeHint::VerySmall);
        assert_eq!(SizeHint::for_size(30 * MIB), SizeHint::Small);
        assert_eq!(SizeHint::for_size(80 * MIB), SizeHint::Moderate);
        assert_eq!(SizeHint::for_size(150 * MIB), SizeHint::Unremarkable);
        assert_eq!(SizeHint::for_size(300 * MIB), SizeHint::Large);
    }

    #[test]
    fn boundary_values() {
        assert_eq!(SizeHint::for_size(20 * MIB), SizeHint::Small);
        assert_eq!(SizeHint::for_size(200 * MIB), SizeHint::Unremarkable);
        assert_eq!(SizeHint::for_size(200 * MIB + 1), SizeHint::Large);
    }

    #[test]
    fn unremarkable_has_no_note() {
        assert!(SizeHint::Unremarkable.note().is_none());
        assert!(SizeHint::VerySmall.note().is_some());
    }

    #[test]
    fn empty_folder_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(analyze_folder(dir.path()).is_err());
    }

    #[test]
    fn partial_files_are_reported_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("video.mp4.part")).unwrap();
        let report = analyze_folder(dir.path()).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.incomplete.len(), 1);
    }
}
