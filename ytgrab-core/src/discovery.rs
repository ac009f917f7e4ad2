//! File discovery for the local analyzer.
//!
//! Scans the top level of a directory for video files by extension. Partial
//! downloads (`.part`) are reported separately so the analyzer can flag them
//! as incomplete rather than probing them.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Extensions treated as video files, matched case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov"];

/// Result of scanning a directory: complete video files plus any in-progress
/// `.part` leftovers.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    pub videos: Vec<PathBuf>,
    pub partials: Vec<PathBuf>,
}

/// Finds video files in the top level of `input_dir` (no recursion).
///
/// Returns `CoreError::NoFilesFound` when the directory contains neither
/// video files nor partial downloads.
pub fn find_video_files(input_dir: &Path) -> CoreResult<DiscoveredFiles> {
    let read_dir = std::fs::read_dir(input_dir)?;

    let mut found = DiscoveredFiles::default();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };

        if ext.eq_ignore_ascii_case("part") {
            found.partials.push(path);
        } else if VIDEO_EXTENSIONS
            .iter()
            .any(|v| ext.eq_ignore_ascii_case(v))
        {
            found.videos.push(path);
        }
    }

    if found.videos.is_empty() && found.partials.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    found.videos.sort();
    found.partials.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn finds_videos_and_partials() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp4", "b.MKV", "c.webm.part", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let found = find_video_files(dir.path()).unwrap();
        assert_eq!(found.videos.len(), 2);
        assert_eq!(found.partials.len(), 1);
        assert!(found.videos[0].ends_with("a.mp4"));
        assert!(found.videos[1].ends_with("b.MKV"));
    }

    #[test]
    fn empty_directory_is_no_files_found() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("readme.md")).unwrap();
        assert!(matches!(
            find_video_files(dir.path()),
            Err(CoreError::NoFilesFound)
        ));
    }

    #[test]
    fn does_not_recurse() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("nested.mp4")).unwrap();
        File::create(dir.path().join("top.mp4")).unwrap();

        let found = find_video_files(dir.path()).unwrap();
        assert_eq!(found.videos.len(), 1);
    }
}
