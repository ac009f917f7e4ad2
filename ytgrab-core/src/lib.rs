//! Core library for the ytgrab download and media analysis tools.
//!
//! The heart of this crate is the pure format resolver in [`resolver`],
//! which picks the best matching stream (or video+audio pair) for a quality
//! request. Everything around it wraps external binaries: yt-dlp for
//! listing formats and downloading, ffprobe/mediainfo for inspecting local
//! files.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ytgrab_core::{QualityRequest, Resolution, resolve};
//! use ytgrab_core::external::list_formats;
//!
//! let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
//! let formats = list_formats(url).unwrap();
//! let request = QualityRequest::parse("1080p").unwrap();
//! match resolve(&request, &formats).unwrap() {
//!     Resolution::Selected(result) => {
//!         println!("selected: {:?}", result.selected);
//!         if result.fallback_applied {
//!             println!("fallback: {:?}", result.reason);
//!         }
//!     }
//!     Resolution::Listing(_) => unreachable!(),
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod probe;
pub mod resolver;
pub mod url;
pub mod utils;

// Re-exports for public API
pub use analysis::{FileReport, FolderReport, SizeHint, analyze_folder};
pub use config::{CoreConfig, default_download_dir};
pub use discovery::find_video_files;
pub use error::{CoreError, CoreResult};
pub use probe::{ProbeResult, probe};
pub use resolver::{
    FallbackReason, FormatDescriptor, QualityMode, QualityRequest, Resolution, ResolutionResult,
    Selection, StreamKind, resolve,
};
pub use utils::{format_bytes, format_duration, sanitize_filename};
