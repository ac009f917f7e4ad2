//! Quality/format resolution for a single media item.
//!
//! Given a user quality preference and the list of formats yt-dlp reports for
//! one video, [`resolve`] picks the best matching format or (video, audio)
//! pair, with a defined fallback order when the exact request cannot be
//! satisfied. The function is pure: it performs no I/O and never retries,
//! since re-resolving the same static format list is meaningless. Network
//! retry belongs to the yt-dlp layer.
//!
//! Fallback policy for exact-height requests: combined stream at the exact
//! height, then video-only at the exact height paired with the best audio,
//! then the nearest lower height, then the lowest available height overall.

use crate::error::{CoreError, CoreResult};

/// What kind of stream a format descriptor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Video track only; requires muxing with an audio format.
    Video,
    /// Audio track only.
    Audio,
    /// Both tracks in one stream; no post-download muxing needed.
    Combined,
}

/// Metadata for one downloadable stream variant, as reported by yt-dlp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Opaque format identifier (yt-dlp `format_id`).
    pub id: String,
    pub kind: StreamKind,
    /// Vertical resolution; absent for audio-only formats.
    pub height: Option<u32>,
    /// Container/codec tag (e.g. "mp4", "webm", "m4a").
    pub ext: String,
    pub has_audio: bool,
    pub has_video: bool,
    /// Estimated size in bytes, when the source reports one.
    pub filesize_estimate: Option<u64>,
}

impl FormatDescriptor {
    fn is_video_capable(&self) -> bool {
        matches!(self.kind, StreamKind::Video | StreamKind::Combined)
    }

    fn size_or_zero(&self) -> u64 {
        self.filesize_estimate.unwrap_or(0)
    }
}

/// Requested quality, constructed once from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityMode {
    /// A specific height such as 1080.
    Exact(u32),
    Best,
    Worst,
    /// No selection; the caller wants the raw format list.
    ListOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityRequest {
    pub mode: QualityMode,
    /// When set, breaks ties between equally-ranked candidates by container.
    pub preferred_container: Option<String>,
}

impl QualityRequest {
    pub fn new(mode: QualityMode) -> Self {
        Self {
            mode,
            preferred_container: None,
        }
    }

    pub fn with_container(mode: QualityMode, container: impl Into<String>) -> Self {
        Self {
            mode,
            preferred_container: Some(container.into()),
        }
    }

    /// Parses a user-facing quality string: "best", "worst", "list",
    /// or a height like "1080p" / "1080".
    pub fn parse(quality: &str) -> CoreResult<Self> {
        let q = quality.trim().to_ascii_lowercase();
        let mode = match q.as_str() {
            "" | "best" => QualityMode::Best,
            "worst" => QualityMode::Worst,
            "list" => QualityMode::ListOnly,
            other => {
                let digits = other.strip_suffix('p').unwrap_or(other);
                let height: u32 = digits.parse().map_err(|_| {
                    CoreError::InvalidRequest(format!(
                        "unrecognized quality '{quality}' (expected best|worst|<height>p)"
                    ))
                })?;
                QualityMode::Exact(height)
            }
        };
        Ok(Self::new(mode))
    }
}

/// Why the resolver had to degrade from the exact request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No combined stream at the requested height; video-only was paired
    /// with a separate audio stream and must be muxed after download.
    NeedsMux,
    /// The requested height is unavailable; a lower height was chosen.
    HeightDowngrade,
    /// Nothing at or below the requested height; the lowest available
    /// height was chosen instead.
    NoMatchLowestAvailable,
}

impl FallbackReason {
    /// Short human-readable description for user-facing fallback notices.
    pub fn describe(&self) -> &'static str {
        match self {
            FallbackReason::NeedsMux => "video and audio will be downloaded separately and muxed",
            FallbackReason::HeightDowngrade => "requested height unavailable, using a lower one",
            FallbackReason::NoMatchLowestAvailable => {
                "nothing at or below the requested height, using lowest available"
            }
        }
    }
}

/// The chosen format(s) for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// One stream, ready to download as-is.
    Single(FormatDescriptor),
    /// A video-only stream plus the audio stream to mux it with.
    Paired {
        video: FormatDescriptor,
        audio: FormatDescriptor,
    },
}

impl Selection {
    /// Height of the selected video stream, if any.
    pub fn height(&self) -> Option<u32> {
        match self {
            Selection::Single(f) => f.height,
            Selection::Paired { video, .. } => video.height,
        }
    }

    /// Combined estimated size of everything that will be downloaded.
    pub fn filesize_estimate(&self) -> Option<u64> {
        match self {
            Selection::Single(f) => f.filesize_estimate,
            Selection::Paired { video, audio } => match (
                video.filesize_estimate,
                audio.filesize_estimate,
            ) {
                (None, None) => None,
                (v, a) => Some(v.unwrap_or(0) + a.unwrap_or(0)),
            },
        }
    }
}

/// Outcome of one resolution request; consumed immediately by the download
/// step, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub selected: Selection,
    pub fallback_applied: bool,
    pub reason: Option<FallbackReason>,
}

/// Restartable view over all formats, for list-only requests.
///
/// No selection is performed; presentation is the caller's concern.
#[derive(Debug, Clone, Copy)]
pub struct FormatListing<'a> {
    formats: &'a [FormatDescriptor],
}

impl<'a> FormatListing<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a FormatDescriptor> {
        self.formats.iter()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl<'a> IntoIterator for &FormatListing<'a> {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}

/// Either a concrete selection or, for list-only mode, the full listing.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Selected(ResolutionResult),
    Listing(FormatListing<'a>),
}

impl<'a> Resolution<'a> {
    /// Unwraps the selected result; panics for list-only resolutions.
    /// Intended for callers that never pass `QualityMode::ListOnly`.
    pub fn into_selected(self) -> ResolutionResult {
        match self {
            Resolution::Selected(result) => result,
            Resolution::Listing(_) => {
                unreachable!("list-only resolution has no selection")
            }
        }
    }
}

/// Resolves a quality request against the formats available for one media
/// item.
///
/// The input order is preserved as supplied by the media source (typically
/// highest-to-lowest capability, but not guaranteed sorted); ties between
/// equally-ranked candidates go to the first encountered.
///
/// # Errors
///
/// * [`CoreError::NoFormatsAvailable`] when `formats` is empty.
/// * [`CoreError::InvalidRequest`] for an exact height of 0 or an empty
///   `preferred_container` string.
pub fn resolve<'a>(
    request: &QualityRequest,
    formats: &'a [FormatDescriptor],
) -> CoreResult<Resolution<'a>> {
    validate_request(request)?;

    if formats.is_empty() {
        return Err(CoreError::NoFormatsAvailable);
    }

    let ext = request.preferred_container.as_deref();

    let result = match request.mode {
        QualityMode::ListOnly => {
            return Ok(Resolution::Listing(FormatListing { formats }));
        }
        QualityMode::Exact(height) => resolve_exact(height, formats, ext),
        QualityMode::Best => resolve_extreme(formats, ext, Extreme::Best),
        QualityMode::Worst => resolve_extreme(formats, ext, Extreme::Worst),
    };

    Ok(Resolution::Selected(result))
}

fn validate_request(request: &QualityRequest) -> CoreResult<()> {
    if let QualityMode::Exact(height) = request.mode {
        if height == 0 {
            return Err(CoreError::InvalidRequest(
                "requested height must be positive".to_string(),
            ));
        }
    }
    if let Some(container) = request.preferred_container.as_deref() {
        if container.is_empty() {
            return Err(CoreError::InvalidRequest(
                "preferred container must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn resolve_exact(
    height: u32,
    formats: &[FormatDescriptor],
    ext: Option<&str>,
) -> ResolutionResult {
    if let Some(result) = select_at_height(height, formats, ext) {
        return result;
    }

    // Nearest lower height with a video descriptor, else lowest available.
    let heights_below = video_heights(formats).filter(|&h| h < height).max();
    if let Some(lower) = heights_below {
        let result = select_at_height(lower, formats, ext)
            .expect("height came from the format list");
        return ResolutionResult {
            fallback_applied: true,
            reason: Some(FallbackReason::HeightDowngrade),
            ..result
        };
    }

    match video_heights(formats).min() {
        Some(lowest) => {
            let result = select_at_height(lowest, formats, ext)
                .expect("height came from the format list");
            ResolutionResult {
                fallback_applied: true,
                reason: Some(FallbackReason::NoMatchLowestAvailable),
                ..result
            }
        }
        // No video-capable descriptors at all: degrade to the best audio.
        None => audio_only_result(formats),
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Best,
    Worst,
}

fn resolve_extreme(
    formats: &[FormatDescriptor],
    ext: Option<&str>,
    extreme: Extreme,
) -> ResolutionResult {
    let target = match extreme {
        Extreme::Best => video_heights(formats).max(),
        Extreme::Worst => video_heights(formats).min(),
    };

    let Some(target) = target else {
        return audio_only_result(formats);
    };

    // Combined beats a paired selection at the same height; within a kind,
    // rank by estimated filesize (greatest for best, smallest for worst).
    let combined: Vec<&FormatDescriptor> = formats
        .iter()
        .filter(|f| f.kind == StreamKind::Combined && f.height == Some(target))
        .collect();
    if !combined.is_empty() {
        let winner = pick_by_size(&combined, ext, extreme);
        return ResolutionResult {
            selected: Selection::Single(winner.clone()),
            fallback_applied: false,
            reason: None,
        };
    }

    let video_only: Vec<&FormatDescriptor> = formats
        .iter()
        .filter(|f| f.kind == StreamKind::Video && f.height == Some(target))
        .collect();
    let video = pick_by_size(&video_only, ext, extreme);
    pair_with_audio(video.clone(), formats)
}

/// Selects at one specific height: combined first, then video-only paired
/// with the best audio. Returns `None` when nothing video-capable exists at
/// that height.
fn select_at_height(
    height: u32,
    formats: &[FormatDescriptor],
    ext: Option<&str>,
) -> Option<ResolutionResult> {
    let combined: Vec<&FormatDescriptor> = formats
        .iter()
        .filter(|f| f.kind == StreamKind::Combined && f.height == Some(height))
        .collect();
    if !combined.is_empty() {
        let winner = prefer_ext(&combined, ext);
        return Some(ResolutionResult {
            selected: Selection::Single(winner.clone()),
            fallback_applied: false,
            reason: None,
        });
    }

    let video_only: Vec<&FormatDescriptor> = formats
        .iter()
        .filter(|f| f.kind == StreamKind::Video && f.height == Some(height))
        .collect();
    if !video_only.is_empty() {
        let video = prefer_ext(&video_only, ext);
        return Some(pair_with_audio(video.clone(), formats));
    }

    None
}

/// Pairs a video-only descriptor with the best available audio descriptor.
/// Degrades to a single video-only selection when no audio exists.
fn pair_with_audio(video: FormatDescriptor, formats: &[FormatDescriptor]) -> ResolutionResult {
    match best_audio(formats) {
        Some(audio) => ResolutionResult {
            selected: Selection::Paired {
                video,
                audio: audio.clone(),
            },
            fallback_applied: true,
            reason: Some(FallbackReason::NeedsMux),
        },
        None => ResolutionResult {
            selected: Selection::Single(video),
            fallback_applied: true,
            reason: Some(FallbackReason::NeedsMux),
        },
    }
}

/// Best audio-only descriptor: highest estimated size, first encountered on
/// ties.
fn best_audio(formats: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
    let mut best: Option<&FormatDescriptor> = None;
    for f in formats.iter().filter(|f| f.kind == StreamKind::Audio) {
        match best {
            Some(current) if f.size_or_zero() <= current.size_or_zero() => {}
            _ => best = Some(f),
        }
    }
    best
}

fn audio_only_result(formats: &[FormatDescriptor]) -> ResolutionResult {
    // Non-empty input with no video streams: the listing is all audio.
    let audio = best_audio(formats)
        .unwrap_or(&formats[0])
        .clone();
    ResolutionResult {
        selected: Selection::Single(audio),
        fallback_applied: true,
        reason: Some(FallbackReason::NoMatchLowestAvailable),
    }
}

/// Heights of all video-capable descriptors.
fn video_heights(formats: &[FormatDescriptor]) -> impl Iterator<Item = u32> + '_ {
    formats
        .iter()
        .filter(|f| f.is_video_capable())
        .filter_map(|f| f.height)
}

/// Among candidates ranked equal so far, prefers one whose container matches
/// the requested ext; otherwise keeps the first in input order.
fn prefer_ext<'a>(
    candidates: &[&'a FormatDescriptor],
    ext: Option<&str>,
) -> &'a FormatDescriptor {
    if let Some(ext) = ext {
        if let Some(found) = candidates.iter().find(|f| f.ext == ext) {
            return found;
        }
    }
    candidates[0]
}

/// Ranks candidates by estimated filesize (direction per `extreme`), then
/// applies the container preference among the equally-sized leaders.
fn pick_by_size<'a>(
    candidates: &[&'a FormatDescriptor],
    ext: Option<&str>,
    extreme: Extreme,
) -> &'a FormatDescriptor {
    let lead = match extreme {
        Extreme::Best => candidates.iter().map(|f| f.size_or_zero()).max(),
        Extreme::Worst => candidates.iter().map(|f| f.size_or_zero()).min(),
    }
    .expect("candidates is non-empty");

    let leaders: Vec<&FormatDescriptor> = candidates
        .iter()
        .copied()
        .filter(|f| f.size_or_zero() == lead)
        .collect();
    prefer_ext(&leaders, ext)
}
