//! YouTube URL validation and normalization.
//!
//! Accepts watch, shorts, youtu.be, mobile, and playlist URLs. Short
//! `youtu.be/<id>` links are rewritten to the canonical
//! `youtube.com/watch?v=<id>` form with the original query parameters
//! preserved.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static YOUTUBE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"https?://(?:www\.)?youtube\.com/watch\?v=[\w-]+",
        r"https?://(?:www\.)?youtube\.com/shorts/[\w-]+",
        r"https?://youtu\.be/[\w-]+",
        r"https?://m\.youtube\.com/watch\?v=[\w-]+",
        r"https?://(?:www\.)?youtube\.com/playlist\?list=[\w-]+",
        r"https?://(?:www\.)?youtube\.com/watch\?.*[&?]list=[\w-]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static PLAYLIST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"https?://(?:www\.)?youtube\.com/playlist\?list=[\w-]+",
        r"https?://(?:www\.)?youtube\.com/watch\?.*[&?]list=[\w-]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Whether the URL points at YouTube content we can hand to yt-dlp.
pub fn is_valid_youtube_url(url: &str) -> bool {
    YOUTUBE_PATTERNS.iter().any(|p| p.is_match(url))
}

/// Whether the URL refers to a playlist (or a watch URL carrying a `list=`
/// parameter, which yt-dlp treats as one).
pub fn is_playlist_url(url: &str) -> bool {
    url.contains("list=") || PLAYLIST_PATTERNS.iter().any(|p| p.is_match(url))
}

/// Normalizes youtu.be short links to the canonical watch URL, keeping any
/// extra query parameters. Other URLs pass through unchanged.
pub fn normalize_youtube_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return url.to_string();
    };

    if !host.ends_with("youtu.be") {
        return url.to_string();
    }

    let video_id = parsed.path().trim_start_matches('/');
    if video_id.is_empty() {
        return url.to_string();
    }

    let mut normalized = Url::parse("https://www.youtube.com/watch").expect("static URL");
    {
        let mut query = normalized.query_pairs_mut();
        // The video id goes first, then whatever the short link carried.
        query.append_pair("v", video_id);
        for (key, value) in parsed.query_pairs() {
            query.append_pair(&key, &value);
        }
    }
    normalized.to_string()
}

/// Validates and normalizes a user-supplied URL in one step.
pub fn validate_and_normalize(url: &str) -> CoreResult<String> {
    if !is_valid_youtube_url(url) {
        return Err(CoreError::InvalidUrl(url.to_string()));
    }
    Ok(normalize_youtube_url(url))
}

/// Builds a watch URL from a bare video id (used for playlist entries).
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_watch_urls() {
        assert!(is_valid_youtube_url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        assert!(is_valid_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_valid_youtube_url(
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        assert!(is_valid_youtube_url(
            "https://www.youtube.com/shorts/abc123-XY"
        ));
    }

    #[test]
    fn rejects_non_youtube_urls() {
        assert!(!is_valid_youtube_url("https://vimeo.com/12345"));
        assert!(!is_valid_youtube_url("not a url"));
        assert!(!is_valid_youtube_url("https://www.youtube.com/"));
    }

    #[test]
    fn detects_playlists() {
        assert!(is_playlist_url(
            "https://www.youtube.com/playlist?list=PLabc"
        ));
        assert!(is_playlist_url(
            "https://www.youtube.com/watch?v=abc&list=PLabc"
        ));
        assert!(is_playlist_url("https://youtu.be/abc?list=PLabc"));
        assert!(!is_playlist_url("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn normalizes_short_links() {
        assert_eq!(
            normalize_youtube_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn normalization_preserves_query_params() {
        let out = normalize_youtube_url("https://youtu.be/abc123?t=42&list=PLxyz");
        assert!(out.starts_with("https://www.youtube.com/watch?v=abc123"));
        assert!(out.contains("t=42"));
        assert!(out.contains("list=PLxyz"));
    }

    #[test]
    fn normalization_leaves_canonical_urls_alone() {
        let url = "https://www.youtube.com/watch?v=abc&list=PLxyz";
        assert_eq!(normalize_youtube_url(url), url);
    }

    #[test]
    fn validate_rejects_with_invalid_url_error() {
        let err = validate_and_normalize("https://example.com/watch?v=abc").unwrap_err();
        assert!(matches!(err, crate::CoreError::InvalidUrl(_)));
    }
}
