//! Watch URL normalization and validation.
//!
//! Accepts the short-link (`youtu.be/<id>`) and long-link
//! (`youtube.com/watch?v=<id>`) forms of a video URL and canonicalizes
//! both into the long form. Validation is a separate pass over the
//! original input string, using the stricter pattern grammar.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Pattern grammar for acceptable watch URLs.
///
/// Scheme and `www.` are optional; the video identifier is exactly
/// 11 characters drawn from anything except `&`, `=`, `%`, `?`.
static WATCH_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%?]{11})",
    )
    .expect("watch URL pattern is valid")
});

/// Errors from watch URL construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("invalid watch URL: {input}")]
    Invalid { input: String },
}

/// A validated, canonical locator for a single video.
///
/// Always holds the long canonical form `https://www.youtube.com/watch?v=<id>`
/// (or the original input verbatim when canonicalization degraded to
/// passthrough). Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchUrl(String);

impl WatchUrl {
    /// Validates the original input, then stores its canonical form.
    ///
    /// Validation intentionally inspects the input as given, not the
    /// normalized output; the two passes accept slightly different
    /// grammars and the observed ordering is part of the contract.
    ///
    /// # Errors
    /// - `UrlError::Invalid` - Input does not match the watch URL grammar
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let input = input.trim();
        if !is_valid_watch_url(input) {
            return Err(UrlError::Invalid {
                input: input.to_string(),
            });
        }
        Ok(Self(normalize_watch_url(input)))
    }

    /// The canonical URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WatchUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalizes a watch URL into the long `watch?v=<id>` form.
///
/// Extra query parameters are discarded; only the video identifier is
/// retained. Inputs that fail to parse, or that reference an unknown
/// host, are returned unchanged - callers must treat success as
/// "canonicalized or passthrough", not as a validity guarantee.
pub fn normalize_watch_url(input: &str) -> String {
    let parsed = match Url::parse(input) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::debug!("URL normalization passthrough for {input:?}: {error}");
            return input.to_string();
        }
    };

    let Some(host) = parsed.host_str() else {
        return input.to_string();
    };

    if host.contains("youtu.be") {
        let video_id = parsed.path().trim_start_matches('/');
        return format!("https://www.youtube.com/watch?v={video_id}");
    }

    if host.contains("youtube.com") {
        if let Some((_, video_id)) = parsed.query_pairs().find(|(key, _)| key == "v") {
            return format!("https://www.youtube.com/watch?v={video_id}");
        }
    }

    input.to_string()
}

/// Checks the original input against the watch URL grammar.
pub fn is_valid_watch_url(input: &str) -> bool {
    WATCH_URL_PATTERN.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_forms_normalize_identically() {
        let canonical = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(normalize_watch_url("https://youtu.be/dQw4w9WgXcQ"), canonical);
        assert_eq!(
            normalize_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            canonical
        );
        assert_eq!(
            normalize_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL123"),
            canonical
        );
    }

    #[test]
    fn unparseable_input_passes_through_unchanged() {
        assert_eq!(normalize_watch_url("not a url"), "not a url");
        assert_eq!(
            normalize_watch_url("youtube.com/watch?v=dQw4w9WgXcQ"),
            "youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn unknown_host_passes_through_unchanged() {
        assert_eq!(
            normalize_watch_url("https://vimeo.com/12345"),
            "https://vimeo.com/12345"
        );
    }

    #[test]
    fn validation_accepts_known_forms() {
        assert!(is_valid_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_valid_watch_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_valid_watch_url("youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_valid_watch_url("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(is_valid_watch_url("https://www.youtube-nocookie.com/v/dQw4w9WgXcQ"));
    }

    #[test]
    fn validation_rejects_short_identifiers() {
        assert!(!is_valid_watch_url("https://www.youtube.com/watch?v=short"));
        assert!(!is_valid_watch_url("https://youtu.be/abc"));
    }

    #[test]
    fn validation_rejects_other_hosts() {
        assert!(!is_valid_watch_url("https://vimeo.com/12345678901"));
        assert!(!is_valid_watch_url(""));
    }

    #[test]
    fn parse_produces_canonical_url() {
        let url = WatchUrl::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn parse_rejects_invalid_input() {
        assert!(WatchUrl::parse("https://example.com/video").is_err());
        assert!(WatchUrl::parse("").is_err());
    }
}
