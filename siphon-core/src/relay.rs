//! Stream relay: proxies media bytes from a direct source URL to a client.
//!
//! The relay is a single-pass pipeline. Bytes are pulled from the
//! upstream socket, re-chunked to a fixed size to bound memory, and
//! handed to the caller as a stream. Nothing is buffered beyond one
//! chunk; dropping the stream closes the upstream connection, which is
//! how client disconnects propagate.

use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::resolver::{Format, VideoMetadata};

/// Errors from the stream relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no matching format: {wanted}")]
    NoMatchingFormat { wanted: String },

    #[error("format has no direct source URL")]
    NoSourceUrl,

    #[error("upstream returned status {status}")]
    UpstreamStatus { status: StatusCode },

    #[error("upstream fetch failed")]
    Upstream(#[from] reqwest::Error),
}

/// A byte stream bound to its response headers.
pub struct RelayStream {
    pub content_type: String,
    /// Sanitized attachment filename, safe for a disposition header
    pub filename: String,
    /// Upstream-reported length, when known
    pub content_length: Option<u64>,
    pub body: Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>,
}

/// Relays bytes from direct media URLs.
///
/// Holds only the HTTP client; no per-request state.
#[derive(Debug, Clone)]
pub struct StreamRelay {
    client: reqwest::Client,
    config: RelayConfig,
}

impl StreamRelay {
    /// Builds the relay and its upstream HTTP client.
    ///
    /// # Errors
    /// - `RelayError::Upstream` - Client construction failed
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            // Defensive per-chunk timeout; the relay itself has no
            // overall deadline.
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Selects the format a download request asked for.
    ///
    /// An explicit `format_id` wins; `extract_audio` picks the best
    /// audio-class entry in catalog order; otherwise the catalog head
    /// (the best overall variant) is used.
    ///
    /// # Errors
    /// - `RelayError::NoMatchingFormat` - Nothing in the catalog matches
    pub fn select_format<'a>(
        &self,
        metadata: &'a VideoMetadata,
        format_id: Option<&str>,
        extract_audio: bool,
    ) -> Result<&'a Format, RelayError> {
        if let Some(wanted) = format_id {
            return metadata
                .formats
                .iter()
                .find(|format| format.format_id == wanted)
                .ok_or_else(|| RelayError::NoMatchingFormat {
                    wanted: wanted.to_string(),
                });
        }

        if extract_audio {
            return metadata
                .formats
                .iter()
                .find(|format| !format.has_video())
                .ok_or_else(|| RelayError::NoMatchingFormat {
                    wanted: "bestaudio".to_string(),
                });
        }

        metadata
            .formats
            .first()
            .ok_or_else(|| RelayError::NoMatchingFormat {
                wanted: "best".to_string(),
            })
    }

    /// Opens the upstream connection and returns the relay stream.
    ///
    /// Fails fast on a non-success upstream status; once the stream is
    /// handed out, mid-transfer failures surface as error items (a
    /// truncated body when headers were already sent downstream).
    ///
    /// # Errors
    /// - `RelayError::NoSourceUrl` - Format carries no direct URL
    /// - `RelayError::UpstreamStatus` - Upstream refused the fetch
    /// - `RelayError::Upstream` - Connection failed
    pub async fn open(&self, format: &Format, title: &str) -> Result<RelayStream, RelayError> {
        let source_url = format.source_url.as_deref().ok_or(RelayError::NoSourceUrl)?;

        debug!("Opening relay for format {}", format.format_id);
        let response = self.client.get(source_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream refused media fetch: {status}");
            return Err(RelayError::UpstreamStatus { status });
        }

        // The catalog's filesize is approximate; only an upstream-reported
        // length may be declared to the client.
        let content_length = response.content_length();
        let content_type = mime_guess::from_ext(&format.ext)
            .first_or_octet_stream()
            .to_string();
        let filename = format!("{}.{}", sanitize_filename(title), format.ext);

        Ok(RelayStream {
            content_type,
            filename,
            content_length,
            body: rechunk(
                response.bytes_stream().map(|item| item.map_err(RelayError::from)),
                self.config.chunk_size,
            ),
        })
    }
}

/// Re-chunks an upstream byte stream into pieces of at most `chunk_size`.
///
/// Delivery order is strictly upstream arrival order. An upstream error
/// is yielded once as an error item, then the stream ends.
fn rechunk<S>(
    upstream: S,
    chunk_size: usize,
) -> Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>
where
    S: Stream<Item = Result<Bytes, RelayError>> + Send + 'static,
{
    let state = (Box::pin(upstream.fuse()), Bytes::new(), false);
    Box::pin(futures::stream::unfold(
        state,
        move |(mut upstream, mut pending, failed)| async move {
            if failed {
                return None;
            }
            loop {
                if !pending.is_empty() {
                    let take = pending.split_to(pending.len().min(chunk_size));
                    return Some((Ok(take), (upstream, pending, false)));
                }
                match upstream.next().await {
                    Some(Ok(chunk)) => pending = chunk,
                    Some(Err(error)) => {
                        return Some((Err(error), (upstream, Bytes::new(), true)));
                    }
                    None => return None,
                }
            }
        },
    ))
}

/// Strips header- and filesystem-breaking characters from a title and
/// truncates to 255 characters. Idempotent.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .take(255)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::resolver::FormatKind;

    fn format(id: &str, kind: FormatKind, url: Option<&str>) -> Format {
        Format {
            format_id: id.to_string(),
            ext: "mp4".to_string(),
            kind,
            width: None,
            height: None,
            fps: None,
            bitrate: None,
            filesize: None,
            format_name: String::new(),
            quality: String::new(),
            source_url: url.map(str::to_string),
        }
    }

    fn metadata(formats: Vec<Format>) -> VideoMetadata {
        VideoMetadata {
            title: "t".to_string(),
            uploader: String::new(),
            duration: 0,
            view_count: 0,
            thumbnail: String::new(),
            formats,
        }
    }

    #[test]
    fn explicit_format_id_wins() {
        let relay = StreamRelay::new(RelayConfig::default()).unwrap();
        let meta = metadata(vec![
            format("22", FormatKind::VideoAudio, None),
            format("140", FormatKind::Audio, None),
        ]);
        let chosen = relay.select_format(&meta, Some("140"), false).unwrap();
        assert_eq!(chosen.format_id, "140");
    }

    #[test]
    fn audio_flag_selects_best_audio_entry() {
        let relay = StreamRelay::new(RelayConfig::default()).unwrap();
        let meta = metadata(vec![
            format("22", FormatKind::VideoAudio, None),
            format("141", FormatKind::Audio, None),
            format("140", FormatKind::Audio, None),
        ]);
        let chosen = relay.select_format(&meta, None, true).unwrap();
        assert_eq!(chosen.format_id, "141");
    }

    #[test]
    fn default_selection_is_catalog_head() {
        let relay = StreamRelay::new(RelayConfig::default()).unwrap();
        let meta = metadata(vec![
            format("22", FormatKind::VideoAudio, None),
            format("140", FormatKind::Audio, None),
        ]);
        let chosen = relay.select_format(&meta, None, false).unwrap();
        assert_eq!(chosen.format_id, "22");
    }

    #[test]
    fn missing_format_id_is_an_error() {
        let relay = StreamRelay::new(RelayConfig::default()).unwrap();
        let meta = metadata(vec![format("22", FormatKind::VideoAudio, None)]);
        assert!(matches!(
            relay.select_format(&meta, Some("999"), false),
            Err(RelayError::NoMatchingFormat { .. })
        ));
    }

    #[test]
    fn sanitize_strips_reserved_characters() {
        assert_eq!(
            sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#),
            "abcdefghij"
        );
    }

    #[test]
    fn sanitize_truncates_to_255_characters() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_filename(&long).chars().count(), 255);
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(title in ".{0,400}") {
            let once = sanitize_filename(&title);
            prop_assert_eq!(sanitize_filename(&once), once.clone());
            prop_assert!(once.chars().count() <= 255);
        }
    }

    #[tokio::test]
    async fn rechunk_bounds_chunk_size_and_preserves_bytes() {
        let payload = Bytes::from(vec![7u8; 20_000]);
        let upstream = futures::stream::iter(vec![
            Ok(payload.clone()),
            Ok(Bytes::from_static(b"tail")),
        ]);

        let mut stream = rechunk(upstream, 8192);
        let mut collected = Vec::new();
        while let Some(item) = stream.next().await {
            let chunk = item.unwrap();
            assert!(chunk.len() <= 8192);
            collected.extend_from_slice(&chunk);
        }

        let mut expected = payload.to_vec();
        expected.extend_from_slice(b"tail");
        assert_eq!(collected, expected);
    }

    #[tokio::test]
    async fn rechunk_surfaces_midstream_error_once_then_ends() {
        let upstream = futures::stream::iter(vec![
            Ok(Bytes::from(vec![1u8; 10_000])),
            Err(RelayError::NoSourceUrl),
            Ok(Bytes::from_static(b"never delivered")),
        ]);

        let mut stream = rechunk(upstream, 8192);

        // Bytes received before the failure are still delivered in order.
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 8192);
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 10_000 - 8192);

        // One error item, then termination; nothing after the failure leaks.
        assert!(matches!(
            stream.next().await,
            Some(Err(RelayError::NoSourceUrl))
        ));
        assert!(stream.next().await.is_none());
    }
}
