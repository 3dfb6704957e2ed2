//! Production resolver backed by the yt-dlp extractor binary.
//!
//! Extraction itself is delegated entirely to yt-dlp; this adapter only
//! shapes the invocation (timeouts, retries, client profile, request
//! identity) and normalizes the JSON document it emits.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{MetadataResolver, RawInfo, ResolveError, VideoMetadata, build_catalog};
use crate::config::ResolverConfig;
use crate::watch_url::WatchUrl;

/// Resolver that spawns `yt-dlp --dump-single-json` per request.
///
/// No state is shared between requests; each resolve is an independent
/// subprocess with its own network connections.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    config: ResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, url: &WatchUrl) -> Command {
        let mut command = Command::new(&self.config.binary);
        command
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("--no-playlist")
            // The upstream service is fragile toward automated clients;
            // tolerate partial failures and route around restrictions.
            .arg("--ignore-errors")
            .arg("--no-check-certificates")
            .arg("--geo-bypass")
            .arg("--socket-timeout")
            .arg(self.config.socket_timeout.as_secs().to_string())
            .arg("--retries")
            .arg(self.config.retries.to_string())
            // Restricted extraction profile: skip adaptive-streaming
            // manifests and webpage/config/script scraping, prefer the
            // mobile player client.
            .arg("--extractor-args")
            .arg(format!(
                "youtube:player_client={};player_skip=configs,webpage,js;skip=hls,dash",
                self.config.player_client
            ))
            .arg("--user-agent")
            .arg(self.config.user_agent)
            .arg("--add-header")
            .arg(format!("Accept:{}", self.config.accept_header))
            .arg(url.as_str())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl MetadataResolver for YtDlpResolver {
    async fn resolve(&self, url: &WatchUrl) -> Result<VideoMetadata, ResolveError> {
        debug!("Resolving metadata for {url}");

        let output = self.build_command(url).output().await?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Extractor failed for {url}: {message}");
            return Err(ResolveError::Extraction { message });
        }

        if output.stdout.is_empty() {
            return Err(ResolveError::NoData);
        }

        let info: RawInfo = serde_json::from_slice(&output.stdout)?;
        let formats = build_catalog(info.formats);
        if formats.is_empty() {
            return Err(ResolveError::NoFormats);
        }

        debug!(
            "Resolved {} usable formats for {url}",
            formats.len()
        );

        Ok(VideoMetadata {
            title: info.title.unwrap_or_default(),
            uploader: info.uploader.unwrap_or_default(),
            duration: info.duration.unwrap_or(0.0) as u64,
            view_count: info.view_count.unwrap_or(0),
            thumbnail: info.thumbnail.unwrap_or_default(),
            formats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FormatKind;

    #[test]
    fn extractor_document_parses_into_catalog() {
        let document = r#"{
            "title": "Test Video",
            "uploader": "Test Channel",
            "duration": 212.5,
            "view_count": 1000,
            "thumbnail": "https://example.com/thumb.jpg",
            "formats": [
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
                 "filesize": 3000000, "url": "https://cdn.example.com/140"},
                {"format_id": "22", "ext": "mp4", "height": 720, "fps": 30,
                 "vcodec": "avc1", "acodec": "mp4a.40.2", "url": "https://cdn.example.com/22"},
                {"format_id": "137", "ext": "mp4", "height": 1080,
                 "vcodec": "avc1", "acodec": "none", "url": "https://cdn.example.com/137"}
            ]
        }"#;

        let info: RawInfo = serde_json::from_str(document).unwrap();
        let formats = build_catalog(info.formats);

        // Video-only 137 is excluded; 22 leads.
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].format_id, "22");
        assert_eq!(formats[0].kind, FormatKind::VideoAudio);
        assert_eq!(formats[1].format_id, "140");
        assert_eq!(formats[1].kind, FormatKind::Audio);
        assert_eq!(info.duration.unwrap() as u64, 212);
    }

    #[test]
    fn sparse_document_fields_default_safely() {
        let info: RawInfo = serde_json::from_str("{}").unwrap();
        assert!(info.title.is_none());
        assert!(info.formats.is_empty());
    }
}
