//! Shared helpers for the integration suite.

use std::sync::Arc;

use async_trait::async_trait;
use siphon_core::config::RelayConfig;
use siphon_core::relay::StreamRelay;
use siphon_core::resolver::{
    Format, FormatKind, MetadataResolver, ResolveError, VideoMetadata,
};
use siphon_core::storage::DownloadStore;
use siphon_core::watch_url::WatchUrl;
use siphon_web::AppState;
use tempfile::TempDir;

/// Resolver stub that returns a preset outcome for every URL.
pub struct StaticResolver {
    outcome: Result<VideoMetadata, String>,
}

impl StaticResolver {
    pub fn with_metadata(metadata: VideoMetadata) -> Self {
        Self {
            outcome: Ok(metadata),
        }
    }

    /// Simulates the extractor failing with the given raw message.
    pub fn failing_with(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl MetadataResolver for StaticResolver {
    async fn resolve(&self, _url: &WatchUrl) -> Result<VideoMetadata, ResolveError> {
        match &self.outcome {
            Ok(metadata) => Ok(metadata.clone()),
            Err(message) => Err(ResolveError::Extraction {
                message: message.clone(),
            }),
        }
    }
}

/// A video+audio format pointing at `source_url`.
pub fn video_format(format_id: &str, height: u32, source_url: Option<&str>) -> Format {
    Format {
        format_id: format_id.to_string(),
        ext: "mp4".to_string(),
        kind: FormatKind::VideoAudio,
        width: None,
        height: Some(height),
        fps: Some(30.0),
        bitrate: None,
        filesize: Some(5_000_000),
        format_name: format!("{height}p 30fps video audio"),
        quality: format!("{height}p"),
        source_url: source_url.map(str::to_string),
    }
}

/// An audio-only format pointing at `source_url`.
pub fn audio_format(format_id: &str, source_url: Option<&str>) -> Format {
    Format {
        format_id: format_id.to_string(),
        ext: "m4a".to_string(),
        kind: FormatKind::Audio,
        width: None,
        height: None,
        fps: None,
        bitrate: Some(128.0),
        filesize: Some(3_000_000),
        format_name: "audio".to_string(),
        quality: "medium".to_string(),
        source_url: source_url.map(str::to_string),
    }
}

pub fn sample_metadata(formats: Vec<Format>) -> VideoMetadata {
    VideoMetadata {
        title: "Sample Video".to_string(),
        uploader: "Sample Channel".to_string(),
        duration: 212,
        view_count: 1000,
        thumbnail: "https://i.example.com/thumb.jpg".to_string(),
        formats,
    }
}

/// Builds app state around the given resolver with a fresh temp
/// downloads directory. The `TempDir` guard must outlive the state.
pub fn app_state(resolver: StaticResolver) -> (AppState, TempDir) {
    let downloads = TempDir::new().expect("create temp downloads dir");
    let state = AppState {
        resolver: Arc::new(resolver),
        relay: Arc::new(StreamRelay::new(RelayConfig::default()).expect("build relay")),
        store: DownloadStore::new(downloads.path()),
    };
    (state, downloads)
}
