//! Video metadata resolution.
//!
//! Wraps the external extraction capability behind the
//! [`MetadataResolver`] trait and normalizes its raw per-format records
//! into a clean, deterministically ordered catalog.

mod catalog;
mod ytdlp;

use async_trait::async_trait;
use serde::Serialize;

pub use catalog::{RawFormat, RawInfo, build_catalog, classify_format};
pub use ytdlp::YtDlpResolver;

use crate::watch_url::WatchUrl;

/// Errors from metadata resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("extractor produced no data")]
    NoData,

    #[error("no usable formats for this video")]
    NoFormats,

    #[error("extraction failed: {message}")]
    Extraction { message: String },

    #[error("failed to run extractor")]
    Spawn(#[from] std::io::Error),

    #[error("failed to parse extractor output")]
    Parse(#[from] serde_json::Error),
}

/// Classification of a downloadable variant.
///
/// Video-only variants are deliberately excluded from catalogs: the
/// system has no client-side mux step, so a stream without audio is not
/// useful to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormatKind {
    #[serde(rename = "video+audio")]
    VideoAudio,
    #[serde(rename = "audio")]
    Audio,
}

impl FormatKind {
    pub fn has_video(self) -> bool {
        matches!(self, FormatKind::VideoAudio)
    }

    pub fn has_audio(self) -> bool {
        matches!(self, FormatKind::VideoAudio | FormatKind::Audio)
    }
}

/// One normalized downloadable variant of a video.
#[derive(Debug, Clone, Serialize)]
pub struct Format {
    pub format_id: String,
    pub ext: String,
    pub kind: FormatKind,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// Total bitrate in kbit/s, when reported upstream
    pub bitrate: Option<f64>,
    /// Approximate size in bytes, when reported upstream
    pub filesize: Option<u64>,
    /// Human-readable label, e.g. "1080p 30fps video audio"
    pub format_name: String,
    pub quality: String,
    /// Time-limited direct media URL; never exposed to clients
    #[serde(skip_serializing)]
    pub source_url: Option<String>,
}

impl Format {
    pub fn has_video(&self) -> bool {
        self.kind.has_video()
    }
}

/// Resolved metadata for a single video.
///
/// Owned by the request that produced it; never cached across requests.
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    pub title: String,
    pub uploader: String,
    pub duration: u64,
    pub view_count: u64,
    pub thumbnail: String,
    pub formats: Vec<Format>,
}

/// External metadata-extraction capability.
///
/// Implementations take a canonical watch URL and return the full
/// normalized metadata record, or a typed resolution failure.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, url: &WatchUrl) -> Result<VideoMetadata, ResolveError>;
}
