//! Siphon Core - URL normalization, metadata resolution, and stream relay
//!
//! This crate provides the fundamental building blocks for the Siphon
//! download proxy: watch URL handling, the metadata resolver adapter,
//! format catalog construction, the byte stream relay, upstream error
//! classification, and download storage.

pub mod classify;
pub mod config;
pub mod relay;
pub mod resolver;
pub mod storage;
pub mod tracing_setup;
pub mod watch_url;

// Re-export main types for convenient access
pub use classify::{ErrorCategory, classify};
pub use config::SiphonConfig;
pub use relay::{RelayError, StreamRelay};
pub use resolver::{MetadataResolver, ResolveError, VideoMetadata, YtDlpResolver};
pub use storage::{DownloadStore, StorageError};
pub use watch_url::{UrlError, WatchUrl};

/// Core errors that can bubble up from any Siphon subsystem.
#[derive(Debug, thiserror::Error)]
pub enum SiphonError {
    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiphonError {
    /// Returns a client-safe message for this error.
    ///
    /// Resolution failures route through the error classifier so the
    /// closed category set, not raw extractor text, reaches clients.
    pub fn user_message(&self) -> String {
        match self {
            SiphonError::Url(_) => "Invalid YouTube URL format".to_string(),
            SiphonError::Resolve(error) => match error {
                ResolveError::Extraction { message } => classify(message).user_message(),
                _ => "Could not load video information. Please try again.".to_string(),
            },
            SiphonError::Relay(error) => match error {
                RelayError::NoMatchingFormat { wanted } => {
                    format!("Requested format is not available: {wanted}")
                }
                _ => "Could not fetch media from upstream. Please try again.".to_string(),
            },
            SiphonError::Storage(StorageError::NotFound { .. }) => "File not found".to_string(),
            SiphonError::Storage(StorageError::InvalidFilename { .. }) => {
                "Invalid filename".to_string()
            }
            SiphonError::Storage(_) | SiphonError::Io(_) => "Server error occurred".to_string(),
        }
    }

    /// Checks if this error is caused by client input rather than an
    /// internal fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SiphonError::Url(_)
                | SiphonError::Resolve(_)
                | SiphonError::Relay(_)
                | SiphonError::Storage(StorageError::NotFound { .. })
                | SiphonError::Storage(StorageError::InvalidFilename { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, SiphonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failures_classify_into_user_messages() {
        let error = SiphonError::Resolve(ResolveError::Extraction {
            message: "ERROR: Video is private".to_string(),
        });
        assert_eq!(
            error.user_message(),
            "This video is private. Please use a public video URL."
        );
        assert!(error.is_user_error());
    }

    #[test]
    fn io_faults_stay_generic() {
        let error = SiphonError::Io(std::io::Error::other("disk on fire"));
        assert_eq!(error.user_message(), "Server error occurred");
        assert!(!error.is_user_error());
    }
}
