//! Classification of upstream extraction failures.
//!
//! The extractor surfaces failures as free-form text. A small ordered
//! marker table maps that text onto a closed set of user-facing
//! categories; anything unrecognized is passed through verbatim.

use serde::Serialize;

/// User-facing category for an upstream extraction failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Video removed, region-locked, or otherwise gone
    Unavailable,
    /// Video exists but is private
    Private,
    /// Video requires an age-verified session
    AgeRestricted,
    /// Unrecognized failure; carries the original message
    Unknown(String),
}

/// Marker table, checked in order. First match wins; a message could
/// in principle contain more than one marker.
const MARKERS: [(&str, ErrorCategory); 3] = [
    ("Video unavailable", ErrorCategory::Unavailable),
    ("Video is private", ErrorCategory::Private),
    ("Sign in to confirm your age", ErrorCategory::AgeRestricted),
];

/// Maps a raw upstream failure message onto an [`ErrorCategory`].
pub fn classify(raw_message: &str) -> ErrorCategory {
    for (marker, category) in &MARKERS {
        if raw_message.contains(marker) {
            return category.clone();
        }
    }
    ErrorCategory::Unknown(raw_message.to_string())
}

impl ErrorCategory {
    /// Stable client-facing message for this category.
    pub fn user_message(&self) -> String {
        match self {
            ErrorCategory::Unavailable => {
                "This video is unavailable. It may be private or restricted.".to_string()
            }
            ErrorCategory::Private => {
                "This video is private. Please use a public video URL.".to_string()
            }
            ErrorCategory::AgeRestricted => {
                "This video is age-restricted and cannot be fetched anonymously.".to_string()
            }
            ErrorCategory::Unknown(message) => {
                format!("Error loading video information: {message}")
            }
        }
    }
}
