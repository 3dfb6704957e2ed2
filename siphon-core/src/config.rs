//! Centralized configuration for Siphon.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Siphon components.
///
/// Groups related configuration settings into logical sections.
#[derive(Debug, Clone, Default)]
pub struct SiphonConfig {
    pub resolver: ResolverConfig,
    pub relay: RelayConfig,
    pub storage: StorageConfig,
    pub web: WebConfig,
}

/// Metadata resolver configuration.
///
/// Controls how the external extractor binary is invoked: timeouts,
/// retry behavior, and the request identity presented upstream. The
/// hosting service actively distinguishes automated clients, so the
/// identity must look like a real browser.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Extractor binary name or path
    pub binary: String,
    /// Socket timeout passed to the extractor
    pub socket_timeout: Duration,
    /// Internal retry attempts for transient extraction failures
    pub retries: u32,
    /// Browser-like user agent for upstream requests
    pub user_agent: &'static str,
    /// Browser-like Accept header for upstream requests
    pub accept_header: &'static str,
    /// Extractor player client profile (mobile profiles are less fragile)
    pub player_client: &'static str,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            socket_timeout: Duration::from_secs(30),
            retries: 3,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            accept_header: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                            image/webp,*/*;q=0.8",
            player_client: "android",
        }
    }
}

/// Stream relay configuration.
///
/// Controls the upstream media fetch and the chunking of the
/// response pipeline.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Size of each forwarded chunk; bounds per-request memory
    pub chunk_size: usize,
    /// Per-chunk read timeout on the upstream connection
    pub read_timeout: Duration,
    /// User agent for direct media fetches
    pub user_agent: &'static str,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8192, // 8 KiB
            read_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        }
    }
}

/// On-disk download storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory previously saved files are served from
    pub downloads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from("downloads"),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Directory static assets are served from
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("siphon-web/static"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tuning() {
        let config = SiphonConfig::default();
        assert_eq!(config.relay.chunk_size, 8192);
        assert_eq!(config.resolver.socket_timeout, Duration::from_secs(30));
        assert_eq!(config.resolver.retries, 3);
        assert_eq!(config.storage.downloads_dir, PathBuf::from("downloads"));
        assert_eq!(config.web.static_dir, PathBuf::from("siphon-web/static"));
    }
}
