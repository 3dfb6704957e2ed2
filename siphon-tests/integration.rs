//! Integration tests for Siphon
//!
//! These tests verify the integration between components: URL handling
//! through the resolver adapter, catalog construction, the HTTP surface,
//! and the byte relay against a live local upstream.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/url_normalization.rs"]
mod url_normalization;

#[path = "integration/format_catalog.rs"]
mod format_catalog;

#[path = "integration/preview_api.rs"]
mod preview_api;

#[path = "integration/download_relay.rs"]
mod download_relay;

#[path = "integration/get_file_api.rs"]
mod get_file_api;
