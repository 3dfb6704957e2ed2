//! Siphon Web - JSON API and streaming server
//!
//! Exposes the preview/download/get_file surface over HTTP. All
//! component failures are converted to the JSON error shape at the
//! handler boundary; nothing crashes the process on a bad request.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, router, run_server};
