//! HTTP server wiring for Siphon.
//!
//! Builds the router, shared application state, and serves the JSON +
//! streaming surface. Requests share only immutable handles (resolver,
//! relay client, store); there is no cross-request mutable state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use siphon_core::config::SiphonConfig;
use siphon_core::relay::StreamRelay;
use siphon_core::resolver::{MetadataResolver, YtDlpResolver};
use siphon_core::storage::DownloadStore;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::handlers::{download_media, get_file, preview_video};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn MetadataResolver>,
    pub relay: Arc<StreamRelay>,
    pub store: DownloadStore,
}

/// Builds the API router over the given state.
///
/// Split from [`run_server`] so tests can drive the router directly
/// with a mock resolver; static assets are mounted at serve time from
/// the configured directory.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/preview", post(preview_video))
        .route("/download", post(download_media))
        .route("/get_file", get(get_file))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the server until shutdown.
///
/// # Errors
/// Returns an error when the relay client cannot be built, the
/// downloads directory cannot be created, or binding fails.
pub async fn run_server(
    config: SiphonConfig,
    bind: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolver: Arc<dyn MetadataResolver> =
        Arc::new(YtDlpResolver::new(config.resolver.clone()));
    let relay = Arc::new(StreamRelay::new(config.relay.clone())?);
    let store = DownloadStore::new(config.storage.downloads_dir.clone());
    store.ensure_dir().await?;

    let state = AppState {
        resolver,
        relay,
        store,
    };

    let app = router(state).fallback_service(ServeDir::new(&config.web.static_dir));

    info!("Siphon server running on http://{bind}");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
