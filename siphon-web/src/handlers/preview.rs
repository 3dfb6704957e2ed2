//! Preview handler: resolve a URL into its format catalog.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};
use siphon_core::SiphonError;
use siphon_core::watch_url::WatchUrl;
use tracing::info;

use super::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub url: String,
}

/// POST `/preview` - resolve metadata and return the ordered catalog.
pub async fn preview_video(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request format"))?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Please provide a YouTube URL"));
    }

    let watch_url = WatchUrl::parse(url).map_err(SiphonError::from)?;
    info!("Preview request for {watch_url}");

    let metadata = state
        .resolver
        .resolve(&watch_url)
        .await
        .map_err(SiphonError::from)?;

    Ok(Json(json!({
        "success": true,
        "title": metadata.title,
        "author": metadata.uploader,
        "duration": metadata.duration,
        "views": metadata.view_count,
        "thumbnail": metadata.thumbnail,
        "formats": metadata.formats,
    })))
}
