//! Download handler: relay a chosen format's bytes to the client.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Response, StatusCode, header};
use serde::Deserialize;
use siphon_core::SiphonError;
use siphon_core::watch_url::WatchUrl;
use tracing::info;

use super::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: Option<String>,
    #[serde(default)]
    pub extract_audio: bool,
}

/// POST `/download` - stream the selected format as an attachment.
///
/// Headers are sent as soon as the upstream connection succeeds; a
/// mid-transfer upstream failure after that point surfaces as a
/// truncated body, which is the accepted limitation of a single-pass
/// relay.
pub async fn download_media(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response<Body>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Invalid request format"))?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Please provide a YouTube URL"));
    }

    let watch_url = WatchUrl::parse(url).map_err(SiphonError::from)?;
    info!(
        "Download request for {watch_url}: format_id={:?}, extract_audio={}",
        request.format_id, request.extract_audio
    );

    let metadata = state
        .resolver
        .resolve(&watch_url)
        .await
        .map_err(SiphonError::from)?;

    let format = state
        .relay
        .select_format(&metadata, request.format_id.as_deref(), request.extract_audio)
        .map_err(SiphonError::from)?;

    let stream = state
        .relay
        .open(format, &metadata.title)
        .await
        .map_err(SiphonError::from)?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stream.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", stream.filename),
        );
    if let Some(length) = stream.content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }

    response
        .body(Body::from_stream(stream.body))
        .map_err(|error| SiphonError::Io(std::io::Error::other(error)).into())
}
