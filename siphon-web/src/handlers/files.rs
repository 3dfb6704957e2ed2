//! File retrieval handler for previously saved downloads.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Response, StatusCode, header};
use serde::Deserialize;
use siphon_core::SiphonError;
use siphon_core::relay::sanitize_filename;
use tokio_util::io::ReaderStream;

use super::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub filename: Option<String>,
}

/// GET `/get_file?filename=` - stream a stored file back to the client.
pub async fn get_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response<Body>, ApiError> {
    let filename = query
        .filename
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("No filename provided"))?;

    let stored = state
        .store
        .open(&filename)
        .await
        .map_err(SiphonError::from)?;

    let body = Body::from_stream(ReaderStream::new(stored.file));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stored.content_type)
        .header(header::CONTENT_LENGTH, stored.len)
        .header(
            header::CONTENT_DISPOSITION,
            // Stored names may carry quotes; they must not reach the
            // quoted disposition value.
            format!(
                "attachment; filename=\"{}\"",
                sanitize_filename(&stored.filename)
            ),
        )
        .body(body)
        .map_err(|error| SiphonError::Io(std::io::Error::other(error)).into())
}
