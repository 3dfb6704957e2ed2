//! Conversion of component failures into the JSON error shape.
//!
//! Every failure a handler can hit becomes `{success:false, message}`
//! with an appropriate status. Internal faults keep their detail in the
//! server log only; clients get a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use siphon_core::SiphonError;
use siphon_core::storage::StorageError;
use tracing::error;

/// A classified, client-ready failure.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<SiphonError> for ApiError {
    fn from(error: SiphonError) -> Self {
        let status = match &error {
            SiphonError::Storage(StorageError::NotFound { .. }) => StatusCode::NOT_FOUND,
            _ if error.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Full detail stays server-side.
            error!("Internal fault handling request: {error:?}");
        }

        Self {
            status,
            message: error.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use siphon_core::resolver::ResolveError;

    use super::*;

    #[test]
    fn user_errors_map_to_400() {
        let api: ApiError = SiphonError::from(ResolveError::Extraction {
            message: "Video unavailable".to_string(),
        })
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.message.contains("unavailable"));
    }

    #[test]
    fn missing_files_map_to_404() {
        let api: ApiError = SiphonError::from(StorageError::NotFound {
            name: "clip.mp4".to_string(),
        })
        .into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_faults_map_to_500_with_generic_message() {
        let api: ApiError = SiphonError::Io(std::io::Error::other("boom")).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Server error occurred");
    }
}
