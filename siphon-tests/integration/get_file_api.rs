//! Router-level tests for the stored file retrieval endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use siphon_web::router;
use tower::ServiceExt;

use crate::support::{StaticResolver, app_state, sample_metadata};

async fn get(uri: &str) -> axum::response::Response {
    let (state, downloads) = app_state(StaticResolver::with_metadata(sample_metadata(vec![])));
    std::fs::write(downloads.path().join("clip.mp4"), b"saved bytes").unwrap();

    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    drop(downloads);
    response
}

#[tokio::test]
async fn stored_file_is_streamed_with_headers() {
    let response = get("/get_file?filename=clip.mp4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "video/mp4"
    );
    assert_eq!(response.headers().get("content-length").unwrap(), "11");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), b"saved bytes");
}

#[tokio::test]
async fn missing_filename_is_a_400() {
    let response = get("/get_file").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_file_is_a_404() {
    let response = get("/get_file?filename=nope.mp4").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_is_rejected() {
    let response = get("/get_file?filename=..%2Fescape.mp4").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quoted_stored_name_is_sanitized_in_disposition() {
    let (state, downloads) = app_state(StaticResolver::with_metadata(sample_metadata(vec![])));
    std::fs::write(downloads.path().join("he\"llo.mp4"), b"x").unwrap();

    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/get_file?filename=he%22llo.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(disposition, "attachment; filename=\"hello.mp4\"");
}
