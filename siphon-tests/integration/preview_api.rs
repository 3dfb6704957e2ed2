//! Router-level tests for the preview endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use siphon_web::router;
use tower::ServiceExt;

use crate::support::{StaticResolver, app_state, audio_format, sample_metadata, video_format};

async fn post_preview(resolver: StaticResolver, body: &str) -> (StatusCode, Value) {
    let (state, _downloads) = app_state(resolver);
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/preview")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn preview_returns_metadata_and_ordered_formats() {
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![
        video_format("22", 720, None),
        audio_format("140", None),
    ]));
    let (status, body) = post_preview(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "Sample Video");
    assert_eq!(body["author"], "Sample Channel");
    assert_eq!(body["duration"], 212);
    assert_eq!(body["views"], 1000);
    let formats = body["formats"].as_array().unwrap();
    assert_eq!(formats.len(), 2);
    assert_eq!(formats[0]["format_id"], "22");
    assert_eq!(formats[0]["kind"], "video+audio");
    assert_eq!(formats[1]["kind"], "audio");
}

#[tokio::test]
async fn invalid_url_is_rejected_before_resolution() {
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![]));
    let (status, body) = post_preview(resolver, r#"{"url": "https://example.com/x"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid YouTube URL format");
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![]));
    let (status, body) = post_preview(resolver, r#"{"url": "   "}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a YouTube URL");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![]));
    let (status, body) = post_preview(resolver, "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request format");
}

#[tokio::test]
async fn upstream_unavailable_maps_to_classified_400() {
    let resolver = StaticResolver::failing_with("ERROR: Video unavailable on this platform");
    let (status, body) = post_preview(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["message"].as_str().unwrap().contains("unavailable"),
        "message was {:?}",
        body["message"]
    );
}

#[tokio::test]
async fn private_video_maps_to_its_category_message() {
    let resolver = StaticResolver::failing_with("blah Video is private blah");
    let (status, body) = post_preview(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "This video is private. Please use a public video URL."
    );
}
