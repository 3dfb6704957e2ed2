//! Download endpoint and relay pipeline tests against a live local upstream.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use futures::StreamExt;
use serde_json::Value;
use siphon_core::config::RelayConfig;
use siphon_core::relay::StreamRelay;
use siphon_web::router;
use tower::ServiceExt;

use crate::support::{StaticResolver, app_state, audio_format, sample_metadata, video_format};

/// Serves `payload` with `status` at an ephemeral local address and
/// returns the media URL.
async fn spawn_upstream(payload: Vec<u8>, status: StatusCode) -> String {
    let app = Router::new().route(
        "/media",
        get(move || {
            let payload = payload.clone();
            async move { (status, payload) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/media")
}

async fn post_download(resolver: StaticResolver, body: String) -> axum::response::Response {
    let (state, _downloads) = app_state(resolver);
    router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/download")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn download_streams_the_full_payload_with_headers() {
    let payload = vec![0xABu8; 50_000];
    let media_url = spawn_upstream(payload.clone(), StatusCode::OK).await;
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![video_format(
        "22",
        720,
        Some(&media_url),
    )]));

    let response = post_download(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "format_id": "22"}"#.to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "video/mp4"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(disposition, "attachment; filename=\"Sample Video.mp4\"");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn extract_audio_serves_the_best_audio_format() {
    let payload = b"audio bytes".to_vec();
    let media_url = spawn_upstream(payload.clone(), StatusCode::OK).await;
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![
        video_format("22", 720, None),
        audio_format("140", Some(&media_url)),
    ]));

    let response = post_download(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "extract_audio": true}"#.to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("audio/"), "got {content_type}");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn upstream_refusal_maps_to_400_before_headers() {
    let media_url = spawn_upstream(b"denied".to_vec(), StatusCode::FORBIDDEN).await;
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![video_format(
        "22",
        720,
        Some(&media_url),
    )]));

    let response = post_download(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "format_id": "22"}"#.to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_format_id_maps_to_400() {
    let resolver = StaticResolver::with_metadata(sample_metadata(vec![video_format(
        "22", 720, None,
    )]));

    let response = post_download(
        resolver,
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "format_id": "999"}"#.to_string(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn chunked_upstream_leaves_length_undeclared() {
    // Upstream streams its body, so no Content-Length reaches the relay.
    let app = Router::new().route(
        "/media",
        get(|| async {
            let chunks = vec![Ok::<Vec<u8>, std::io::Error>(b"short body".to_vec())];
            Body::from_stream(futures::stream::iter(chunks))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let relay = StreamRelay::new(RelayConfig::default()).unwrap();
    // The catalog carries an approximate size; it must not be declared.
    let format = video_format("22", 720, Some(&format!("http://{addr}/media")));
    assert_eq!(format.filesize, Some(5_000_000));

    let stream = relay.open(&format, "Sample Video").await.unwrap();
    assert_eq!(stream.content_length, None);

    let mut collected = Vec::new();
    let mut body = stream.body;
    while let Some(item) = body.next().await {
        collected.extend_from_slice(&item.unwrap());
    }
    assert_eq!(collected, b"short body");
}

#[tokio::test]
async fn relay_delivers_bounded_chunks_in_order() {
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let media_url = spawn_upstream(payload.clone(), StatusCode::OK).await;

    let relay = StreamRelay::new(RelayConfig::default()).unwrap();
    let format = video_format("22", 720, Some(&media_url));
    let stream = relay.open(&format, "Sample Video").await.unwrap();

    let mut collected = Vec::new();
    let mut body = stream.body;
    while let Some(item) = body.next().await {
        let chunk = item.unwrap();
        assert!(chunk.len() <= 8192, "chunk of {} bytes", chunk.len());
        collected.extend_from_slice(&chunk);
    }
    assert_eq!(collected, payload);
}
