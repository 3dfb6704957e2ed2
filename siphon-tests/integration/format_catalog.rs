//! End-to-end catalog construction scenarios.

use siphon_core::resolver::{RawFormat, build_catalog};

fn descriptor(height: u32, vcodec: &str, acodec: &str, filesize: u64) -> RawFormat {
    RawFormat {
        format_id: Some(format!("{height}")),
        ext: Some("mp4".to_string()),
        height: Some(height),
        vcodec: Some(vcodec.to_string()),
        acodec: Some(acodec.to_string()),
        filesize: Some(filesize),
        ..RawFormat::default()
    }
}

#[test]
fn resolution_orders_the_catalog() {
    let catalog = build_catalog(vec![
        descriptor(720, "avc1", "mp4a", 5_000_000),
        descriptor(1080, "avc1", "mp4a", 9_000_000),
    ]);
    let qualities: Vec<&str> = catalog.iter().map(|f| f.quality.as_str()).collect();
    assert_eq!(qualities, ["1080p", "720p"]);
}

#[test]
fn repeated_builds_are_byte_identical() {
    let input = vec![
        descriptor(720, "avc1", "mp4a", 5_000_000),
        descriptor(360, "avc1", "mp4a", 1_000_000),
        descriptor(1080, "avc1", "mp4a", 9_000_000),
    ];
    let first = serde_json::to_string(&build_catalog(input.clone())).unwrap();
    let second = serde_json::to_string(&build_catalog(input)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serialized_formats_omit_the_source_url() {
    let mut with_url = descriptor(720, "avc1", "mp4a", 1);
    with_url.url = Some("https://cdn.example.com/secret".to_string());
    let serialized = serde_json::to_string(&build_catalog(vec![with_url])).unwrap();
    assert!(!serialized.contains("secret"));
    assert!(serialized.contains("video+audio"));
}
