//! Format catalog construction.
//!
//! Takes the extractor's raw per-format records, filters out variants
//! the system cannot serve, and produces a deterministically ordered
//! catalog with synthesized labels.

use serde::Deserialize;

use super::{Format, FormatKind};

/// Top-level extractor output. All fields are optional; the upstream
/// record is untrusted and frequently sparse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// One raw per-variant record from the extractor.
///
/// Codec fields use the string `"none"` as an explicit absence marker
/// in addition to being omissible outright; both spellings mean the
/// codec is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub format_note: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub tbr: Option<f64>,
    pub url: Option<String>,
}

/// Classifies a raw record, or returns `None` when it must be excluded.
///
/// `video+audio` requires both codecs present and non-"none"; `audio`
/// requires an audio codec with no video codec. Video-only variants are
/// excluded (no client-side mux step exists).
pub fn classify_format(raw: &RawFormat) -> Option<FormatKind> {
    let vcodec = raw.vcodec.as_deref().filter(|codec| *codec != "none");
    let acodec = raw.acodec.as_deref().filter(|codec| *codec != "none");

    match (vcodec, acodec) {
        (Some(_), Some(_)) => Some(FormatKind::VideoAudio),
        (None, Some(_)) => Some(FormatKind::Audio),
        _ => None,
    }
}

/// Builds the ordered catalog from raw extractor records.
///
/// Sort key, descending: (has video, height-or-zero, fps-or-zero,
/// filesize-or-zero). Absent numerics substitute zero so unknown-size
/// variants sink to the low end of their tier instead of disappearing.
/// The sort is stable, so repeated builds over the same input yield
/// identical ordering.
pub fn build_catalog(raw_formats: Vec<RawFormat>) -> Vec<Format> {
    let mut catalog: Vec<Format> = raw_formats
        .into_iter()
        .filter_map(normalize_format)
        .collect();

    catalog.sort_by(|a, b| {
        b.has_video()
            .cmp(&a.has_video())
            .then_with(|| b.height.unwrap_or(0).cmp(&a.height.unwrap_or(0)))
            .then_with(|| {
                b.fps
                    .unwrap_or(0.0)
                    .total_cmp(&a.fps.unwrap_or(0.0))
            })
            .then_with(|| b.filesize.unwrap_or(0).cmp(&a.filesize.unwrap_or(0)))
    });

    catalog
}

fn normalize_format(raw: RawFormat) -> Option<Format> {
    let kind = classify_format(&raw)?;

    let height = raw.height.filter(|h| *h > 0);
    let fps = raw.fps.filter(|f| *f > 0.0);
    let filesize = raw.filesize.or(raw.filesize_approx);
    let format_note = raw.format_note.unwrap_or_default();

    let mut parts: Vec<String> = Vec::new();
    if let Some(height) = height {
        parts.push(format!("{height}p"));
    }
    if let Some(fps) = fps {
        parts.push(fps_label(fps));
    }
    if kind.has_video() {
        parts.push("video".to_string());
    }
    if kind.has_audio() {
        parts.push("audio".to_string());
    }

    let quality = match height {
        Some(height) => format!("{height}p"),
        None => format_note,
    };

    Some(Format {
        format_id: raw.format_id.unwrap_or_default(),
        ext: raw.ext.unwrap_or_default(),
        kind,
        width: raw.width.filter(|w| *w > 0),
        height,
        fps,
        bitrate: raw.tbr,
        filesize,
        format_name: parts.join(" "),
        quality,
        source_url: raw.url,
    })
}

/// Formats fps for labels, dropping a zero fractional part.
fn fps_label(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{}fps", fps as u64)
    } else {
        format!("{fps}fps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        format_id: &str,
        height: Option<u32>,
        vcodec: Option<&str>,
        acodec: Option<&str>,
        filesize: Option<u64>,
    ) -> RawFormat {
        RawFormat {
            format_id: Some(format_id.to_string()),
            ext: Some("mp4".to_string()),
            height,
            vcodec: vcodec.map(str::to_string),
            acodec: acodec.map(str::to_string),
            filesize,
            ..RawFormat::default()
        }
    }

    #[test]
    fn classification_requires_a_present_codec() {
        assert_eq!(
            classify_format(&raw("22", Some(720), Some("avc1"), Some("mp4a"), None)),
            Some(FormatKind::VideoAudio)
        );
        assert_eq!(
            classify_format(&raw("140", None, Some("none"), Some("mp4a"), None)),
            Some(FormatKind::Audio)
        );
        assert_eq!(
            classify_format(&raw("140", None, None, Some("mp4a"), None)),
            Some(FormatKind::Audio)
        );
        // Video-only is excluded: nothing to serve without audio.
        assert_eq!(
            classify_format(&raw("137", Some(1080), Some("avc1"), Some("none"), None)),
            None
        );
        assert_eq!(classify_format(&raw("sb0", None, None, None, None)), None);
    }

    #[test]
    fn higher_resolution_sorts_first() {
        let catalog = build_catalog(vec![
            raw("22", Some(720), Some("avc1"), Some("mp4a"), Some(5_000_000)),
            raw("37", Some(1080), Some("avc1"), Some("mp4a"), Some(9_000_000)),
        ]);
        assert_eq!(catalog[0].quality, "1080p");
        assert_eq!(catalog[1].quality, "720p");
    }

    #[test]
    fn video_sorts_before_audio_regardless_of_size() {
        let catalog = build_catalog(vec![
            raw("140", None, None, Some("mp4a"), Some(90_000_000)),
            raw("18", Some(360), Some("avc1"), Some("mp4a"), Some(1_000)),
        ]);
        assert!(catalog[0].has_video());
        assert!(!catalog[1].has_video());
    }

    #[test]
    fn larger_filesize_breaks_ties() {
        let catalog = build_catalog(vec![
            raw("a", Some(720), Some("avc1"), Some("mp4a"), Some(5_000_000)),
            raw("b", Some(720), Some("avc1"), Some("mp4a"), Some(9_000_000)),
        ]);
        assert_eq!(catalog[0].format_id, "b");
        assert_eq!(catalog[1].format_id, "a");
    }

    #[test]
    fn absent_numerics_sort_as_zero() {
        let catalog = build_catalog(vec![
            raw("unknown", None, Some("avc1"), Some("mp4a"), None),
            raw("known", Some(144), Some("avc1"), Some("mp4a"), Some(1)),
        ]);
        assert_eq!(catalog[0].format_id, "known");
        assert_eq!(catalog[1].format_id, "unknown");
    }

    #[test]
    fn build_is_idempotent() {
        let input = vec![
            raw("22", Some(720), Some("avc1"), Some("mp4a"), Some(5_000_000)),
            raw("140", None, None, Some("mp4a"), Some(3_000_000)),
            raw("18", Some(360), Some("avc1"), Some("mp4a"), None),
        ];
        let first = build_catalog(input.clone());
        let second = build_catalog(input);

        let first_view: Vec<(&str, &str)> = first
            .iter()
            .map(|f| (f.format_id.as_str(), f.format_name.as_str()))
            .collect();
        let second_view: Vec<(&str, &str)> = second
            .iter()
            .map(|f| (f.format_id.as_str(), f.format_name.as_str()))
            .collect();
        assert_eq!(first_view, second_view);
    }

    #[test]
    fn labels_omit_empty_components() {
        let mut with_fps = raw("22", Some(720), Some("avc1"), Some("mp4a"), None);
        with_fps.fps = Some(30.0);
        let catalog = build_catalog(vec![
            with_fps,
            raw("140", None, None, Some("mp4a"), None),
        ]);
        assert_eq!(catalog[0].format_name, "720p 30fps video audio");
        assert_eq!(catalog[1].format_name, "audio");
    }

    #[test]
    fn label_components_follow_codec_presence() {
        assert!(FormatKind::VideoAudio.has_video());
        assert!(FormatKind::VideoAudio.has_audio());
        assert!(!FormatKind::Audio.has_video());
        assert!(FormatKind::Audio.has_audio());

        let catalog = build_catalog(vec![
            raw("22", None, Some("avc1"), Some("mp4a"), None),
            raw("140", None, None, Some("mp4a"), None),
        ]);
        assert_eq!(catalog[0].format_name, "video audio");
        assert_eq!(catalog[1].format_name, "audio");
    }

    #[test]
    fn quality_falls_back_to_format_note() {
        let mut audio = raw("140", None, None, Some("mp4a"), None);
        audio.format_note = Some("medium".to_string());
        let catalog = build_catalog(vec![audio]);
        assert_eq!(catalog[0].quality, "medium");
    }

    #[test]
    fn fractional_fps_keeps_its_precision() {
        assert_eq!(fps_label(30.0), "30fps");
        assert_eq!(fps_label(29.97), "29.97fps");
    }
}
