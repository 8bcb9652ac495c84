//! Filename/URL queries for media kind detection.

use std::sync::LazyLock;

use regex_lite::Regex;

static VIDEO_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(m4v|avi|mpg|mp4|webm|mov)$").unwrap());

/// Whether a filename or URL names a video, judged by its extension.
///
/// A leading `blob:` scheme is ignored.
pub fn is_video(src: &str) -> bool {
    let src = src.strip_prefix("blob:").unwrap_or(src);
    VIDEO_EXTENSION.is_match(src)
}

/// Strip the video extension hosts append to `blob:` object URLs.
///
/// Object URLs carry no extension of their own, so hosts tag them with the
/// original file's extension to let `is_video` classify them. The tag has to
/// come off again before the URL is handed to a media element. Non-blob
/// sources are returned unchanged.
///
/// Only the trailing extension is removed, matched case-insensitively like
/// `is_video`. An extension earlier in the path is part of the URL.
pub fn video_blob_format(src: &str) -> &str {
    if !src.contains("blob:") {
        return src;
    }
    match VIDEO_EXTENSION.find(src) {
        Some(ext) => &src[..ext.start()],
        None => src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extensions() {
        for name in ["a.m4v", "a.avi", "a.mpg", "a.mp4", "a.webm", "a.mov"] {
            assert!(is_video(name), "{name} should be a video");
        }
        assert!(is_video("https://cdn.example.com/uploads/clip.MP4"));
        assert!(is_video("Holiday.Mov"));
    }

    #[test]
    fn test_non_video() {
        assert!(!is_video("photo.png"));
        assert!(!is_video("movie.mp4.png"));
        assert!(!is_video("mp4"));
        assert!(!is_video("https://example.com/video.mp4?token=abc"));
        assert!(!is_video(""));
    }

    #[test]
    fn test_blob_prefix() {
        assert!(is_video("blob:https://app.example.com/1f2e.mp4"));
        assert!(!is_video("blob:https://app.example.com/1f2e"));
    }

    #[test]
    fn test_video_blob_format() {
        assert_eq!(
            video_blob_format("blob:https://app.example.com/1f2e.webm"),
            "blob:https://app.example.com/1f2e"
        );
        assert_eq!(
            video_blob_format("blob:https://app.example.com/1f2e"),
            "blob:https://app.example.com/1f2e"
        );
        assert_eq!(
            video_blob_format("https://cdn.example.com/clip.mp4"),
            "https://cdn.example.com/clip.mp4"
        );
    }

    #[test]
    fn test_video_blob_format_strips_trailing_tag_only() {
        assert_eq!(
            video_blob_format("blob:https://app.example.com/a.mp4/b.mp4"),
            "blob:https://app.example.com/a.mp4/b"
        );
        assert_eq!(
            video_blob_format("blob:https://app.example.com/1f2e.MOV"),
            "blob:https://app.example.com/1f2e"
        );
        assert_eq!(
            video_blob_format("blob:https://app.example.com/a.mp4/b"),
            "blob:https://app.example.com/a.mp4/b"
        );
    }
}
