//! Dropped/pasted files and their classification.

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use smol_str::SmolStr;

/// A file handed to the editor by a drop or paste.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    /// Original filename, also used for extension-based video detection
    name: SmolStr,
    /// Declared MIME type (may be empty when the platform does not know it)
    mime_type: SmolStr,
    /// Raw file bytes
    data: Bytes,
}

impl MediaFile {
    pub fn new(
        name: impl Into<SmolStr>,
        mime_type: impl Into<SmolStr>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn is_image_type(&self) -> bool {
        mime_mentions(&self.mime_type, "image")
    }

    pub fn is_video_type(&self) -> bool {
        mime_mentions(&self.mime_type, "video")
    }

    /// Inline `data:` URL of the file contents, for local previews.
    pub fn data_url(&self) -> String {
        let mime = if self.mime_type.is_empty() {
            "application/octet-stream"
        } else {
            self.mime_type.as_str()
        };
        format!("data:{};base64,{}", mime, STANDARD.encode(&self.data))
    }
}

fn mime_mentions(mime_type: &str, kind: &str) -> bool {
    mime_type.to_ascii_lowercase().contains(kind)
}

/// Files from one drop, split by media kind.
///
/// A file whose MIME type mentions both kinds lands in both lists.
#[derive(Clone, Debug, Default)]
pub struct FileSelection {
    images: Vec<MediaFile>,
    videos: Vec<MediaFile>,
}

impl FileSelection {
    pub fn classify(files: impl IntoIterator<Item = MediaFile>) -> Self {
        let mut selection = Self::default();
        for file in files {
            if file.is_image_type() {
                selection.images.push(file.clone());
            }
            if file.is_video_type() {
                selection.videos.push(file);
            }
        }
        selection
    }

    /// True when no file is an image or a video.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    /// The files to upload: the videos if there are any, otherwise the images.
    pub fn into_selected(self) -> Vec<MediaFile> {
        if self.videos.is_empty() {
            self.images
        } else {
            self.videos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str) -> MediaFile {
        MediaFile::new(name, mime, Bytes::from_static(b"\x89PNG"))
    }

    #[test]
    fn test_mime_classification() {
        assert!(file("a.png", "image/png").is_image_type());
        assert!(file("a.png", "IMAGE/PNG").is_image_type());
        assert!(file("a.mp4", "video/mp4").is_video_type());
        assert!(!file("a.txt", "text/plain").is_image_type());
        assert!(!file("a.mp4", "").is_video_type());
    }

    #[test]
    fn test_selection_prefers_videos() {
        let selection = FileSelection::classify([
            file("a.png", "image/png"),
            file("b.mp4", "video/mp4"),
            file("c.txt", "text/plain"),
        ]);
        assert_eq!(selection.image_count(), 1);
        assert_eq!(selection.video_count(), 1);
        let selected = selection.into_selected();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "b.mp4");
    }

    #[test]
    fn test_selection_images_only() {
        let selection =
            FileSelection::classify([file("a.png", "image/png"), file("b.gif", "image/gif")]);
        let names: Vec<_> = selection
            .into_selected()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["a.png", "b.gif"]);
    }

    #[test]
    fn test_selection_empty() {
        assert!(FileSelection::classify([file("notes.md", "text/markdown")]).is_empty());
        assert!(FileSelection::classify([]).is_empty());
    }

    #[test]
    fn test_data_url() {
        let f = MediaFile::new("a.png", "image/png", Bytes::from_static(b"abc"));
        assert_eq!(f.data_url(), "data:image/png;base64,YWJj");
        let untyped = MediaFile::new("a", "", Bytes::from_static(b"abc"));
        assert_eq!(untyped.data_url(), "data:application/octet-stream;base64,YWJj");
    }
}
