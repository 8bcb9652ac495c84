//! weft-editor-media: media uploads for the weft editor.
//!
//! This crate provides:
//! - `insert_files` - drop/paste handler that uploads files behind placeholders
//! - `UploadPlaceholderPlugin` - placeholder decorations that follow edits
//! - `find_placeholder` - where an upload's placeholder currently is
//! - `UploadOptions` - uploader, loader, callbacks and localised strings
//! - `is_video` / `video_blob_format` - extension-based media queries

pub mod error;
pub mod event;
pub mod file;
pub mod insert_files;
pub mod options;
pub mod placeholder;
pub mod query;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use error::{MediaRenderError, UploadError};
pub use event::{EditorEvent, EventKind};
pub use file::{FileSelection, MediaFile};
pub use insert_files::{
    FileSettlement, MediaNode, Settlement, UploadBatch, insert_files, remove_placeholder,
    replace_placeholder,
};
pub use options::{
    Dictionary, ImmediateLoader, MediaLoader, MediaUploader, ToastType, UploadOptions,
};
pub use placeholder::{
    PLACEHOLDER, PlaceholderAction, PlaceholderStore, PlaceholderWidget, UploadId,
    UploadPlaceholderPlugin, find_placeholder, placeholders,
};
pub use query::{is_video, video_blob_format};
