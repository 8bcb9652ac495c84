//! Error types for media uploads.

use miette::Diagnostic;
use thiserror::Error;

/// An upload backend failure. Recovered by removing the placeholder.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    /// The request never completed (network, timeout, aborted).
    #[error("media upload failed: {0}")]
    #[diagnostic(code(weft::upload::transport))]
    Transport(String),

    /// The backend answered but refused the file.
    #[error("media upload rejected ({status}): {message}")]
    #[diagnostic(
        code(weft::upload::rejected),
        help("check the file size and type limits of the upload backend")
    )]
    Rejected { status: u16, message: String },
}

impl UploadError {
    pub fn transport(message: impl Into<String>) -> Self {
        UploadError::Transport(message.into())
    }
}

/// Uploaded media that could not be loaded for display.
///
/// Fatal for the file it concerns: it is reported to the host instead of
/// being recovered.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("uploaded media at {src} failed to load: {reason}")]
#[diagnostic(
    code(weft::upload::render),
    help("the uploaded file may be corrupt or in a format the renderer cannot decode")
)]
pub struct MediaRenderError {
    pub src: String,
    pub reason: String,
}

impl MediaRenderError {
    pub fn new(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            reason: reason.into(),
        }
    }
}
