//! Host-supplied configuration for media uploads.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::{MediaRenderError, UploadError};
use crate::file::MediaFile;

/// Upload backend. Resolves to the public URL of the stored file.
///
/// Implemented for any `Fn(MediaFile) -> impl Future<Output = Result<String, UploadError>>`.
pub trait MediaUploader {
    fn upload(&self, file: MediaFile) -> LocalBoxFuture<'static, Result<String, UploadError>>;
}

impl<F, Fut> MediaUploader for F
where
    F: Fn(MediaFile) -> Fut,
    Fut: Future<Output = Result<String, UploadError>> + 'static,
{
    fn upload(&self, file: MediaFile) -> LocalBoxFuture<'static, Result<String, UploadError>> {
        self(file).boxed_local()
    }
}

/// Resolves once uploaded media is ready to render.
///
/// Hosts with a real renderer wait for the image to decode here so the
/// placeholder is not swapped for a blank frame.
pub trait MediaLoader {
    fn load_image(&self, src: &str) -> LocalBoxFuture<'static, Result<(), MediaRenderError>>;
}

/// Loader that treats every image as ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateLoader;

impl MediaLoader for ImmediateLoader {
    fn load_image(&self, _src: &str) -> LocalBoxFuture<'static, Result<(), MediaRenderError>> {
        futures_util::future::ready(Ok(())).boxed_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    Info,
    Error,
}

/// User-facing strings.
///
/// Missing keys fall back to the English defaults when deserialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dictionary {
    pub media_upload_error: String,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            media_upload_error: "Sorry, an error occurred uploading the media".to_string(),
        }
    }
}

impl Dictionary {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

pub(crate) type Callback = Rc<dyn Fn()>;
pub(crate) type ToastHandler = Rc<dyn Fn(&str, ToastType)>;

/// Everything `insert_files` needs from the host.
#[derive(Clone)]
pub struct UploadOptions {
    upload_media: Option<Rc<dyn MediaUploader>>,
    on_image_upload_start: Option<Callback>,
    on_image_upload_stop: Option<Callback>,
    on_show_toast: Option<ToastHandler>,
    loader: Rc<dyn MediaLoader>,
    dictionary: Dictionary,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upload_media: None,
            on_image_upload_start: None,
            on_image_upload_stop: None,
            on_show_toast: None,
            loader: Rc::new(ImmediateLoader),
            dictionary: Dictionary::default(),
        }
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("upload_media", &self.upload_media.is_some())
            .field(
                "on_image_upload_start",
                &self.on_image_upload_start.is_some(),
            )
            .field("on_image_upload_stop", &self.on_image_upload_stop.is_some())
            .field("on_show_toast", &self.on_show_toast.is_some())
            .field("dictionary", &self.dictionary)
            .finish_non_exhaustive()
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_media(mut self, uploader: impl MediaUploader + 'static) -> Self {
        self.upload_media = Some(Rc::new(uploader));
        self
    }

    pub fn on_image_upload_start(mut self, f: impl Fn() + 'static) -> Self {
        self.on_image_upload_start = Some(Rc::new(f));
        self
    }

    pub fn on_image_upload_stop(mut self, f: impl Fn() + 'static) -> Self {
        self.on_image_upload_stop = Some(Rc::new(f));
        self
    }

    pub fn on_show_toast(mut self, f: impl Fn(&str, ToastType) + 'static) -> Self {
        self.on_show_toast = Some(Rc::new(f));
        self
    }

    pub fn loader(mut self, loader: impl MediaLoader + 'static) -> Self {
        self.loader = Rc::new(loader);
        self
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn has_uploader(&self) -> bool {
        self.upload_media.is_some()
    }

    pub(crate) fn uploader(&self) -> Option<&Rc<dyn MediaUploader>> {
        self.upload_media.as_ref()
    }

    pub(crate) fn media_loader(&self) -> &Rc<dyn MediaLoader> {
        &self.loader
    }

    pub(crate) fn start_callback(&self) -> Option<&Callback> {
        self.on_image_upload_start.as_ref()
    }

    pub(crate) fn stop_callback(&self) -> Option<&Callback> {
        self.on_image_upload_stop.as_ref()
    }

    pub(crate) fn toast(&self) -> Option<&ToastHandler> {
        self.on_show_toast.as_ref()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }
}
