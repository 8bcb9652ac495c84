//! Dropping or pasting media files into the editor.
//!
//! `insert_files` puts a placeholder in the document for every accepted file,
//! starts all uploads at once and hands back an `UploadBatch`. Polling the
//! batch drives the uploads; each one is reconciled on its own as it
//! settles:
//!
//! - success: the media is inserted wherever the placeholder has ended up,
//!   in the same transaction that removes the placeholder
//! - failure: the placeholder is removed and the host is told via toast
//! - placeholder gone (its surrounding content was deleted): nothing happens
//!
//! Reconciliation reads the *current* editor state at the time the upload
//! settles, never the state the upload started from.

use std::cell::Cell;
use std::collections::HashSet;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, Stream, StreamExt};
use weft_editor_core::ViewHandle;

use crate::error::{MediaRenderError, UploadError};
use crate::event::EditorEvent;
use crate::file::{FileSelection, MediaFile};
use crate::options::{Callback, ToastType, UploadOptions};
use crate::placeholder::{PLACEHOLDER, PlaceholderAction, UploadId, find_placeholder};
use crate::query::{is_video, video_blob_format};

/// Media node inserted once an upload finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaNode {
    src: String,
    video: bool,
}

impl MediaNode {
    pub fn new(src: impl Into<String>) -> Self {
        let src = src.into();
        let video = is_video(&src);
        Self { src, video }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn is_video(&self) -> bool {
        self.video
    }

    /// Source to hand to a media element, without any extension tag a host
    /// appended to a `blob:` URL.
    pub fn display_src(&self) -> &str {
        if self.video {
            video_blob_format(&self.src)
        } else {
            &self.src
        }
    }

    /// Markdown source for the node.
    pub fn to_markdown(&self) -> String {
        if self.src.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            format!("![](<{}>)", self.src)
        } else {
            format!("![]({})", self.src)
        }
    }
}

/// How one upload ended up in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Media inserted at `pos` and the placeholder removed.
    Inserted { pos: usize, node: MediaNode },
    /// The placeholder was gone by the time the upload finished.
    Abandoned,
    /// The upload failed. The placeholder was removed.
    Failed(UploadError),
}

/// Outcome of a single file of a batch.
///
/// `Err` means the media was uploaded but could not be loaded for display.
/// Its placeholder stays in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettlement {
    pub id: UploadId,
    pub outcome: Result<Settlement, MediaRenderError>,
}

/// Counts settled uploads of one `insert_files` call and fires the stop
/// callback when the count reaches `expected`.
struct Progress {
    settled: Cell<usize>,
    expected: usize,
    on_stop: Option<Callback>,
}

impl Progress {
    fn new(expected: usize, on_stop: Option<Callback>) -> Self {
        Self {
            settled: Cell::new(0),
            expected,
            on_stop,
        }
    }

    fn settle(&self) {
        let settled = self.settled.get() + 1;
        self.settled.set(settled);
        if settled == self.expected
            && let Some(on_stop) = &self.on_stop
        {
            on_stop();
        }
    }
}

/// The uploads started by one `insert_files` call.
///
/// A stream of `FileSettlement`s in completion order. Uploads only make
/// progress while the batch is polled.
///
/// Dropping the batch abandons the uploads that have not settled yet and
/// removes their placeholders.
#[must_use = "uploads make no progress unless the batch is polled"]
pub struct UploadBatch {
    view: ViewHandle,
    ids: Vec<UploadId>,
    settled: HashSet<UploadId>,
    pending: FuturesUnordered<LocalBoxFuture<'static, FileSettlement>>,
}

impl UploadBatch {
    /// Ids of every upload in the batch, in file order.
    pub fn ids(&self) -> &[UploadId] {
        &self.ids
    }

    /// Number of uploads not yet settled.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drive every upload to completion.
    pub async fn settle_all(self) -> Vec<FileSettlement> {
        self.collect().await
    }
}

impl Stream for UploadBatch {
    type Item = FileSettlement;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<FileSettlement>> {
        let this = self.get_mut();
        let next = this.pending.poll_next_unpin(cx);
        if let Poll::Ready(Some(settlement)) = &next {
            this.settled.insert(settlement.id);
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        for &id in &self.ids {
            if !self.settled.contains(&id) && remove_placeholder(&self.view, id) {
                tracing::debug!(%id, "upload batch dropped, placeholder removed");
            }
        }
    }
}

impl std::fmt::Debug for UploadBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBatch")
            .field("ids", &self.ids)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Upload `files` dropped or pasted at `pos`.
///
/// Returns `None`, leaving `event` untouched, when there is nothing to do:
/// no file is an image or video, no uploader is configured, or the editor
/// has no `UploadPlaceholderPlugin`. Otherwise the event is claimed, one
/// placeholder per file is in the document before this returns, and the
/// returned batch drives the uploads.
///
/// When the drop contains any video, only the videos are uploaded.
#[must_use = "uploads make no progress unless the batch is polled"]
pub fn insert_files(
    view: &ViewHandle,
    event: &mut EditorEvent,
    pos: usize,
    files: impl IntoIterator<Item = MediaFile>,
    options: &UploadOptions,
) -> Option<UploadBatch> {
    let selection = FileSelection::classify(files);
    if selection.is_empty() {
        return None;
    }

    let Some(uploader) = options.uploader() else {
        tracing::warn!("upload_media must be configured to handle media uploads");
        return None;
    };

    if !view.state().has_plugin(PLACEHOLDER) {
        tracing::warn!("UploadPlaceholderPlugin is not registered, ignoring dropped media");
        return None;
    }

    event.prevent_default();

    if let Some(on_start) = options.start_callback() {
        on_start();
    }

    // The stop callback is tied to the image count even when videos took
    // precedence, so a video-only drop never reports completion.
    let progress = Rc::new(Progress::new(
        selection.image_count(),
        options.stop_callback().cloned(),
    ));

    let selected = selection.into_selected();
    tracing::debug!(
        files = selected.len(),
        pos,
        kind = ?event.kind(),
        "inserting media files"
    );

    let mut batch = UploadBatch {
        view: view.clone(),
        ids: Vec::with_capacity(selected.len()),
        settled: HashSet::new(),
        pending: FuturesUnordered::new(),
    };

    for file in selected {
        let id = UploadId::fresh();

        let mut tr = view.state().tr();
        tr.set_meta(
            PLACEHOLDER,
            PlaceholderAction::Add {
                id,
                file: file.clone(),
                pos,
            },
        );
        if let Err(err) = view.dispatch(tr) {
            tracing::error!(%id, error = %err, "failed to insert upload placeholder");
            progress.settle();
            continue;
        }

        let upload = uploader.upload(file);
        batch.ids.push(id);
        let settlement = settle(
            view.clone(),
            id,
            upload,
            options.clone(),
            Rc::clone(&progress),
        );
        batch.pending.push(settlement.boxed_local());
    }

    Some(batch)
}

async fn settle(
    view: ViewHandle,
    id: UploadId,
    upload: LocalBoxFuture<'static, Result<String, UploadError>>,
    options: UploadOptions,
    progress: Rc<Progress>,
) -> FileSettlement {
    let src = match upload.await {
        Ok(src) => src,
        Err(err) => {
            tracing::error!(%id, error = %err, "media upload failed");
            remove_placeholder(&view, id);
            if let Some(toast) = options.toast() {
                toast(&options.dictionary().media_upload_error, ToastType::Error);
            }
            progress.settle();
            return FileSettlement {
                id,
                outcome: Ok(Settlement::Failed(err)),
            };
        }
    };

    let node = MediaNode::new(src);

    if node.is_video() {
        let outcome = place(&view, id, node);
        progress.settle();
        return FileSettlement {
            id,
            outcome: Ok(outcome),
        };
    }

    if find_placeholder(&view.state(), id).is_none() {
        tracing::debug!(%id, "placeholder gone before image load, abandoning");
        progress.settle();
        return FileSettlement {
            id,
            outcome: Ok(Settlement::Abandoned),
        };
    }

    let load = options.media_loader().load_image(node.src());
    progress.settle();

    let outcome = match load.await {
        Ok(()) => Ok(place(&view, id, node)),
        Err(err) => {
            tracing::error!(%id, error = %err, "uploaded image failed to load");
            Err(err)
        }
    };
    FileSettlement { id, outcome }
}

fn place(view: &ViewHandle, id: UploadId, node: MediaNode) -> Settlement {
    match replace_placeholder(view, id, &node) {
        Some(pos) => Settlement::Inserted { pos, node },
        None => {
            tracing::debug!(%id, "placeholder gone, abandoning upload");
            Settlement::Abandoned
        }
    }
}

/// Insert `node` where the placeholder of `id` currently is and remove the
/// placeholder, in one transaction.
///
/// Returns the insertion position, or `None` without touching the document
/// if the placeholder no longer exists.
pub fn replace_placeholder(view: &ViewHandle, id: UploadId, node: &MediaNode) -> Option<usize> {
    let state = view.state();
    let pos = find_placeholder(&state, id)?;

    let mut tr = state.tr();
    if let Err(err) = tr.insert_text(pos, node.to_markdown()) {
        tracing::warn!(%id, pos, error = %err, "placeholder position outside document");
        return None;
    }
    tr.set_meta(PLACEHOLDER, PlaceholderAction::Remove { id });

    match view.dispatch(tr) {
        Ok(()) => Some(pos),
        Err(err) => {
            tracing::warn!(%id, error = %err, "media insertion rejected");
            None
        }
    }
}

/// Remove the placeholder of `id` without inserting anything.
///
/// Returns whether a placeholder was removed.
pub fn remove_placeholder(view: &ViewHandle, id: UploadId) -> bool {
    let state = view.state();
    if find_placeholder(&state, id).is_none() {
        return false;
    }
    let mut tr = state.tr();
    tr.set_meta(PLACEHOLDER, PlaceholderAction::Remove { id });
    match view.dispatch(tr) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%id, error = %err, "placeholder removal rejected");
            false
        }
    }
}
