//! Upload placeholders.
//!
//! While a file uploads, the editor shows a preview widget where the file
//! will land. The widget is a decoration, not document content: it lives in
//! the `PlaceholderStore` owned by `UploadPlaceholderPlugin`, keyed by the
//! upload's `UploadId`, and its position is remapped through every
//! transaction so the finished upload can be inserted where the placeholder
//! currently is.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use weft_editor_core::{
    Decoration, DecorationSet, EditorRope, EditorState, Plugin, PluginKey, TextBuffer, Transaction,
    Widget, WidgetView,
};

use crate::file::MediaFile;
use crate::query::is_video;

/// Key of the placeholder plugin and of its transaction metadata.
pub const PLACEHOLDER: PluginKey = PluginKey::new("uploadPlaceholder");

static NEXT_UPLOAD_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one in-flight upload.
///
/// Ids are unique for the lifetime of the process and carry no meaning
/// beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadId(u64);

impl UploadId {
    /// Allocate an id never handed out before.
    pub fn fresh() -> Self {
        Self(NEXT_UPLOAD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

/// Preview shown in place of a file that is still uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderWidget {
    video: bool,
    src: String,
}

impl PlaceholderWidget {
    pub fn for_file(file: &MediaFile) -> Self {
        Self {
            video: is_video(file.name()),
            src: file.data_url(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.video
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

impl Widget for PlaceholderWidget {
    fn render_html(&self) -> String {
        if self.video {
            format!(
                r#"<div class="image placeholder"><video src="{}" style="width: 100%; height: 100%" controls></video></div>"#,
                self.src
            )
        } else {
            format!(r#"<div class="image placeholder"><img src="{}"></div>"#, self.src)
        }
    }
}

/// Intent attached to a transaction under [`PLACEHOLDER`].
#[derive(Debug, Clone)]
pub enum PlaceholderAction {
    /// Show a placeholder for `file` at `pos` (a position in the
    /// transaction's resulting document).
    Add {
        id: UploadId,
        file: MediaFile,
        pos: usize,
    },
    /// Drop the placeholder of `id`, if it still exists.
    Remove { id: UploadId },
}

/// The set of live placeholders.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStore {
    set: DecorationSet<UploadId>,
}

impl PlaceholderStore {
    pub fn init() -> Self {
        Self::default()
    }

    /// Next store after `tr`. Positions are remapped first, then the
    /// transaction's placeholder intent (if any) is applied.
    pub fn apply(&self, tr: &Transaction, doc: &EditorRope) -> Self {
        let mut set = self.set.map(tr.mapping());

        match tr.get_meta::<PlaceholderAction>(PLACEHOLDER) {
            Some(PlaceholderAction::Add { id, file, pos }) => {
                if set.find(|spec| spec == id).is_empty() {
                    let widget: Rc<dyn Widget> = Rc::new(PlaceholderWidget::for_file(file));
                    set = set.add(doc.len_chars(), [Decoration::widget(*pos, widget, *id)]);
                    tracing::trace!(%id, pos, "placeholder added");
                } else {
                    tracing::warn!(%id, "placeholder id already in use, ignoring add");
                }
            }
            Some(PlaceholderAction::Remove { id }) => {
                set = set.remove_where(|spec| spec == id);
                tracing::trace!(%id, "placeholder removed");
            }
            None => {}
        }

        Self { set }
    }

    /// Current position of the placeholder for `id`.
    ///
    /// `None` if it was never added, was removed, or its anchor was deleted.
    pub fn find(&self, id: UploadId) -> Option<usize> {
        self.set.find(|spec| *spec == id).first().map(|deco| deco.pos())
    }

    pub fn contains(&self, id: UploadId) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Ids and positions of all live placeholders, in position order.
    pub fn entries(&self) -> Vec<(UploadId, usize)> {
        self.set.iter().map(|deco| (*deco.spec(), deco.pos())).collect()
    }

    pub fn decorations(&self) -> Vec<WidgetView> {
        self.set.views()
    }
}

/// Plugin owning the `PlaceholderStore` of an editor state.
///
/// Register it once per editor with `EditorState::with_plugin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadPlaceholderPlugin;

impl Plugin for UploadPlaceholderPlugin {
    type State = PlaceholderStore;

    fn key(&self) -> PluginKey {
        PLACEHOLDER
    }

    fn init(&self, _doc: &EditorRope) -> PlaceholderStore {
        PlaceholderStore::init()
    }

    fn apply(
        &self,
        tr: &Transaction,
        prev: &PlaceholderStore,
        doc: &EditorRope,
    ) -> PlaceholderStore {
        prev.apply(tr, doc)
    }

    fn decorations(&self, state: &PlaceholderStore) -> Vec<WidgetView> {
        state.decorations()
    }
}

/// The placeholder store of `state`, if the plugin is registered.
pub fn placeholders(state: &EditorState) -> Option<&PlaceholderStore> {
    state.plugin_state::<UploadPlaceholderPlugin>(PLACEHOLDER)
}

/// Current position of the placeholder for `id` in `state`.
pub fn find_placeholder(state: &EditorState, id: UploadId) -> Option<usize> {
    placeholders(state)?.find(id)
}
