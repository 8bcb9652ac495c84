//! weft-editor-core: the document engine under the weft editor.
//!
//! This crate provides:
//! - `TextBuffer` trait for text storage abstraction
//! - `EditorRope` - ropey-backed implementation
//! - `Step`/`Mapping` - edits and position mapping across them
//! - `Transaction` - steps plus out-of-band metadata
//! - `Plugin`/`EditorState` - versioned state threaded through every edit
//! - `DecorationSet` - widgets anchored to positions that follow edits
//! - `EditorView`/`ViewHandle` - dispatch, observers, and undo/redo

pub mod decoration;
pub mod history;
pub mod mapping;
pub mod plugin;
pub mod state;
pub mod text;
pub mod transaction;
pub mod types;
pub mod view;

pub use decoration::{Decoration, DecorationSet, Widget, WidgetView};
pub use history::{HISTORY, History, HistoryOp, UndoManager};
pub use mapping::{MapResult, Mapping, Step, StepError, StepMap};
pub use plugin::{Plugin, PluginKey};
pub use smol_str::SmolStr;
pub use state::{ApplyError, EditorState};
pub use text::{EditorRope, TextBuffer};
pub use transaction::Transaction;
pub use types::{Assoc, Selection};
pub use view::{EditorView, Observer, ViewHandle};
