//! Immutable editor state.
//!
//! An `EditorState` is a versioned value: the document, the selection, and
//! the state of every registered plugin. `apply` never mutates; it returns
//! the next state.

use std::any::Any;
use std::rc::Rc;

use thiserror::Error;

use crate::decoration::WidgetView;
use crate::plugin::{ErasedPlugin, Plugin, PluginKey};
use crate::text::{EditorRope, TextBuffer};
use crate::transaction::Transaction;
use crate::types::Selection;

/// Errors from applying a transaction to a state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApplyError {
    /// The transaction was built from a different state version.
    #[error("transaction built for version {transaction} applied to version {state}")]
    Stale { transaction: u64, state: u64 },
}

#[derive(Clone)]
pub struct EditorState {
    doc: EditorRope,
    selection: Selection,
    version: u64,
    plugins: Rc<Vec<Rc<dyn ErasedPlugin>>>,
    plugin_states: Vec<Rc<dyn Any>>,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("version", &self.version)
            .field("selection", &self.selection)
            .field("doc_len", &self.doc.len_chars())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.key()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EditorState {
    /// Create a state with no plugins and the cursor at the end of the document.
    pub fn new(doc: impl Into<EditorRope>) -> Self {
        let doc = doc.into();
        let end = doc.len_chars();
        Self {
            doc,
            selection: Selection::collapsed(end),
            version: 0,
            plugins: Rc::new(Vec::new()),
            plugin_states: Vec::new(),
        }
    }

    /// Register a plugin and initialise its state.
    ///
    /// A plugin whose key is already registered is ignored.
    pub fn with_plugin<P: Plugin>(mut self, plugin: P) -> Self {
        let key = Plugin::key(&plugin);
        if self.has_plugin(key) {
            tracing::warn!(plugin = key.name(), "plugin already registered");
            return self;
        }
        self.plugin_states.push(ErasedPlugin::init_any(&plugin, &self.doc));
        Rc::make_mut(&mut self.plugins).push(Rc::new(plugin));
        self
    }

    pub fn doc(&self) -> &EditorRope {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_plugin(&self, key: PluginKey) -> bool {
        self.plugins.iter().any(|p| p.key() == key)
    }

    /// The current state of the plugin registered under `key`.
    pub fn plugin_state<P: Plugin>(&self, key: PluginKey) -> Option<&P::State> {
        let index = self.plugins.iter().position(|p| p.key() == key)?;
        self.plugin_states.get(index)?.downcast_ref::<P::State>()
    }

    /// Start a transaction against this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(self.version, self.doc.clone())
    }

    /// Compute the state that results from applying `tr`.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, ApplyError> {
        if tr.base_version() != self.version {
            return Err(ApplyError::Stale {
                transaction: tr.base_version(),
                state: self.version,
            });
        }

        let doc = tr.doc().clone();
        let selection = tr
            .selection()
            .unwrap_or_else(|| self.selection.map(tr.mapping()));
        let plugin_states = self
            .plugins
            .iter()
            .zip(&self.plugin_states)
            .map(|(plugin, prev)| plugin.apply_any(tr, prev, &doc))
            .collect();

        Ok(EditorState {
            doc,
            selection,
            version: self.version + 1,
            plugins: Rc::clone(&self.plugins),
            plugin_states,
        })
    }

    /// Widgets from every plugin, in position order.
    pub fn decorations(&self) -> Vec<WidgetView> {
        let mut views: Vec<WidgetView> = self
            .plugins
            .iter()
            .zip(&self.plugin_states)
            .flat_map(|(plugin, state)| plugin.decorations_any(&**state))
            .collect();
        views.sort_by_key(|view| view.pos);
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts transactions that changed the document.
    struct EditCounter;

    const COUNTER: PluginKey = PluginKey::new("edit-counter");

    impl Plugin for EditCounter {
        type State = usize;

        fn key(&self) -> PluginKey {
            COUNTER
        }

        fn init(&self, _doc: &EditorRope) -> usize {
            0
        }

        fn apply(&self, tr: &Transaction, prev: &usize, _doc: &EditorRope) -> usize {
            if tr.doc_changed() { prev + 1 } else { *prev }
        }
    }

    #[test]
    fn test_apply_is_pure_and_versioned() {
        let state = EditorState::new("hello").with_plugin(EditCounter);
        let mut tr = state.tr();
        tr.insert_text(5, " world").unwrap();

        let next = state.apply(&tr).unwrap();
        assert_eq!(next.doc().to_string(), "hello world");
        assert_eq!(next.version(), 1);
        assert_eq!(next.plugin_state::<EditCounter>(COUNTER), Some(&1));

        assert_eq!(state.doc().to_string(), "hello");
        assert_eq!(state.plugin_state::<EditCounter>(COUNTER), Some(&0));
    }

    #[test]
    fn test_stale_transaction_rejected() {
        let state = EditorState::new("abc");
        let stale = state.tr();
        let next = state.apply(&state.tr()).unwrap();
        assert_eq!(
            next.apply(&stale).unwrap_err(),
            ApplyError::Stale {
                transaction: 0,
                state: 1
            }
        );
    }

    #[test]
    fn test_selection_maps_through_edits() {
        let state = EditorState::new("abcdef");
        assert_eq!(state.selection(), Selection::collapsed(6));
        let mut tr = state.tr();
        tr.insert_text(0, "xx").unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.selection(), Selection::collapsed(8));
    }

    #[test]
    fn test_duplicate_plugin_ignored() {
        let state = EditorState::new("").with_plugin(EditCounter).with_plugin(EditCounter);
        assert!(state.has_plugin(COUNTER));
        assert_eq!(state.plugins.len(), 1);
    }

    #[test]
    fn test_unknown_plugin_state_is_none() {
        let state = EditorState::new("");
        assert_eq!(state.plugin_state::<EditCounter>(COUNTER), None);
    }
}
