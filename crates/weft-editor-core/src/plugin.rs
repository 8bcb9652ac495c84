//! State plugins.
//!
//! A plugin owns a piece of state that lives inside `EditorState` next to the
//! document and is advanced by `Plugin::apply` for every transaction the
//! state applies. Plugin state is a plain value threaded through the apply
//! cycle, so two editor states never share it.

use std::any::Any;
use std::rc::Rc;

use crate::decoration::WidgetView;
use crate::text::EditorRope;
use crate::transaction::Transaction;

/// Identifies a plugin, its state slot, and its transaction metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey(&'static str);

impl PluginKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// A stateful observer of the transaction stream.
pub trait Plugin: 'static {
    /// The plugin's state. Cloned only when a caller asks for an owned copy.
    type State: 'static;

    fn key(&self) -> PluginKey;

    /// Initial state, computed when the plugin is attached to a state.
    fn init(&self, doc: &EditorRope) -> Self::State;

    /// Compute the next state from the previous one and a transaction.
    ///
    /// `doc` is the document after the transaction.
    fn apply(&self, tr: &Transaction, prev: &Self::State, doc: &EditorRope) -> Self::State;

    /// Widgets this plugin wants rendered for the given state.
    fn decorations(&self, _state: &Self::State) -> Vec<WidgetView> {
        Vec::new()
    }
}

/// Object-safe view of a `Plugin`, used by `EditorState` to store plugins of
/// different state types side by side.
pub(crate) trait ErasedPlugin {
    fn key(&self) -> PluginKey;
    fn init_any(&self, doc: &EditorRope) -> Rc<dyn Any>;
    fn apply_any(&self, tr: &Transaction, prev: &Rc<dyn Any>, doc: &EditorRope) -> Rc<dyn Any>;
    fn decorations_any(&self, state: &dyn Any) -> Vec<WidgetView>;
}

impl<P: Plugin> ErasedPlugin for P {
    fn key(&self) -> PluginKey {
        Plugin::key(self)
    }

    fn init_any(&self, doc: &EditorRope) -> Rc<dyn Any> {
        Rc::new(self.init(doc))
    }

    fn apply_any(&self, tr: &Transaction, prev: &Rc<dyn Any>, doc: &EditorRope) -> Rc<dyn Any> {
        match prev.downcast_ref::<P::State>() {
            Some(prev) => Rc::new(self.apply(tr, prev, doc)),
            None => {
                tracing::warn!(
                    plugin = Plugin::key(self).name(),
                    "plugin state has unexpected type, keeping it"
                );
                Rc::clone(prev)
            }
        }
    }

    fn decorations_any(&self, state: &dyn Any) -> Vec<WidgetView> {
        state
            .downcast_ref::<P::State>()
            .map(|state| self.decorations(state))
            .unwrap_or_default()
    }
}
