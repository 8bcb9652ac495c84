//! Transactions: a batch of steps plus out-of-band metadata.
//!
//! A transaction is built from an `EditorState`, accumulates steps against
//! its own working copy of the document, and is then handed to
//! `EditorState::apply` (usually through `EditorView::dispatch`). Metadata
//! attached with `set_meta` travels alongside the content change so plugins
//! can react to intents that are not document edits at all.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::mapping::{Mapping, Step, StepError};
use crate::plugin::PluginKey;
use crate::text::EditorRope;
use crate::types::Selection;

/// A set of document changes and metadata to apply to one state version.
#[derive(Clone)]
pub struct Transaction {
    base_version: u64,
    doc: EditorRope,
    steps: Vec<Step>,
    inverted: Vec<Step>,
    mapping: Mapping,
    selection: Option<Selection>,
    meta: HashMap<PluginKey, Rc<dyn Any>>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("base_version", &self.base_version)
            .field("steps", &self.steps)
            .field("selection", &self.selection)
            .field("meta_keys", &self.meta.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Transaction {
    pub(crate) fn new(base_version: u64, doc: EditorRope) -> Self {
        Self {
            base_version,
            doc,
            steps: Vec::new(),
            inverted: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
            meta: HashMap::new(),
        }
    }

    /// Version of the state this transaction was started from.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// The document with all steps so far applied.
    pub fn doc(&self) -> &EditorRope {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps that undo this transaction, in the order they must be applied.
    pub fn inverted_steps(&self) -> impl Iterator<Item = &Step> {
        self.inverted.iter().rev()
    }

    /// Maps positions in the base document to positions in `doc()`.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Add a step. On error the transaction is left unchanged.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let inverse = step.invert(&self.doc);
        let map = step.apply(&mut self.doc)?;
        // `apply` validated the range, so the inverse was computable.
        if let Some(inverse) = inverse {
            self.inverted.push(inverse);
        }
        tracing::trace!(
            from = map.from,
            to = map.to,
            inserted = map.inserted,
            "step applied"
        );
        self.mapping.push(map);
        self.steps.push(step);
        Ok(self)
    }

    /// Replace `from..to` (positions in the current `doc()`) with text.
    pub fn replace_with(
        &mut self,
        from: usize,
        to: usize,
        text: impl Into<SmolStr>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::Replace {
            from,
            to,
            text: text.into(),
        })
    }

    pub fn insert_text(
        &mut self,
        at: usize,
        text: impl Into<SmolStr>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::insert(at, text))
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        self.step(Step::delete(from, to))
    }

    /// Explicitly set the selection after this transaction.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Attach metadata for the plugin (or other consumer) owning `key`.
    pub fn set_meta<T: Any>(&mut self, key: PluginKey, value: T) -> &mut Self {
        self.meta.insert(key, Rc::new(value));
        self
    }

    /// Read metadata for `key`, if present and of type `T`.
    pub fn get_meta<T: Any>(&self, key: PluginKey) -> Option<&T> {
        self.meta.get(&key)?.downcast_ref::<T>()
    }
}
