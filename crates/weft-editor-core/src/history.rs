//! Undo/redo history.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History`, the stacks of inverse steps recorded by `EditorView`
//!
//! Undo and redo are dispatched as ordinary transactions, so every plugin
//! (decorations included) sees them and remaps its state like for any other
//! edit.

use crate::mapping::Step;
use crate::plugin::PluginKey;
use crate::transaction::Transaction;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// Metadata key marking history transactions.
pub const HISTORY: PluginKey = PluginKey::new("history");

/// Value stored under [`HISTORY`] on transactions created by undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOp {
    Undo,
    Redo,
}

/// Steps that revert one recorded transaction, in application order.
#[derive(Debug, Clone)]
pub(crate) struct HistoryEntry {
    pub(crate) steps: Vec<Step>,
}

impl HistoryEntry {
    fn inverse_of(tr: &Transaction) -> Self {
        Self {
            steps: tr.inverted_steps().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_steps: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record an applied transaction. Transactions that did not change the
    /// document are not recorded.
    pub(crate) fn record(&mut self, tr: &Transaction) {
        if !tr.doc_changed() {
            return;
        }
        let entry = HistoryEntry::inverse_of(tr);
        match tr.get_meta::<HistoryOp>(HISTORY) {
            Some(HistoryOp::Undo) => self.redo_stack.push(entry),
            Some(HistoryOp::Redo) => self.push_undo(entry),
            None => {
                // Clear redo stack on new edit
                self.redo_stack.clear();
                self.push_undo(entry);
            }
        }
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        // Trim if over max
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    pub(crate) fn pop(&mut self, op: HistoryOp) -> Option<HistoryEntry> {
        match op {
            HistoryOp::Undo => self.undo_stack.pop(),
            HistoryOp::Redo => self.redo_stack.pop(),
        }
    }

    /// Put an entry back after a failed undo/redo.
    pub(crate) fn restore(&mut self, op: HistoryOp, entry: HistoryEntry) {
        match op {
            HistoryOp::Undo => self.undo_stack.push(entry),
            HistoryOp::Redo => self.redo_stack.push(entry),
        }
    }

    pub(crate) fn can(&self, op: HistoryOp) -> bool {
        match op {
            HistoryOp::Undo => !self.undo_stack.is_empty(),
            HistoryOp::Redo => !self.redo_stack.is_empty(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
