//! The editor view: owner of the live state and its dispatch cycle.
//!
//! All document changes go through `EditorView::dispatch`, which applies the
//! transaction, records it in the history, and notifies observers in
//! dispatch order. `ViewHandle` is the cloneable single-threaded handle that
//! asynchronous continuations hold on to.

use std::cell::RefCell;
use std::rc::Rc;

use crate::decoration::WidgetView;
use crate::history::{HISTORY, History, HistoryOp, UndoManager};
use crate::state::{ApplyError, EditorState};
use crate::transaction::Transaction;

/// Callback invoked after every applied transaction with the new state.
///
/// Observers run while the view is being updated and must not re-enter it.
pub type Observer = Box<dyn FnMut(&Transaction, &EditorState)>;

pub struct EditorView {
    state: EditorState,
    history: History,
    observers: Vec<Observer>,
}

impl EditorView {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            history: History::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Register an observer for all subsequently dispatched transactions.
    pub fn subscribe(&mut self, observer: impl FnMut(&Transaction, &EditorState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply a transaction to the current state.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<(), ApplyError> {
        let next = self.state.apply(&tr)?;
        self.history.record(&tr);
        self.state = next;
        tracing::debug!(
            version = self.state.version(),
            steps = tr.steps().len(),
            "transaction dispatched"
        );
        for observer in &mut self.observers {
            observer(&tr, &self.state);
        }
        Ok(())
    }

    /// Widgets to draw on the next repaint.
    pub fn decorations(&self) -> Vec<WidgetView> {
        self.state.decorations()
    }

    fn run_history(&mut self, op: HistoryOp) -> bool {
        let Some(entry) = self.history.pop(op) else {
            return false;
        };
        let mut tr = self.state.tr();
        let built = entry
            .steps
            .iter()
            .try_for_each(|step| tr.step(step.clone()).map(|_| ()));
        if let Err(err) = built {
            tracing::warn!(?op, error = %err, "history entry no longer applies");
            self.history.restore(op, entry);
            return false;
        }
        tr.set_meta(HISTORY, op);
        match self.dispatch(tr) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(?op, error = %err, "history transaction rejected");
                self.history.restore(op, entry);
                false
            }
        }
    }
}

impl UndoManager for EditorView {
    fn can_undo(&self) -> bool {
        self.history.can(HistoryOp::Undo)
    }

    fn can_redo(&self) -> bool {
        self.history.can(HistoryOp::Redo)
    }

    fn undo(&mut self) -> bool {
        self.run_history(HistoryOp::Undo)
    }

    fn redo(&mut self) -> bool {
        self.run_history(HistoryOp::Redo)
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// Shared handle to an `EditorView`.
///
/// Borrows are held only for the duration of each call, never across an
/// await point.
#[derive(Clone)]
pub struct ViewHandle(Rc<RefCell<EditorView>>);

impl ViewHandle {
    pub fn new(view: EditorView) -> Self {
        Self(Rc::new(RefCell::new(view)))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EditorState {
        self.0.borrow().state().clone()
    }

    pub fn dispatch(&self, tr: Transaction) -> Result<(), ApplyError> {
        self.0.borrow_mut().dispatch(tr)
    }

    pub fn subscribe(&self, observer: impl FnMut(&Transaction, &EditorState) + 'static) {
        self.0.borrow_mut().subscribe(observer);
    }

    pub fn decorations(&self) -> Vec<WidgetView> {
        self.0.borrow().decorations()
    }

    pub fn undo(&self) -> bool {
        self.0.borrow_mut().undo()
    }

    pub fn redo(&self) -> bool {
        self.0.borrow_mut().redo()
    }

    /// Run a closure with shared access to the view.
    pub fn with<R>(&self, f: impl FnOnce(&EditorView) -> R) -> R {
        f(&self.0.borrow())
    }
}

impl From<EditorView> for ViewHandle {
    fn from(view: EditorView) -> Self {
        Self::new(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextBuffer;

    fn view(text: &str) -> EditorView {
        EditorView::new(EditorState::new(text))
    }

    fn insert(view: &mut EditorView, at: usize, text: &str) {
        let mut tr = view.state().tr();
        tr.insert_text(at, text).unwrap();
        view.dispatch(tr).unwrap();
    }

    #[test]
    fn test_observers_see_every_transaction_in_order() {
        let mut view = view("");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        view.subscribe(move |tr, state| {
            log.borrow_mut().push((tr.doc_changed(), state.version()));
        });

        insert(&mut view, 0, "a");
        view.dispatch(view.state().tr()).unwrap();
        insert(&mut view, 1, "b");

        assert_eq!(*seen.borrow(), vec![(true, 1), (false, 2), (true, 3)]);
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut view = view("hello");
        insert(&mut view, 5, " world");
        assert!(view.can_undo());

        assert!(view.undo());
        assert_eq!(view.state().doc().to_string(), "hello");
        assert!(!view.can_undo());
        assert!(view.can_redo());

        assert!(view.redo());
        assert_eq!(view.state().doc().to_string(), "hello world");
        assert!(view.can_undo());
        assert!(!view.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut view = view("abc");
        insert(&mut view, 3, "d");
        assert!(view.undo());
        assert!(view.can_redo());

        insert(&mut view, 3, "e");
        assert!(!view.can_redo());
    }

    #[test]
    fn test_max_steps() {
        let mut view = view("").with_history(History::new(3));
        for (i, c) in ["a", "b", "c", "d"].iter().enumerate() {
            insert(&mut view, i, c);
        }
        assert_eq!(view.state().doc().to_string(), "abcd");

        assert!(view.undo());
        assert!(view.undo());
        assert!(view.undo());
        assert!(!view.undo());
        assert_eq!(view.state().doc().to_string(), "a");
    }

    #[test]
    fn test_metadata_only_transactions_not_recorded() {
        let mut view = view("abc");
        view.dispatch(view.state().tr()).unwrap();
        assert!(!view.can_undo());
        assert_eq!(view.history().undo_depth(), 0);
    }

    #[test]
    fn test_handle_shares_view() {
        let handle = ViewHandle::new(view("x"));
        let other = handle.clone();
        let mut tr = handle.state().tr();
        tr.insert_text(1, "y").unwrap();
        handle.dispatch(tr).unwrap();
        assert_eq!(other.state().doc().to_string(), "xy");
        assert_eq!(other.with(|v| v.state().doc().len_chars()), 2);
        assert!(other.undo());
        assert_eq!(handle.state().doc().to_string(), "x");
    }
}
