//! The input event that carried the files.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Drop,
    Paste,
}

/// A drop or paste event, as seen by the editor.
///
/// Handlers that take ownership of the event call `prevent_default` so the
/// host skips its own handling.
#[derive(Debug, Clone)]
pub struct EditorEvent {
    kind: EventKind,
    default_prevented: bool,
}

impl EditorEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            default_prevented: false,
        }
    }

    pub fn dropped() -> Self {
        Self::new(EventKind::Drop)
    }

    pub fn pasted() -> Self {
        Self::new(EventKind::Paste)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
