//! Widget decorations: UI anchored to document positions.
//!
//! Decorations are not part of the document content. A `DecorationSet` keeps
//! them attached to the right place by mapping every position through each
//! transaction's `Mapping`; a decoration whose anchoring content is deleted
//! is dropped from the set.

use std::fmt;
use std::rc::Rc;

use crate::mapping::Mapping;
use crate::types::Assoc;

/// Something a rendering layer can draw inline with the document.
pub trait Widget {
    /// HTML markup for the widget.
    fn render_html(&self) -> String;
}

/// A widget positioned for rendering.
#[derive(Clone)]
pub struct WidgetView {
    pub pos: usize,
    pub widget: Rc<dyn Widget>,
}

impl fmt::Debug for WidgetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetView")
            .field("pos", &self.pos)
            .field("html", &self.widget.render_html())
            .finish()
    }
}

/// A widget decoration carrying a spec value `S` used to find it again.
#[derive(Clone)]
pub struct Decoration<S> {
    pos: usize,
    assoc: Assoc,
    widget: Rc<dyn Widget>,
    spec: S,
}

impl<S> Decoration<S> {
    pub fn widget(pos: usize, widget: Rc<dyn Widget>, spec: S) -> Self {
        Self {
            pos,
            assoc: Assoc::After,
            widget,
            spec,
        }
    }

    pub fn with_assoc(mut self, assoc: Assoc) -> Self {
        self.assoc = assoc;
        self
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn assoc(&self) -> Assoc {
        self.assoc
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    pub fn view(&self) -> WidgetView {
        WidgetView {
            pos: self.pos,
            widget: Rc::clone(&self.widget),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Decoration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoration")
            .field("pos", &self.pos)
            .field("assoc", &self.assoc)
            .field("spec", &self.spec)
            .finish()
    }
}

/// An immutable, position-ordered set of decorations.
///
/// Every operation returns a new set.
#[derive(Clone, Debug)]
pub struct DecorationSet<S> {
    decorations: Vec<Decoration<S>>,
}

impl<S> Default for DecorationSet<S> {
    fn default() -> Self {
        Self {
            decorations: Vec::new(),
        }
    }
}

impl<S: Clone> DecorationSet<S> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration<S>> {
        self.decorations.iter()
    }

    /// Map every decoration through an edit, dropping the ones whose
    /// anchoring content was deleted.
    pub fn map(&self, mapping: &Mapping) -> Self {
        if mapping.is_empty() {
            return self.clone();
        }
        let decorations = self
            .decorations
            .iter()
            .filter_map(|deco| {
                let result = mapping.map_result(deco.pos, deco.assoc);
                if result.deleted {
                    tracing::trace!(old = deco.pos, "decoration dropped by edit");
                    return None;
                }
                let mut mapped = deco.clone();
                mapped.pos = result.pos;
                Some(mapped)
            })
            .collect();
        Self { decorations }
    }

    /// Add decorations, clamping positions to the document length.
    pub fn add(&self, doc_len: usize, added: impl IntoIterator<Item = Decoration<S>>) -> Self {
        let mut decorations = self.decorations.clone();
        for mut deco in added {
            deco.pos = deco.pos.min(doc_len);
            decorations.push(deco);
        }
        // Stable sort keeps insertion order among decorations at one position.
        decorations.sort_by_key(|deco| deco.pos);
        Self { decorations }
    }

    /// Remove every decoration whose spec matches.
    pub fn remove_where(&self, mut predicate: impl FnMut(&S) -> bool) -> Self {
        let decorations = self
            .decorations
            .iter()
            .filter(|deco| !predicate(&deco.spec))
            .cloned()
            .collect();
        Self { decorations }
    }

    /// All decorations whose spec matches, in position order.
    pub fn find(&self, mut predicate: impl FnMut(&S) -> bool) -> Vec<&Decoration<S>> {
        self.decorations
            .iter()
            .filter(|deco| predicate(&deco.spec))
            .collect()
    }

    pub fn views(&self) -> Vec<WidgetView> {
        self.decorations.iter().map(Decoration::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::StepMap;

    struct Marker(&'static str);

    impl Widget for Marker {
        fn render_html(&self) -> String {
            format!("<span>{}</span>", self.0)
        }
    }

    fn deco(pos: usize, id: u32) -> Decoration<u32> {
        Decoration::widget(pos, Rc::new(Marker("m")), id)
    }

    fn mapping(from: usize, to: usize, inserted: usize) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.push(StepMap { from, to, inserted });
        mapping
    }

    #[test]
    fn test_add_orders_by_position_and_clamps() {
        let set = DecorationSet::empty().add(10, [deco(8, 1), deco(2, 2), deco(50, 3)]);
        let positions: Vec<_> = set.iter().map(|d| (d.pos(), *d.spec())).collect();
        assert_eq!(positions, vec![(2, 2), (8, 1), (10, 3)]);
    }

    #[test]
    fn test_map_shifts_and_drops() {
        let set = DecorationSet::empty().add(20, [deco(2, 1), deco(6, 2), deco(12, 3)]);
        // Delete 4..8: decoration 2 sits inside the deleted range.
        let mapped = set.map(&mapping(4, 8, 0));
        let positions: Vec<_> = mapped.iter().map(|d| (d.pos(), *d.spec())).collect();
        assert_eq!(positions, vec![(2, 1), (8, 3)]);
        // The original set is untouched.
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_insertion_at_decoration_pushes_it_forward() {
        let set = DecorationSet::empty().add(10, [deco(5, 1)]);
        let after = set.map(&mapping(5, 5, 3));
        assert_eq!(after.find(|id| *id == 1)[0].pos(), 8);

        let before = DecorationSet::empty()
            .add(10, [deco(5, 1).with_assoc(Assoc::Before)])
            .map(&mapping(5, 5, 3));
        assert_eq!(before.find(|id| *id == 1)[0].pos(), 5);
    }

    #[test]
    fn test_remove_and_find() {
        let set = DecorationSet::empty().add(10, [deco(1, 1), deco(3, 2)]);
        let removed = set.remove_where(|id| *id == 1);
        assert!(removed.find(|id| *id == 1).is_empty());
        assert_eq!(removed.len(), 1);
        // Removing an absent spec is a no-op.
        assert_eq!(removed.remove_where(|id| *id == 9).len(), 1);
    }

    #[test]
    fn test_views_render() {
        let set = DecorationSet::empty().add(10, [deco(4, 1)]);
        let views = set.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].pos, 4);
        assert_eq!(views[0].widget.render_html(), "<span>m</span>");
    }
}
