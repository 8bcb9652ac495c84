//! Edit steps and position mapping.
//!
//! Every change to a document is a `Step`. Applying a step produces a
//! `StepMap` describing how old positions translate to new ones, and a
//! `Mapping` chains the maps of all steps in a transaction. Anything that
//! lives outside the document content (selections, decorations) stays
//! attached to the right place by mapping its positions through these.

use smol_str::SmolStr;
use thiserror::Error;

use crate::text::TextBuffer;
use crate::types::Assoc;

/// Errors from applying a step to a buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepError {
    /// The step's range does not fit the document.
    #[error("step range {from}..{to} is outside document of length {len}")]
    OutOfRange { from: usize, to: usize, len: usize },
}

/// A single document change: replace `from..to` with `text`.
///
/// Pure insertions have `from == to`, pure deletions an empty `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Replace {
        from: usize,
        to: usize,
        text: SmolStr,
    },
}

impl Step {
    pub fn insert(at: usize, text: impl Into<SmolStr>) -> Self {
        Step::Replace {
            from: at,
            to: at,
            text: text.into(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Step::Replace {
            from,
            to,
            text: SmolStr::default(),
        }
    }

    /// Apply the step in place, returning its position map.
    ///
    /// The buffer is left untouched on error.
    pub fn apply<T: TextBuffer>(&self, buffer: &mut T) -> Result<StepMap, StepError> {
        let Step::Replace { from, to, text } = self;
        let len = buffer.len_chars();
        if from > to || *to > len {
            return Err(StepError::OutOfRange {
                from: *from,
                to: *to,
                len,
            });
        }
        buffer.replace(*from..*to, text);
        Ok(StepMap {
            from: *from,
            to: *to,
            inserted: text.chars().count(),
        })
    }

    /// The step that undoes this one, given the document it applies to.
    pub fn invert<T: TextBuffer>(&self, doc_before: &T) -> Option<Step> {
        let Step::Replace { from, to, text } = self;
        let removed = doc_before.slice(*from..*to)?;
        Some(Step::Replace {
            from: *from,
            to: from + text.chars().count(),
            text: removed,
        })
    }
}

/// Result of mapping a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    /// The mapped position.
    pub pos: usize,
    /// Whether the content on the associated side of the position was removed.
    pub deleted: bool,
}

/// Position map of one replace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    pub from: usize,
    pub to: usize,
    pub inserted: usize,
}

impl StepMap {
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        if pos < self.from {
            return MapResult {
                pos,
                deleted: false,
            };
        }
        if pos > self.to {
            return MapResult {
                pos: pos - (self.to - self.from) + self.inserted,
                deleted: false,
            };
        }
        // from <= pos <= to: the position touches the replaced range.
        let deleted = match assoc {
            Assoc::After => pos < self.to,
            Assoc::Before => pos > self.from,
        };
        let mapped = match assoc {
            Assoc::After => self.from + self.inserted,
            Assoc::Before => self.from,
        };
        MapResult {
            pos: mapped,
            deleted,
        }
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

/// An ordered chain of step maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map a position through every step; `deleted` is sticky across steps.
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        self.maps.iter().fold(
            MapResult {
                pos,
                deleted: false,
            },
            |acc, map| {
                let next = map.map_result(acc.pos, assoc);
                MapResult {
                    pos: next.pos,
                    deleted: acc.deleted || next.deleted,
                }
            },
        )
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorRope;

    #[test]
    fn test_positions_before_edit_unchanged() {
        let map = StepMap {
            from: 5,
            to: 8,
            inserted: 1,
        };
        assert_eq!(map.map(4, Assoc::After), 4);
        assert!(!map.map_result(5, Assoc::Before).deleted);
    }

    #[test]
    fn test_positions_after_edit_shift() {
        // 3 chars removed, 1 inserted: net -2
        let map = StepMap {
            from: 5,
            to: 8,
            inserted: 1,
        };
        assert_eq!(map.map(10, Assoc::After), 8);
        assert_eq!(map.map(9, Assoc::Before), 7);
    }

    #[test]
    fn test_insertion_at_position_respects_assoc() {
        let map = StepMap {
            from: 3,
            to: 3,
            inserted: 4,
        };
        assert_eq!(
            map.map_result(3, Assoc::After),
            MapResult {
                pos: 7,
                deleted: false
            }
        );
        assert_eq!(
            map.map_result(3, Assoc::Before),
            MapResult {
                pos: 3,
                deleted: false
            }
        );
    }

    #[test]
    fn test_deletion_covering_position() {
        let map = StepMap {
            from: 2,
            to: 6,
            inserted: 0,
        };
        assert_eq!(
            map.map_result(4, Assoc::After),
            MapResult {
                pos: 2,
                deleted: true
            }
        );
        // Char after position 2 is removed.
        assert!(map.map_result(2, Assoc::After).deleted);
        // Char before position 2 survives.
        assert!(!map.map_result(2, Assoc::Before).deleted);
        // At the end boundary it is the other way around.
        assert!(!map.map_result(6, Assoc::After).deleted);
        assert!(map.map_result(6, Assoc::Before).deleted);
        assert_eq!(map.map(6, Assoc::After), 2);
    }

    #[test]
    fn test_mapping_chains_and_keeps_deleted() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap {
            from: 0,
            to: 0,
            inserted: 2,
        });
        mapping.push(StepMap {
            from: 4,
            to: 6,
            inserted: 0,
        });
        mapping.push(StepMap {
            from: 0,
            to: 0,
            inserted: 1,
        });
        // 3 -> 5 (insert) -> 4, deleted (inside 4..6) -> 5 (insert before)
        assert_eq!(
            mapping.map_result(3, Assoc::After),
            MapResult {
                pos: 5,
                deleted: true
            }
        );
        assert_eq!(
            mapping.map_result(1, Assoc::After),
            MapResult {
                pos: 4,
                deleted: false
            }
        );
    }

    #[test]
    fn test_step_apply_and_invert() {
        let mut doc = EditorRope::from_str("hello world");
        let step = Step::Replace {
            from: 6,
            to: 11,
            text: "rust".into(),
        };
        let inverse = step.invert(&doc).unwrap();
        let map = step.apply(&mut doc).unwrap();
        assert_eq!(doc.to_string(), "hello rust");
        assert_eq!(
            map,
            StepMap {
                from: 6,
                to: 11,
                inserted: 4
            }
        );

        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc.to_string(), "hello world");
    }

    #[test]
    fn test_step_out_of_range() {
        let mut doc = EditorRope::from_str("abc");
        let err = Step::delete(2, 9).apply(&mut doc).unwrap_err();
        assert_eq!(err, StepError::OutOfRange { from: 2, to: 9, len: 3 });
        assert_eq!(doc.to_string(), "abc");
    }
}
