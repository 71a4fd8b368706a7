//! Edit operations produced by the diff engine.
//!
//! Two representations exist:
//!
//! - [`Edit`] is the public form. Every span borrows from one of the caller's
//!   input texts, so a result never copies text.
//! - [`Run`] is the working form used while diffing and cleaning up. It owns
//!   its items so the cleanup passes can move characters between runs.
//!
//! A valid edit sequence tiles both inputs contiguously: the A-side spans
//! (Equal, Delete) appear in order and back to back, and so do the B-side
//! spans (Equal, Insert). [`Run`]s are turned into borrowed [`Edit`]s by
//! walking that tiling.

use std::fmt;

// =============================================================================
// EditKind
// =============================================================================

/// Tag of an edit operation, without its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EditKind {
    /// Text present in both inputs
    Equal,
    /// Text only present in the old input
    Delete,
    /// Text only present in the new input
    Insert,
}

impl EditKind {
    /// Whether this operation consumes text from the old input.
    #[inline]
    pub fn in_old(self) -> bool {
        matches!(self, Self::Equal | Self::Delete)
    }

    /// Whether this operation consumes text from the new input.
    #[inline]
    pub fn in_new(self) -> bool {
        matches!(self, Self::Equal | Self::Insert)
    }
}

// =============================================================================
// Edit
// =============================================================================

/// One edit operation over a borrowed span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", content = "text", rename_all = "lowercase"))]
pub enum Edit<'a> {
    /// Span shared by both inputs
    Equal(&'a str),
    /// Span removed from the old input
    Delete(&'a str),
    /// Span added by the new input
    Insert(&'a str),
}

impl<'a> Edit<'a> {
    /// Build an edit from a tag and a span.
    pub fn new(kind: EditKind, text: &'a str) -> Self {
        match kind {
            EditKind::Equal => Self::Equal(text),
            EditKind::Delete => Self::Delete(text),
            EditKind::Insert => Self::Insert(text),
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            Self::Equal(_) => EditKind::Equal,
            Self::Delete(_) => EditKind::Delete,
            Self::Insert(_) => EditKind::Insert,
        }
    }

    pub fn text(&self) -> &'a str {
        match *self {
            Self::Equal(text) | Self::Delete(text) | Self::Insert(text) => text,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal(_))
    }

    /// Whether this edit is a navigable change (Delete or Insert).
    pub fn is_change(&self) -> bool {
        !self.is_equal()
    }

    /// Length of the span in characters.
    pub fn char_len(&self) -> usize {
        self.text().chars().count()
    }
}

impl fmt::Display for Edit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sigil = match self.kind() {
            EditKind::Equal => ' ',
            EditKind::Delete => '-',
            EditKind::Insert => '+',
        };
        write!(f, "{sigil}{:?}", self.text())
    }
}

/// Rebuild the old input from an edit sequence.
pub fn old_text(edits: &[Edit<'_>]) -> String {
    edits
        .iter()
        .filter(|e| e.kind().in_old())
        .map(Edit::text)
        .collect()
}

/// Rebuild the new input from an edit sequence.
pub fn new_text(edits: &[Edit<'_>]) -> String {
    edits
        .iter()
        .filter(|e| e.kind().in_new())
        .map(Edit::text)
        .collect()
}

// =============================================================================
// Run: owned working representation
// =============================================================================

/// Owned run of items sharing one tag.
///
/// Items are `char`s for character-level work and interned line ids for the
/// line pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Run<T> {
    pub kind: EditKind,
    pub items: Vec<T>,
}

/// Character-level run.
pub(crate) type Chunk = Run<char>;

impl<T: Copy> Run<T> {
    pub fn new(kind: EditKind, items: &[T]) -> Self {
        Self {
            kind,
            items: items.to_vec(),
        }
    }

    pub fn equal(items: &[T]) -> Self {
        Self::new(EditKind::Equal, items)
    }

    pub fn delete(items: &[T]) -> Self {
        Self::new(EditKind::Delete, items)
    }

    pub fn insert(items: &[T]) -> Self {
        Self::new(EditKind::Insert, items)
    }
}

/// Borrow the spans of `chunks` out of the two inputs.
///
/// `chunks` must tile `old` and `new` (the reconstruction invariant), which
/// every pass in this module preserves.
pub(crate) fn borrow_edits<'a>(chunks: &[Chunk], old: &'a str, new: &'a str) -> Vec<Edit<'a>> {
    let mut edits = Vec::with_capacity(chunks.len());
    let mut pos_old = 0;
    let mut pos_new = 0;

    for chunk in chunks {
        let bytes: usize = chunk.items.iter().map(|c| c.len_utf8()).sum();
        let edit = match chunk.kind {
            EditKind::Equal => {
                let span = &old[pos_old..pos_old + bytes];
                pos_old += bytes;
                pos_new += bytes;
                Edit::Equal(span)
            }
            EditKind::Delete => {
                let span = &old[pos_old..pos_old + bytes];
                pos_old += bytes;
                Edit::Delete(span)
            }
            EditKind::Insert => {
                let span = &new[pos_new..pos_new + bytes];
                pos_new += bytes;
                Edit::Insert(span)
            }
        };
        edits.push(edit);
    }

    debug_assert_eq!(pos_old, old.len());
    debug_assert_eq!(pos_new, new.len());
    edits
}

// =============================================================================
// Tests
// =============================================================================
