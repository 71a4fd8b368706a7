//! Line-granularity pre-pass
//!
//! Large multi-line inputs are first diffed with whole lines as atomic
//! tokens, so long unchanged stretches collapse into a single equality
//! cheaply. Only the changed line groups are then refined at character
//! level.
//!
//! # Line ids
//!
//! Each distinct line is interned to a `u32` keyed by its *trimmed* content,
//! which makes whole-line comparison O(1). Two lines that differ only in
//! surrounding whitespace share an id, so every line-level equality is
//! re-checked byte for byte when expanded back to text; mismatches become a
//! delete/insert pair for the character refiner.

use rustc_hash::FxHashMap;

use super::cleanup;
use super::edit::{Chunk, EditKind, Run};
use super::myers::Myers;

/// Split `text` into lines, each keeping its trailing `'\n'`.
///
/// Concatenating the result reproduces `text` exactly, including a missing
/// final separator.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Whether either input contains a line separator.
pub(crate) fn has_lines(a: &str, b: &str) -> bool {
    a.contains('\n') || b.contains('\n')
}

// =============================================================================
// LineInterner
// =============================================================================

/// Deduplicating map from trimmed line content to a small integer id.
#[derive(Debug, Default)]
pub(crate) struct LineInterner<'t> {
    ids: FxHashMap<&'t str, u32>,
}

impl<'t> LineInterner<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `line`, allocating a new one for unseen content.
    pub fn intern(&mut self, line: &'t str) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(line.trim()).or_insert(next)
    }

    pub fn intern_all(&mut self, lines: &[&'t str]) -> Vec<u32> {
        lines.iter().map(|line| self.intern(line)).collect()
    }

    /// Number of distinct lines seen.
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

// =============================================================================
// Line-mode diff
// =============================================================================

/// Diff at line granularity, then refine changed groups per character.
pub(crate) fn diff_line_mode(myers: &Myers<'_>, old: &[&str], new: &[&str]) -> Vec<Chunk> {
    let mut interner = LineInterner::new();
    let old_ids = interner.intern_all(old);
    let new_ids = interner.intern_all(new);
    tracing::debug!(
        old_lines = old.len(),
        new_lines = new.len(),
        distinct = interner.len(),
        "line pre-pass"
    );

    let line_runs = myers.diff(&old_ids, &new_ids);
    let mut chunks = expand(&line_runs, old, new);
    cleanup::merge(&mut chunks);
    refine(myers, chunks)
}

/// Turn line-id runs back into character chunks.
fn expand(runs: &[Run<u32>], old: &[&str], new: &[&str]) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::with_capacity(runs.len());
    let mut old_pos = 0;
    let mut new_pos = 0;

    for run in runs {
        let count = run.items.len();
        match run.kind {
            EditKind::Equal => {
                let pairs = old[old_pos..old_pos + count]
                    .iter()
                    .zip(&new[new_pos..new_pos + count]);
                for (old_line, new_line) in pairs {
                    if old_line == new_line {
                        push_text(&mut chunks, EditKind::Equal, old_line);
                    } else {
                        // Same trimmed content, different whitespace
                        push_text(&mut chunks, EditKind::Delete, old_line);
                        push_text(&mut chunks, EditKind::Insert, new_line);
                    }
                }
                old_pos += count;
                new_pos += count;
            }
            EditKind::Delete => {
                for line in &old[old_pos..old_pos + count] {
                    push_text(&mut chunks, EditKind::Delete, line);
                }
                old_pos += count;
            }
            EditKind::Insert => {
                for line in &new[new_pos..new_pos + count] {
                    push_text(&mut chunks, EditKind::Insert, line);
                }
                new_pos += count;
            }
        }
    }

    chunks
}

/// Append text, extending the last chunk when it has the same tag.
fn push_text(chunks: &mut Vec<Chunk>, kind: EditKind, text: &str) {
    match chunks.last_mut() {
        Some(last) if last.kind == kind => last.items.extend(text.chars()),
        _ => chunks.push(Run {
            kind,
            items: text.chars().collect(),
        }),
    }
}

/// Re-diff every delete/insert group per character.
///
/// Expects merged input: each group between equalities is at most one delete
/// followed by one insert.
fn refine(myers: &Myers<'_>, chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(chunks.len());
    let mut deleted: Vec<char> = Vec::new();
    let mut inserted: Vec<char> = Vec::new();

    let flush = |out: &mut Vec<Chunk>, deleted: &mut Vec<char>, inserted: &mut Vec<char>| {
        if !deleted.is_empty() && !inserted.is_empty() {
            out.extend(myers.diff(deleted.as_slice(), inserted.as_slice()));
        } else if !deleted.is_empty() {
            out.push(Run::delete(deleted.as_slice()));
        } else if !inserted.is_empty() {
            out.push(Run::insert(inserted.as_slice()));
        }
        deleted.clear();
        inserted.clear();
    };

    for chunk in chunks {
        match chunk.kind {
            EditKind::Delete => deleted.extend(chunk.items),
            EditKind::Insert => inserted.extend(chunk.items),
            EditKind::Equal => {
                flush(&mut out, &mut deleted, &mut inserted);
                out.push(chunk);
            }
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);

    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::myers::Deadline;

    fn text(chunks: &[Chunk], old_side: bool) -> String {
        chunks
            .iter()
            .filter(|c| {
                if old_side {
                    c.kind.in_old()
                } else {
                    c.kind.in_new()
                }
            })
            .flat_map(|c| c.items.iter())
            .collect()
    }

    #[test]
    fn test_split_lines_lossless() {
        for input in ["", "a", "a\n", "a\nb", "a\nb\n", "\n\n", "x\r\ny\r\n"] {
            assert_eq!(split_lines(input).concat(), input);
        }
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_interner_trims() {
        let mut interner = LineInterner::new();
        let a = interner.intern("  foo\n");
        let b = interner.intern("foo");
        let c = interner.intern("bar\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_line_mode_inserted_line() {
        let deadline = Deadline::never();
        let myers = Myers::fast(&deadline);
        let old = split_lines("one\ntwo\nthree\n");
        let new = split_lines("one\ntwo\nnew line\nthree\n");

        let chunks = diff_line_mode(&myers, &old, &new);
        assert_eq!(text(&chunks, true), "one\ntwo\nthree\n");
        assert_eq!(text(&chunks, false), "one\ntwo\nnew line\nthree\n");

        let inserts: Vec<String> = chunks
            .iter()
            .filter(|c| c.kind == EditKind::Insert)
            .map(|c| c.items.iter().collect())
            .collect();
        assert_eq!(inserts, vec!["new line\n".to_string()]);
    }

    #[test]
    fn test_line_mode_whitespace_only_change() {
        let deadline = Deadline::never();
        let myers = Myers::fast(&deadline);
        let old = split_lines("keep\n  indented\nend\n");
        let new = split_lines("keep\n\tindented\nend\n");

        let chunks = diff_line_mode(&myers, &old, &new);
        assert_eq!(text(&chunks, true), "keep\n  indented\nend\n");
        assert_eq!(text(&chunks, false), "keep\n\tindented\nend\n");
        assert!(chunks.iter().any(|c| c.kind == EditKind::Delete));
    }

    #[test]
    fn test_refine_goes_character_level() {
        let deadline = Deadline::never();
        let myers = Myers::fast(&deadline);
        let old = split_lines("header\nvalue = 10\nfooter\n");
        let new = split_lines("header\nvalue = 12\nfooter\n");

        let chunks = diff_line_mode(&myers, &old, &new);
        let deleted: String = chunks
            .iter()
            .filter(|c| c.kind == EditKind::Delete)
            .flat_map(|c| c.items.iter())
            .collect();
        assert_eq!(deleted, "0");
    }
}
