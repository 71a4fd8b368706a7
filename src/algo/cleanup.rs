//! Readability cleanup for character edit scripts
//!
//! A minimal edit script is rarely the most readable one: Myers happily
//! splits words around shared letters. These passes re-segment the same
//! logical change without altering what either side reconstructs to.
//!
//! # Passes
//!
//! | Pass | Effect |
//! |------|--------|
//! | [`merge`] | coalesce neighbours, factor shared prefix/suffix into equalities, slide single edits |
//! | [`absorb_short_equalities`] | fold tiny unchanged islands between two changes into the change |
//! | [`align_boundaries`] | slide single edits onto word, sentence or line boundaries |
//!
//! [`semantic`] chains them in that order and merges once more.

use super::edit::{Chunk, EditKind, Run};
use super::myers::{common_prefix, common_suffix};

/// Full readability cleanup.
///
/// Ends with no equality shorter than `min_equality_len` between two
/// changes: alignment can shorten an equality, so absorption runs again
/// after it.
pub(crate) fn semantic(chunks: &mut Vec<Chunk>, min_equality_len: usize) {
    merge(chunks);
    while absorb_short_equalities(chunks, min_equality_len) {
        merge(chunks);
    }
    align_boundaries(chunks);
    merge(chunks);
    while absorb_short_equalities(chunks, min_equality_len) {
        merge(chunks);
    }
}

// =============================================================================
// Merge
// =============================================================================

/// Canonicalise a chunk list.
///
/// Afterwards no chunk is empty, no two neighbours share a tag, and each
/// change group between equalities is one delete followed by one insert.
pub(crate) fn merge(chunks: &mut Vec<Chunk>) {
    loop {
        merge_groups(chunks);
        if !slide_single_edits(chunks) {
            break;
        }
    }
    coalesce(chunks);
}

/// Collapse each run of deletes/inserts into one delete and one insert, and
/// move their shared prefix/suffix into the neighbouring equalities.
///
/// Rebuilds the list in one pass; empty equalities are dropped.
fn merge_groups(chunks: &mut Vec<Chunk>) {
    let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len());
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    for chunk in chunks.drain(..) {
        match chunk.kind {
            EditKind::Delete => text_delete.extend(chunk.items),
            EditKind::Insert => text_insert.extend(chunk.items),
            EditKind::Equal => {
                let mut equal = chunk.items;
                flush_group(&mut out, &mut text_delete, &mut text_insert, &mut equal);
                push_equal(&mut out, equal);
            }
        }
    }

    let mut tail = Vec::new();
    flush_group(&mut out, &mut text_delete, &mut text_insert, &mut tail);
    push_equal(&mut out, tail);

    *chunks = out;
}

/// Emit one pending change group, factoring its shared prefix into the
/// preceding equality and its shared suffix into `next_equal`.
fn flush_group(
    out: &mut Vec<Chunk>,
    text_delete: &mut Vec<char>,
    text_insert: &mut Vec<char>,
    next_equal: &mut Vec<char>,
) {
    if !text_delete.is_empty() && !text_insert.is_empty() {
        let prefix = common_prefix(text_insert, text_delete);
        if prefix != 0 {
            let shared: Vec<char> = text_insert.drain(..prefix).collect();
            text_delete.drain(..prefix);
            push_equal(out, shared);
        }

        let suffix = common_suffix(text_insert, text_delete);
        if suffix != 0 {
            let shared = text_insert.split_off(text_insert.len() - suffix);
            text_delete.truncate(text_delete.len() - suffix);
            prepend(next_equal, &shared);
        }
    }

    if !text_delete.is_empty() {
        out.push(Run {
            kind: EditKind::Delete,
            items: std::mem::take(text_delete),
        });
    }
    if !text_insert.is_empty() {
        out.push(Run {
            kind: EditKind::Insert,
            items: std::mem::take(text_insert),
        });
    }
}

/// Append equal text, extending a trailing equality.
fn push_equal(out: &mut Vec<Chunk>, items: Vec<char>) {
    if items.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.kind == EditKind::Equal => last.items.extend(items),
        _ => out.push(Run {
            kind: EditKind::Equal,
            items,
        }),
    }
}

/// Whether `chunks[i]` is a single edit between two non-empty equalities.
fn is_framed_edit(chunks: &[Chunk], i: usize) -> bool {
    let framing = |c: &Chunk| c.kind == EditKind::Equal && !c.items.is_empty();
    framing(&chunks[i - 1]) && framing(&chunks[i + 1]) && chunks[i].kind != EditKind::Equal
}

/// Slide single edits surrounded by equalities sideways when that lets one
/// of the equalities disappear.
///
/// `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`. Returns whether anything moved.
/// Emptied equalities stay in place until the end of the pass.
fn slide_single_edits(chunks: &mut Vec<Chunk>) -> bool {
    let mut changed = false;
    let mut pointer = 1;

    while pointer + 1 < chunks.len() {
        if is_framed_edit(chunks, pointer) {
            let prev_len = chunks[pointer - 1].items.len();
            let next_len = chunks[pointer + 1].items.len();
            let edit_len = chunks[pointer].items.len();

            if chunks[pointer].items.ends_with(&chunks[pointer - 1].items) {
                // Shift the edit over the previous equality
                let prev = std::mem::take(&mut chunks[pointer - 1].items);
                let edit = &mut chunks[pointer].items;
                edit.truncate(edit_len - prev_len);
                prepend(edit, &prev);
                prepend(&mut chunks[pointer + 1].items, &prev);
                changed = true;
            } else if chunks[pointer].items.starts_with(&chunks[pointer + 1].items) {
                // Shift the edit over the next equality
                let next = std::mem::take(&mut chunks[pointer + 1].items);
                chunks[pointer - 1].items.extend_from_slice(&next);
                let edit = &mut chunks[pointer].items;
                edit.drain(..next_len);
                edit.extend(next);
                changed = true;
            }
        }
        pointer += 1;
    }

    if changed {
        chunks.retain(|c| !c.items.is_empty());
    }
    changed
}

fn prepend(items: &mut Vec<char>, front: &[char]) {
    let mut joined = Vec::with_capacity(front.len() + items.len());
    joined.extend_from_slice(front);
    joined.append(items);
    *items = joined;
}

/// Drop empty chunks and join same-tag neighbours.
fn coalesce(chunks: &mut Vec<Chunk>) {
    let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks.drain(..) {
        if chunk.items.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.kind == chunk.kind => last.items.extend(chunk.items),
            _ => out.push(chunk),
        }
    }
    *chunks = out;
}

// =============================================================================
// Short equalities
// =============================================================================

/// Turn every equality shorter than `min_len` that sits between two changes
/// into a delete/insert pair.
///
/// Must be followed by [`merge`] to regroup. Returns whether anything changed.
pub(crate) fn absorb_short_equalities(chunks: &mut Vec<Chunk>, min_len: usize) -> bool {
    if min_len == 0 || chunks.len() < 3 {
        return false;
    }

    let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len() + 4);
    let mut changed = false;

    for i in 0..chunks.len() {
        let chunk = &chunks[i];
        let between_changes = i > 0
            && i + 1 < chunks.len()
            && chunks[i - 1].kind != EditKind::Equal
            && chunks[i + 1].kind != EditKind::Equal;

        if chunk.kind == EditKind::Equal && between_changes && chunk.items.len() < min_len {
            out.push(Run::delete(&chunk.items));
            out.push(Run::insert(&chunk.items));
            changed = true;
        } else {
            out.push(chunk.clone());
        }
    }

    if changed {
        *chunks = out;
    }
    changed
}

// =============================================================================
// Boundary alignment
// =============================================================================

/// Slide single edits surrounded by equalities to the most readable
/// boundary, without changing any text.
///
/// `The c<ins>at c</ins>ame.` becomes `The <ins>cat </ins>came.`
pub(crate) fn align_boundaries(chunks: &mut Vec<Chunk>) {
    let mut changed = false;
    let mut pointer = 1;

    while pointer + 1 < chunks.len() {
        if is_framed_edit(chunks, pointer) {
            let eq1_len = chunks[pointer - 1].items.len();
            let edit_len = chunks[pointer].items.len();

            // Every position is a window of `edit_len` over eq1 + edit + eq2
            let eq2_len = chunks[pointer + 1].items.len();
            let mut joined = Vec::with_capacity(eq1_len + edit_len + eq2_len);
            joined.extend_from_slice(&chunks[pointer - 1].items);
            joined.extend_from_slice(&chunks[pointer].items);
            joined.extend_from_slice(&chunks[pointer + 1].items);

            // Shift the edit as far left as possible
            let offset = common_suffix(&chunks[pointer - 1].items, &chunks[pointer].items);
            let mut start = eq1_len - offset;

            let score_at = |at: usize| {
                let (eq1, rest) = joined.split_at(at);
                let (edit, eq2) = rest.split_at(edit_len);
                boundary_score(eq1, edit) + boundary_score(edit, eq2)
            };

            // Step right one character at a time, keeping the best fit
            let mut best = start;
            let mut best_score = score_at(start);
            while start + edit_len < joined.len() && joined[start] == joined[start + edit_len] {
                start += 1;
                let score = score_at(start);
                // `>=` favours the rightmost of equally good positions
                if score >= best_score {
                    best_score = score;
                    best = start;
                }
            }

            if best != eq1_len {
                chunks[pointer - 1].items = joined[..best].to_vec();
                chunks[pointer].items = joined[best..best + edit_len].to_vec();
                chunks[pointer + 1].items = joined[best + edit_len..].to_vec();
                changed = true;
            }
        }
        pointer += 1;
    }

    if changed {
        chunks.retain(|c| !c.items.is_empty());
    }
}

/// How good a boundary between `one` and `two` is, from 6 (edge of the
/// text) down to 0 (inside a word).
fn boundary_score(one: &[char], two: &[char]) -> u32 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && is_line_break(c1);
    let break2 = space2 && is_line_break(c2);
    let blank1 = break1 && ends_with_blank_line(one);
    let blank2 = break2 && starts_with_blank_line(two);

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        // End of sentence
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// `\n\n` or `\n\r\n` at the end.
fn ends_with_blank_line(s: &[char]) -> bool {
    s.ends_with(&['\n', '\n']) || s.ends_with(&['\n', '\r', '\n'])
}

/// `\n\n`, `\n\r\n`, `\r\n\n` or `\r\n\r\n` at the start.
fn starts_with_blank_line(s: &[char]) -> bool {
    let rest = match s {
        ['\r', '\n', rest @ ..] | ['\n', rest @ ..] => rest,
        _ => return false,
    };
    matches!(rest, ['\n', ..] | ['\r', '\n', ..])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn c(kind: EditKind, text: &str) -> Chunk {
        Run {
            kind,
            items: text.chars().collect(),
        }
    }

    fn eq(text: &str) -> Chunk {
        c(EditKind::Equal, text)
    }

    fn del(text: &str) -> Chunk {
        c(EditKind::Delete, text)
    }

    fn ins(text: &str) -> Chunk {
        c(EditKind::Insert, text)
    }

    #[test]
    fn test_merge_coalesces() {
        let mut chunks = vec![eq("a"), del("b"), del("c"), ins("d"), ins("e"), eq("f")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("a"), del("bc"), ins("de"), eq("f")]);
    }

    #[test]
    fn test_merge_interleaved_group() {
        let mut chunks = vec![del("a"), ins("b"), del("c"), ins("d"), eq("ee")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![del("ac"), ins("bd"), eq("ee")]);
    }

    #[test]
    fn test_merge_factors_prefix_and_suffix() {
        let mut chunks = vec![del("a"), ins("abc"), del("dc")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("a"), del("d"), ins("b"), eq("c")]);

        let mut chunks = vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("xa"), del("d"), ins("b"), eq("cy")]);
    }

    #[test]
    fn test_merge_identical_group_collapses() {
        let mut chunks = vec![eq("x"), del("ab"), ins("ab"), eq("y")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("xaby")]);
    }

    #[test]
    fn test_merge_slides_edits() {
        let mut chunks = vec![eq("a"), ins("ba"), eq("c")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![ins("ab"), eq("ac")]);

        let mut chunks = vec![eq("c"), ins("ab"), eq("a")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("ca"), ins("ba")]);
    }

    #[test]
    fn test_merge_drops_empty() {
        let mut chunks = vec![eq(""), del("a"), eq(""), del("b"), ins("")];
        merge(&mut chunks);
        assert_eq!(chunks, vec![del("ab")]);
    }

    #[test]
    fn test_absorb_short_equality() {
        // "world" -> "earth": Myers keeps the shared "r"
        let mut chunks = vec![
            eq("hello "),
            del("wo"),
            ins("ea"),
            eq("r"),
            del("ld"),
            ins("th"),
        ];
        assert!(absorb_short_equalities(&mut chunks, 3));
        merge(&mut chunks);
        assert_eq!(chunks, vec![eq("hello "), del("world"), ins("earth")]);
    }

    #[test]
    fn test_absorb_keeps_long_and_edge_equalities() {
        let mut chunks = vec![eq("ab"), del("x"), eq("same"), ins("y"), eq("cd")];
        assert!(!absorb_short_equalities(&mut chunks, 3));
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn test_semantic_absorbs_equality_shortened_by_alignment() {
        // Alignment moves the delete onto the line break, leaving "a\n"
        // between the insert and the delete
        let mut aligned = vec![ins("Q"), eq("a\nb"), del("\nb"), eq("c")];
        align_boundaries(&mut aligned);
        assert_eq!(aligned, vec![ins("Q"), eq("a\n"), del("b\n"), eq("bc")]);

        let mut chunks = vec![ins("Q"), eq("a\nb"), del("\nb"), eq("c")];
        semantic(&mut chunks, 3);
        assert_eq!(chunks, vec![del("a\nb"), ins("Qa"), eq("\nbc")]);
    }

    #[test]
    fn test_merge_many_groups() {
        let mut chunks = Vec::new();
        for _ in 0..20_000 {
            chunks.push(eq("ab"));
            chunks.push(ins("x"));
            chunks.push(ins("y"));
            chunks.push(del("z"));
        }
        merge(&mut chunks);

        assert_eq!(chunks.len(), 60_000);
        assert_eq!(chunks[0], eq("ab"));
        assert_eq!(chunks[1], del("z"));
        assert_eq!(chunks[2], ins("xy"));
    }

    #[test]
    fn test_align_to_word_boundary() {
        let mut chunks = vec![eq("The c"), ins("at c"), eq("ame.")];
        align_boundaries(&mut chunks);
        assert_eq!(chunks, vec![eq("The "), ins("cat "), eq("came.")]);
    }

    #[test]
    fn test_align_to_line_boundary() {
        let mut chunks = vec![eq("first line"), ins("\nnew line"), eq("\nlast\n")];
        align_boundaries(&mut chunks);
        assert_eq!(
            chunks,
            vec![eq("first line\n"), ins("new line\n"), eq("last\n")]
        );
    }

    #[test]
    fn test_align_can_consume_equality() {
        let mut chunks = vec![eq("a"), del("a"), eq("ax")];
        align_boundaries(&mut chunks);
        // Shifting left empties the first equality: text edge scores highest
        assert_eq!(chunks, vec![del("a"), eq("aax")]);
    }

    #[test]
    fn test_boundary_scores() {
        let s = |a: &str, b: &str| {
            boundary_score(&a.chars().collect::<Vec<_>>(), &b.chars().collect::<Vec<_>>())
        };
        assert_eq!(s("", "x"), 6);
        assert_eq!(s("a\n\n", "b"), 5);
        assert_eq!(s("a\n", "b"), 4);
        assert_eq!(s("end.", " next"), 3);
        assert_eq!(s("word", " word"), 2);
        assert_eq!(s("a", ",b"), 1);
        assert_eq!(s("ab", "cd"), 0);
    }

    #[test]
    fn test_semantic_preserves_text() {
        let mut chunks = vec![
            eq("The c"),
            del("a"),
            ins("u"),
            eq("t s"),
            del("at"),
            ins("its"),
            eq("."),
        ];
        let old: String = chunks
            .iter()
            .filter(|c| c.kind.in_old())
            .flat_map(|c| c.items.iter())
            .collect();
        let new: String = chunks
            .iter()
            .filter(|c| c.kind.in_new())
            .flat_map(|c| c.items.iter())
            .collect();

        semantic(&mut chunks, 3);

        let old_after: String = chunks
            .iter()
            .filter(|c| c.kind.in_old())
            .flat_map(|c| c.items.iter())
            .collect();
        let new_after: String = chunks
            .iter()
            .filter(|c| c.kind.in_new())
            .flat_map(|c| c.items.iter())
            .collect();
        assert_eq!(old, old_after);
        assert_eq!(new, new_after);
        for pair in chunks.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }
}
