//! Myers Diff Algorithm with a cooperative deadline
//!
//! Implements the linear-space ("middle snake") variant of the Myers diff
//! algorithm over any sequence of comparable items. The engine runs it over
//! `char`s for character-level diffs and over interned line ids for the line
//! pre-pass.
//!
//! # Algorithm Choice: Why Bisection?
//!
//! | Variant | Time | Space | Partial result on abort |
//! |---------|------|-------|-------------------------|
//! | Trace + backtrack | O((n+m)*d) | O(d*(n+m)) | none until the end |
//! | **Middle snake** | O((n+m)*d) | O(n+m) | **every split is final** |
//!
//! Each split point found by the middle snake is part of an optimal script,
//! so when the deadline expires the work already done stays valid: the
//! sub-problem in progress degrades to `Delete(a) + Insert(b)` and the rest
//! of the recursion keeps its splits.
//!
//! # Deadline
//!
//! The bisection polls the [`Deadline`] once per edit-distance step `d`. One
//! step is at most O(n+m) work, which bounds the overshoot.
//!
//! # References
//!
//! - Myers, E.W. "An O(ND) Difference Algorithm and Its Variations" (1986)
//!
//! # Implementation Notes
//!
//! - Common prefix/suffix are stripped before any search
//! - "Shorter text inside the longer one" and single-item shortcuts
//! - Optional half-match heuristic (fast mode): split around a long shared
//!   substring, trading minimality for speed

use std::cell::Cell;
use std::time::Instant;

use super::edit::{EditKind, Run};

// =============================================================================
// Deadline
// =============================================================================

/// Wall-clock budget polled by the bisection.
///
/// Records whether any poll found the budget exhausted so the caller can
/// report a soft timeout.
#[derive(Debug)]
pub(crate) struct Deadline {
    at: Option<Instant>,
    fired: Cell<bool>,
}

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self {
            at: Some(instant),
            fired: Cell::new(false),
        }
    }

    /// A deadline that never expires.
    #[cfg(test)]
    pub fn never() -> Self {
        Self {
            at: None,
            fired: Cell::new(false),
        }
    }

    /// Poll the clock. Once expired, stays expired without re-reading it.
    pub fn expired(&self) -> bool {
        if self.fired.get() {
            return true;
        }
        match self.at {
            Some(at) if Instant::now() >= at => {
                self.fired.set(true);
                true
            }
            _ => false,
        }
    }

    /// Whether any poll observed the deadline.
    pub fn fired(&self) -> bool {
        self.fired.get()
    }
}

// =============================================================================
// Main API
// =============================================================================

/// Myers diff over item sequences.
pub(crate) struct Myers<'d> {
    deadline: &'d Deadline,
    half_match: bool,
}

impl<'d> Myers<'d> {
    /// Minimal edit script (accurate mode).
    pub fn accurate(deadline: &'d Deadline) -> Self {
        Self {
            deadline,
            half_match: false,
        }
    }

    /// Edit script with the half-match heuristic enabled (fast mode).
    pub fn fast(deadline: &'d Deadline) -> Self {
        Self {
            deadline,
            half_match: true,
        }
    }

    /// Compute the runs turning `old` into `new`.
    ///
    /// The runs always tile both inputs. Adjacent runs may share a tag; the
    /// cleanup merge coalesces them.
    pub fn diff<T: Copy + Eq>(&self, old: &[T], new: &[T]) -> Vec<Run<T>> {
        if old == new {
            if old.is_empty() {
                return Vec::new();
            }
            return vec![Run::equal(old)];
        }

        let prefix = common_prefix(old, new);
        let (head, old_rest, new_rest) = (&old[..prefix], &old[prefix..], &new[prefix..]);
        let suffix = common_suffix(old_rest, new_rest);
        let old_mid = &old_rest[..old_rest.len() - suffix];
        let new_mid = &new_rest[..new_rest.len() - suffix];
        let tail = &old_rest[old_rest.len() - suffix..];

        let mut runs = Vec::new();
        if !head.is_empty() {
            runs.push(Run::equal(head));
        }
        runs.extend(self.compute(old_mid, new_mid));
        if !tail.is_empty() {
            runs.push(Run::equal(tail));
        }
        runs
    }

    /// Diff two sequences with no common prefix or suffix.
    fn compute<T: Copy + Eq>(&self, old: &[T], new: &[T]) -> Vec<Run<T>> {
        if old.is_empty() {
            if new.is_empty() {
                return Vec::new();
            }
            return vec![Run::insert(new)];
        }
        if new.is_empty() {
            return vec![Run::delete(old)];
        }

        if self.deadline.expired() {
            return vec![Run::delete(old), Run::insert(new)];
        }

        let old_longer = old.len() > new.len();
        let (long, short) = if old_longer { (old, new) } else { (new, old) };

        // Shorter text inside the longer one
        if let Some(i) = find(long, short, self.deadline) {
            let kind = if old_longer {
                EditKind::Delete
            } else {
                EditKind::Insert
            };
            return vec![
                Run::new(kind, &long[..i]),
                Run::equal(short),
                Run::new(kind, &long[i + short.len()..]),
            ]
            .into_iter()
            .filter(|r| !r.items.is_empty())
            .collect();
        }

        // A single item that is not in the other text, or no time left to look
        if short.len() == 1 || self.deadline.fired() {
            return vec![Run::delete(old), Run::insert(new)];
        }

        if self.half_match {
            if let Some(hm) = half_match(old, new, self.deadline) {
                let mut runs = self.diff(hm.old_head, hm.new_head);
                runs.push(Run::equal(hm.common));
                runs.extend(self.diff(hm.old_tail, hm.new_tail));
                return runs;
            }
        }

        self.bisect(old, new)
    }

    /// Find the middle snake and recurse on both halves.
    ///
    /// Falls back to `Delete(old) + Insert(new)` when the deadline expires.
    fn bisect<T: Copy + Eq>(&self, old: &[T], new: &[T]) -> Vec<Run<T>> {
        let n = old.len() as isize;
        let m = new.len() as isize;
        let max_d = (n + m + 1) / 2;
        let v_offset = max_d;
        let v_len = (2 * max_d + 2) as usize;

        // v[k + offset] = furthest x on diagonal k (-1 = unreached)
        let mut v1 = vec![-1isize; v_len];
        let mut v2 = vec![-1isize; v_len];
        v1[(v_offset + 1) as usize] = 0;
        v2[(v_offset + 1) as usize] = 0;

        let delta = n - m;
        // Odd delta: the forward path detects the overlap, else the reverse one
        let front = delta % 2 != 0;

        let mut k1_start = 0;
        let mut k1_end = 0;
        let mut k2_start = 0;
        let mut k2_end = 0;

        for d in 0..max_d {
            if self.deadline.expired() {
                break;
            }

            // Forward path
            let mut k1 = -d + k1_start;
            while k1 <= d - k1_end {
                let k1_off = (v_offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && v1[k1_off - 1] < v1[k1_off + 1]) {
                    v1[k1_off + 1]
                } else {
                    v1[k1_off - 1] + 1
                };
                let mut y1 = x1 - k1;
                while x1 < n && y1 < m && old[x1 as usize] == new[y1 as usize] {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_off] = x1;

                if x1 > n {
                    // Ran off the right of the graph
                    k1_end += 2;
                } else if y1 > m {
                    // Ran off the bottom of the graph
                    k1_start += 2;
                } else if front {
                    let k2_off = v_offset + delta - k1;
                    if k2_off >= 0 && (k2_off as usize) < v_len && v2[k2_off as usize] != -1 {
                        // Mirror x2 onto the top-left coordinate system
                        let x2 = n - v2[k2_off as usize];
                        if x1 >= x2 {
                            return self.split(old, new, x1 as usize, y1 as usize);
                        }
                    }
                }
                k1 += 2;
            }

            // Reverse path
            let mut k2 = -d + k2_start;
            while k2 <= d - k2_end {
                let k2_off = (v_offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && v2[k2_off - 1] < v2[k2_off + 1]) {
                    v2[k2_off + 1]
                } else {
                    v2[k2_off - 1] + 1
                };
                let mut y2 = x2 - k2;
                while x2 < n
                    && y2 < m
                    && old[(n - x2 - 1) as usize] == new[(m - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_off] = x2;

                if x2 > n {
                    k2_end += 2;
                } else if y2 > m {
                    k2_start += 2;
                } else if !front {
                    let k1_off = v_offset + delta - k2;
                    if k1_off >= 0 && (k1_off as usize) < v_len && v1[k1_off as usize] != -1 {
                        let x1 = v1[k1_off as usize];
                        let y1 = v_offset + x1 - k1_off;
                        if x1 >= n - x2 {
                            return self.split(old, new, x1 as usize, y1 as usize);
                        }
                    }
                }
                k2 += 2;
            }
        }

        // Deadline hit (or no overlap): no commonality worth keeping
        vec![Run::delete(old), Run::insert(new)]
    }

    /// Recurse on both sides of a middle-snake split point.
    fn split<T: Copy + Eq>(&self, old: &[T], new: &[T], x: usize, y: usize) -> Vec<Run<T>> {
        let mut runs = self.diff(&old[..x], &new[..y]);
        runs.extend(self.diff(&old[x..], &new[y..]));
        runs
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Length of the common prefix.
pub(crate) fn common_prefix<T: Eq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Length of the common suffix.
pub(crate) fn common_suffix<T: Eq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Item comparisons allowed between two deadline polls in a linear scan.
const POLL_INTERVAL: usize = 1 << 14;

/// First index of `needle` in `haystack`, searching from `from`.
///
/// Gives up with `None` once the deadline expires.
fn find_from<T: Eq>(
    haystack: &[T],
    needle: &[T],
    from: usize,
    deadline: &Deadline,
) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if from >= haystack.len() || haystack.len() - from < needle.len() {
        return None;
    }

    let stride = (POLL_INTERVAL / needle.len()).max(1);
    let last = haystack.len() - needle.len();
    for (step, i) in (from..=last).enumerate() {
        if step > 0 && step % stride == 0 && deadline.expired() {
            return None;
        }
        if &haystack[i..i + needle.len()] == needle {
            return Some(i);
        }
    }
    None
}

fn find<T: Eq>(haystack: &[T], needle: &[T], deadline: &Deadline) -> Option<usize> {
    find_from(haystack, needle, 0, deadline)
}

/// Split of two sequences around a shared substring.
struct HalfMatch<'x, T> {
    old_head: &'x [T],
    old_tail: &'x [T],
    new_head: &'x [T],
    new_tail: &'x [T],
    common: &'x [T],
}

/// Find a substring shared by both sequences that is at least half the length
/// of the longer one.
///
/// The result is not guaranteed to be part of a minimal script. Returns
/// `None` when the deadline expires during the search.
fn half_match<'x, T: Copy + Eq>(
    old: &'x [T],
    new: &'x [T],
    deadline: &Deadline,
) -> Option<HalfMatch<'x, T>> {
    let old_longer = old.len() > new.len();
    let (long, short) = if old_longer { (old, new) } else { (new, old) };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // Seed from the second and the third quarter of the longer text
    let first = half_match_at(long, short, long.len().div_ceil(4), deadline);
    let second = half_match_at(long, short, long.len().div_ceil(2), deadline);
    if deadline.fired() {
        return None;
    }
    let best = match (first, second) {
        (None, None) => return None,
        (Some(hm), None) | (None, Some(hm)) => hm,
        (Some(a), Some(b)) => {
            if a.common.len() > b.common.len() {
                a
            } else {
                b
            }
        }
    };

    // `best` is expressed as (long, short); map back to (old, new)
    Some(if old_longer {
        best
    } else {
        HalfMatch {
            old_head: best.new_head,
            old_tail: best.new_tail,
            new_head: best.old_head,
            new_tail: best.old_tail,
            common: best.common,
        }
    })
}

/// Does a quarter-length seed of `long` starting at `i` extend to a shared
/// substring at least half as long as `long`?
///
/// The returned match uses `old_*` for `long` and `new_*` for `short`.
fn half_match_at<'x, T: Copy + Eq>(
    long: &'x [T],
    short: &'x [T],
    i: usize,
    deadline: &Deadline,
) -> Option<HalfMatch<'x, T>> {
    let seed = &long[i..i + long.len() / 4];
    let mut best: Option<HalfMatch<'x, T>> = None;
    let mut best_len = 0;

    let mut from = 0;
    while let Some(j) = find_from(short, seed, from, deadline) {
        // Each candidate costs O(n); repetitive input yields O(n) candidates
        if deadline.expired() {
            return None;
        }
        let prefix = common_prefix(&long[i..], &short[j..]);
        let suffix = common_suffix(&long[..i], &short[..j]);
        if best_len < prefix + suffix {
            best_len = prefix + suffix;
            best = Some(HalfMatch {
                old_head: &long[..i - suffix],
                old_tail: &long[i + prefix..],
                new_head: &short[..j - suffix],
                new_tail: &short[j + prefix..],
                common: &short[j - suffix..j + prefix],
            });
        }
        from = j + 1;
    }

    best.filter(|hm| hm.common.len() * 2 >= long.len())
}

// =============================================================================
// Tests
// =============================================================================
