//! Adaptive text diff
//!
//! Computes an edit script between two texts under a wall-clock budget.
//! This is a **pure algorithm module** with **no render dependencies**.
//!
//! # Architecture: Diff/Render Separation
//!
//! ```text
//! compute_diff(a, b, &options) -> DiffResult<'_>   // edits borrow from a/b
//!       |
//!       v
//! render(&result.edits, &render_options) -> RenderedView
//! ```
//!
//! # Algorithm Selection
//!
//! | Input | Strategy | Tag |
//! |-------|----------|-----|
//! | identical | single equality | `fast` |
//! | lines, < 1700 total | char-level Myers | `line-based` |
//! | lines, >= 1700 total | line pre-pass + char refine + half-match | `line-based` |
//! | no lines, < 500 chars total | char-level Myers | `accurate` |
//! | no lines, >= 500 chars total | char-level Myers + half-match | `fast` |
//!
//! # Timeout
//!
//! The budget is soft: the bisection polls it and degrades the sub-problem
//! in progress to delete+insert. The script stays valid either way. A run
//! that finishes within 5% of its budget is reported as timed out too.

use std::fmt;
use std::time::{Duration, Instant};

use super::cleanup;
use super::edit::{self, Chunk, Edit, EditKind};
use super::lines;
use super::myers::{Deadline, Myers};

/// Default wall-clock budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Smallest accepted budget in milliseconds; lower values are clamped up.
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Combined line count from which line mode switches to the line pre-pass.
pub const ACCURATE_LINE_THRESHOLD: usize = 1700;

/// Combined character count from which character mode switches to fast.
pub const ACCURATE_CHAR_THRESHOLD: usize = 500;

/// Default length below which equalities between two changes are absorbed.
pub const DEFAULT_MIN_EQUALITY_LEN: usize = 3;

/// Fraction of the budget from which a run counts as timed out.
const TIMEOUT_REPORT_RATIO: f64 = 0.95;

// =============================================================================
// DiffOptions
// =============================================================================

/// Options for [`compute_diff`].
///
/// Immutable once built; share one instance across threads freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Soft wall-clock budget.
    /// Default: 5000 ms, minimum 1 ms
    pub timeout: Duration,
    /// Force line mode on or off. `None` infers it from the input.
    pub line_mode: Option<bool>,
    /// Apply the readability cleanup.
    /// Default: true
    pub semantic_cleanup: bool,
    /// Equalities shorter than this between two changes are folded into
    /// the change during cleanup.
    /// Default: 3
    pub min_equality_len: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            line_mode: None,
            semantic_cleanup: true,
            min_equality_len: DEFAULT_MIN_EQUALITY_LEN,
        }
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for interactive use (short budget).
    pub fn quick() -> Self {
        Self::default().with_timeout(Duration::from_millis(500))
    }

    /// Options for large batch comparisons (long budget).
    pub fn thorough() -> Self {
        Self::default().with_timeout(Duration::from_secs(30))
    }

    /// Set the budget. Values below [`MIN_TIMEOUT_MS`] are clamped.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(MIN_TIMEOUT_MS));
        self
    }

    /// Set the budget in milliseconds. Zero or negative values are clamped
    /// to [`MIN_TIMEOUT_MS`].
    pub fn with_timeout_ms(self, ms: i64) -> Self {
        let ms = u64::try_from(ms).unwrap_or(0);
        self.with_timeout(Duration::from_millis(ms))
    }

    pub fn with_line_mode(mut self, line_mode: Option<bool>) -> Self {
        self.line_mode = line_mode;
        self
    }

    pub fn with_semantic_cleanup(mut self, enabled: bool) -> Self {
        self.semantic_cleanup = enabled;
        self
    }

    pub fn with_min_equality_len(mut self, len: usize) -> Self {
        self.min_equality_len = len;
        self
    }

    /// Budget actually used, after clamping fields set directly.
    fn effective_timeout(&self) -> Duration {
        self.timeout.max(Duration::from_millis(MIN_TIMEOUT_MS))
    }
}

// =============================================================================
// Algorithm
// =============================================================================

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Algorithm {
    /// Identity shortcut or large character input
    Fast,
    /// Small character input, minimal script
    Accurate,
    /// Input with line separators
    LineBased,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Accurate => "accurate",
            Self::LineBased => "line-based",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DiffResult
// =============================================================================

/// Statistics over an edit script (lengths in characters).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct DiffStats {
    /// Sum of all span lengths, equalities included
    pub total_size: usize,
    /// Number of delete and insert operations
    pub change_count: usize,
    /// Characters inserted
    pub insertions: usize,
    /// Characters deleted
    pub deletions: usize,
}

impl DiffStats {
    /// Compute statistics over an edit script.
    pub fn from_edits(edits: &[Edit<'_>]) -> Self {
        let mut stats = Self::default();
        for edit in edits {
            let len = edit.char_len();
            stats.total_size += len;
            match edit.kind() {
                EditKind::Equal => {}
                EditKind::Delete => {
                    stats.deletions += len;
                    stats.change_count += 1;
                }
                EditKind::Insert => {
                    stats.insertions += len;
                    stats.change_count += 1;
                }
            }
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.change_count == 0
    }
}

/// Result of [`compute_diff`].
///
/// Edits borrow from the two input texts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct DiffResult<'a> {
    /// Edit script, old text to new text
    pub edits: Vec<Edit<'a>>,
    /// Whether the time budget ran out (or nearly did)
    pub hit_timeout: bool,
    /// Wall-clock time spent, in milliseconds
    pub computation_time_ms: f64,
    /// Strategy used
    pub algorithm: Algorithm,
    /// Statistics about the edit script
    pub stats: DiffStats,
}

impl<'a> DiffResult<'a> {
    /// Rebuild the old text.
    pub fn text_a(&self) -> String {
        edit::old_text(&self.edits)
    }

    /// Rebuild the new text.
    pub fn text_b(&self) -> String {
        edit::new_text(&self.edits)
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        !self.stats.is_empty()
    }

    pub fn is_identical(&self) -> bool {
        !self.has_changes()
    }

    /// Iterate over the navigable changes (deletes and inserts).
    pub fn changes(&self) -> impl Iterator<Item = &Edit<'a>> + '_ {
        self.edits.iter().filter(|e| e.is_change())
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two texts.
///
/// Total over all inputs: never panics and never fails. A soft timeout is
/// reported through [`DiffResult::hit_timeout`]; the script is still valid.
///
/// # Example
///
/// ```
/// use textdiff_view::algo::{compute_diff, DiffOptions, Edit};
///
/// let result = compute_diff("", "abc", &DiffOptions::default());
/// assert_eq!(result.edits, vec![Edit::Insert("abc")]);
/// assert_eq!(result.stats.insertions, 3);
/// ```
pub fn compute_diff<'a>(text_a: &'a str, text_b: &'a str, options: &DiffOptions) -> DiffResult<'a> {
    let start = Instant::now();

    if text_a == text_b {
        let edits = vec![Edit::Equal(text_a)];
        let stats = DiffStats::from_edits(&edits);
        return DiffResult {
            edits,
            hit_timeout: false,
            computation_time_ms: elapsed_ms(start),
            algorithm: Algorithm::Fast,
            stats,
        };
    }

    let timeout = options.effective_timeout();
    let deadline = Deadline::at(start + timeout);
    let line_mode = options
        .line_mode
        .unwrap_or_else(|| lines::has_lines(text_a, text_b));

    let (mut chunks, algorithm) = if line_mode {
        (diff_lines(text_a, text_b, &deadline), Algorithm::LineBased)
    } else {
        diff_chars(text_a, text_b, &deadline)
    };

    let elapsed = start.elapsed();
    let hit_timeout = deadline.fired()
        || elapsed.as_secs_f64() >= timeout.as_secs_f64() * TIMEOUT_REPORT_RATIO;

    if !hit_timeout && options.semantic_cleanup {
        cleanup::semantic(&mut chunks, options.min_equality_len);
    } else {
        cleanup::merge(&mut chunks);
    }

    let edits = edit::borrow_edits(&chunks, text_a, text_b);
    let stats = DiffStats::from_edits(&edits);
    let computation_time_ms = elapsed_ms(start);

    if hit_timeout {
        tracing::warn!(
            algorithm = %algorithm,
            budget_ms = timeout.as_millis() as u64,
            elapsed_ms = computation_time_ms,
            "diff hit its time budget, result is coarser than optimal"
        );
    }
    tracing::debug!(
        algorithm = %algorithm,
        edits = edits.len(),
        changes = stats.change_count,
        elapsed_ms = computation_time_ms,
        "diff computed"
    );

    DiffResult {
        edits,
        hit_timeout,
        computation_time_ms,
        algorithm,
        stats,
    }
}

/// Diff many independent pairs.
///
/// With the `parallel` feature the pairs are spread over the rayon pool.
/// Results keep the input order.
pub fn compute_diff_batch<'a>(pairs: &[(&'a str, &'a str)], options: &DiffOptions) -> Vec<DiffResult<'a>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pairs
            .par_iter()
            .map(|&(a, b)| compute_diff(a, b, options))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs
            .iter()
            .map(|&(a, b)| compute_diff(a, b, options))
            .collect()
    }
}

// =============================================================================
// Strategies
// =============================================================================

/// Line mode: char-level below the line threshold, line pre-pass above.
fn diff_lines(text_a: &str, text_b: &str, deadline: &Deadline) -> Vec<Chunk> {
    let lines_a = lines::split_lines(text_a);
    let lines_b = lines::split_lines(text_b);
    let total_lines = lines_a.len() + lines_b.len();

    if total_lines < ACCURATE_LINE_THRESHOLD {
        tracing::debug!(total_lines, "line mode: character-level diff");
        let a: Vec<char> = text_a.chars().collect();
        let b: Vec<char> = text_b.chars().collect();
        Myers::accurate(deadline).diff(&a, &b)
    } else {
        tracing::debug!(total_lines, "line mode: line pre-pass");
        lines::diff_line_mode(&Myers::fast(deadline), &lines_a, &lines_b)
    }
}

/// Character mode: accurate below the size threshold, fast above.
fn diff_chars(text_a: &str, text_b: &str, deadline: &Deadline) -> (Vec<Chunk>, Algorithm) {
    let a: Vec<char> = text_a.chars().collect();
    let b: Vec<char> = text_b.chars().collect();
    let total = a.len() + b.len();

    if total < ACCURATE_CHAR_THRESHOLD {
        tracing::debug!(total_chars = total, "character mode: accurate");
        (Myers::accurate(deadline).diff(&a, &b), Algorithm::Accurate)
    } else {
        tracing::debug!(total_chars = total, "character mode: fast");
        (Myers::fast(deadline).diff(&a, &b), Algorithm::Fast)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn diff(a: &'static str, b: &'static str) -> DiffResult<'static> {
        compute_diff(a, b, &DiffOptions::default())
    }

    fn assert_valid(result: &DiffResult<'_>, a: &str, b: &str) {
        assert_eq!(result.text_a(), a);
        assert_eq!(result.text_b(), b);
        for pair in result.edits.windows(2) {
            assert_ne!(pair[0].kind(), pair[1].kind(), "adjacent tags in {:?}", result.edits);
        }
    }

    #[test]
    fn test_identity() {
        let result = diff("same text", "same text");
        assert_eq!(result.edits, vec![Edit::Equal("same text")]);
        assert_eq!(result.stats.change_count, 0);
        assert!(!result.hit_timeout);
        assert_eq!(result.algorithm, Algorithm::Fast);
        assert!(result.is_identical());
    }

    #[test]
    fn test_identity_empty() {
        let result = diff("", "");
        assert_eq!(result.edits, vec![Edit::Equal("")]);
        assert_eq!(result.stats, DiffStats::default());
    }

    #[test]
    fn test_insert_into_empty() {
        let result = diff("", "abc");
        assert_eq!(result.edits, vec![Edit::Insert("abc")]);
        assert_eq!(result.stats.insertions, 3);
        assert_eq!(result.stats.deletions, 0);
        assert_eq!(result.stats.change_count, 1);
    }

    #[test]
    fn test_delete_everything() {
        let result = diff("abc", "");
        assert_eq!(result.edits, vec![Edit::Delete("abc")]);
        assert_eq!(result.stats.deletions, 3);
    }

    #[test]
    fn test_hello_world() {
        let result = diff("hello world", "hello earth");
        assert_valid(&result, "hello world", "hello earth");
        assert_eq!(result.algorithm, Algorithm::Accurate);
        assert_eq!(
            result.edits,
            vec![
                Edit::Equal("hello "),
                Edit::Delete("world"),
                Edit::Insert("earth"),
            ]
        );
        assert_eq!(result.stats.change_count, 2);
        assert_eq!(result.stats.total_size, 16);
    }

    #[test]
    fn test_without_cleanup_keeps_minimal_script() {
        let options = DiffOptions::default().with_semantic_cleanup(false);
        let result = compute_diff("hello world", "hello earth", &options);
        assert_valid(&result, "hello world", "hello earth");
        // The shared "r" survives without cleanup
        assert!(result.edits.contains(&Edit::Equal("r")));
    }

    #[test]
    fn test_inserted_line() {
        let a = "first line\nsecond line\nthird line\n";
        let b = "first line\nsecond line\nbrand new line\nthird line\n";
        let result = diff(a, b);

        assert_valid(&result, a, b);
        assert_eq!(result.algorithm, Algorithm::LineBased);
        let inserts: Vec<&str> = result
            .edits
            .iter()
            .filter(|e| e.kind() == EditKind::Insert)
            .map(Edit::text)
            .collect();
        assert_eq!(inserts, vec!["brand new line\n"]);
        assert_eq!(result.stats.change_count, 1);
    }

    #[test]
    fn test_line_mode_forced_off() {
        let options = DiffOptions::default().with_line_mode(Some(false));
        let result = compute_diff("a\nb", "a\nc", &options);
        assert_eq!(result.algorithm, Algorithm::Accurate);
    }

    #[test]
    fn test_large_char_input_uses_fast() {
        let a = "abcdefghij".repeat(40);
        let b = format!("{}XYZ{}", &a[..200], &a[200..]);
        let result = compute_diff(&a, &b, &DiffOptions::default());
        assert_eq!(result.algorithm, Algorithm::Fast);
        assert_valid(&result, &a, &b);
        assert_eq!(result.stats.insertions, 3);
    }

    #[test]
    fn test_large_line_input_uses_pre_pass() {
        let a: String = (0..1000).map(|i| format!("line number {i}\n")).collect();
        let b = a.replace("line number 500\n", "line number 500 changed\n");
        let result = compute_diff(&a, &b, &DiffOptions::default());

        assert_eq!(result.algorithm, Algorithm::LineBased);
        assert_valid(&result, &a, &b);
        assert_eq!(result.stats.insertions, " changed".len());
        assert_eq!(result.stats.deletions, 0);
    }

    #[test]
    fn test_timeout_option_clamped() {
        let options = DiffOptions::default().with_timeout_ms(-40);
        assert_eq!(options.timeout, Duration::from_millis(MIN_TIMEOUT_MS));

        let options = DiffOptions {
            timeout: Duration::ZERO,
            ..DiffOptions::default()
        };
        assert_eq!(options.effective_timeout(), Duration::from_millis(MIN_TIMEOUT_MS));
    }

    #[test]
    fn test_tiny_budget_stays_valid() {
        let a: String = (0..3000).map(|i| format!("{} alpha {}\n", i * 7, i % 13)).collect();
        let b: String = (0..3000).map(|i| format!("{} beta {}\n", i * 5, i % 11)).collect();
        let options = DiffOptions::default().with_timeout_ms(1);
        let result = compute_diff(&a, &b, &options);

        assert_valid(&result, &a, &b);
        assert!(result.hit_timeout);
    }

    #[test]
    fn test_repetitive_input_respects_budget() {
        let run = "a".repeat(60_000);
        let pairs = [
            (format!("x{run}y"), format!("z{run}w")),
            (format!("q{}", "ab".repeat(40_000)), format!("{}c", "ab".repeat(20_000))),
        ];
        let options = DiffOptions::default().with_timeout(Duration::from_millis(100));

        for (a, b) in &pairs {
            let result = compute_diff(a, b, &options);
            assert_valid(&result, a, b);
            assert!(
                result.computation_time_ms < 2_000.0,
                "took {} ms on a 100 ms budget",
                result.computation_time_ms
            );
        }
    }

    #[test]
    fn test_unicode() {
        let result = diff("naïve café", "naive cafe");
        assert_valid(&result, "naïve café", "naive cafe");
        assert_eq!(result.stats.deletions, 2);
        assert_eq!(result.stats.insertions, 2);
    }

    #[test]
    fn test_batch_keeps_order() {
        let pairs = [("a", "b"), ("same", "same"), ("", "x")];
        let results = compute_diff_batch(&pairs, &DiffOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].edits, vec![Edit::Delete("a"), Edit::Insert("b")]);
        assert!(results[1].is_identical());
        assert_eq!(results[2].edits, vec![Edit::Insert("x")]);
    }

    #[test]
    fn test_algorithm_tags() {
        assert_eq!(Algorithm::Fast.to_string(), "fast");
        assert_eq!(Algorithm::Accurate.to_string(), "accurate");
        assert_eq!(Algorithm::LineBased.to_string(), "line-based");
    }

    fn assert_no_short_islands(edits: &[Edit<'_>]) {
        for window in edits.windows(3) {
            if let [before, Edit::Equal(text), after] = window {
                assert!(
                    !(before.is_change()
                        && after.is_change()
                        && text.chars().count() < DEFAULT_MIN_EQUALITY_LEN),
                    "short equality {text:?} between changes in {edits:?}"
                );
            }
        }
    }

    #[test]
    fn test_no_short_equality_after_alignment() {
        let result = diff("a\nb\nbc", "Qa\nbc");
        assert_valid(&result, "a\nb\nbc", "Qa\nbc");
        assert_no_short_islands(&result.edits);
    }

    /// Newline-terminated lines drawn from a small pool, some padded with
    /// whitespace so trimmed ids collide with differing raw lines.
    fn line_text(lines: std::ops::Range<usize>) -> impl Strategy<Value = String> {
        prop::collection::vec(prop_oneof!["[a-c]{1,3}", " [a-c]{1,3}", "[a-c]{1,3}\t"], lines)
            .prop_map(|lines| lines.into_iter().map(|line| line + "\n").collect::<String>())
    }

    static_assertions::assert_impl_all!(DiffOptions: Send, Sync);
    static_assertions::assert_impl_all!(DiffResult<'static>: Send, Sync);

    proptest! {
        #[test]
        fn prop_reconstructs(a in "[a-c \n]{0,40}", b in "[a-c \n]{0,40}") {
            let result = compute_diff(&a, &b, &DiffOptions::default());
            prop_assert_eq!(result.text_a(), a.clone());
            prop_assert_eq!(result.text_b(), b.clone());
            for pair in result.edits.windows(2) {
                prop_assert_ne!(pair[0].kind(), pair[1].kind());
            }
        }

        #[test]
        fn prop_reconstructs_without_cleanup(a in "\\PC{0,30}", b in "\\PC{0,30}") {
            let options = DiffOptions::default().with_semantic_cleanup(false);
            let result = compute_diff(&a, &b, &options);
            prop_assert_eq!(result.text_a(), a.clone());
            prop_assert_eq!(result.text_b(), b.clone());
        }

        #[test]
        fn prop_no_short_equality_between_changes(a in "[a-d .\n]{0,60}", b in "[a-d .\n]{0,60}") {
            let result = compute_diff(&a, &b, &DiffOptions::default());
            prop_assume!(!result.hit_timeout);
            assert_no_short_islands(&result.edits);
        }

        #[test]
        fn prop_stats_consistent(a in "[a-e]{0,30}", b in "[a-e]{0,30}") {
            let result = compute_diff(&a, &b, &DiffOptions::default());
            let changes = result.edits.iter().filter(|e| e.is_change()).count();
            prop_assert_eq!(result.stats.change_count, changes);
            prop_assert_eq!(
                result.stats.total_size,
                a.chars().count() + result.stats.insertions
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_fast_char_path_reconstructs(a in "[a-c .]{250,400}", b in "[a-c .]{250,400}") {
            let result = compute_diff(&a, &b, &DiffOptions::default());
            prop_assert_eq!(result.algorithm, Algorithm::Fast);
            prop_assert_eq!(result.text_a(), a.clone());
            prop_assert_eq!(result.text_b(), b.clone());
            for pair in result.edits.windows(2) {
                prop_assert_ne!(pair[0].kind(), pair[1].kind());
            }
        }

        #[test]
        fn prop_line_pre_pass_reconstructs(a in line_text(900..1000), b in line_text(900..1000)) {
            prop_assume!(a != b);
            let result = compute_diff(&a, &b, &DiffOptions::default());
            prop_assert_eq!(result.algorithm, Algorithm::LineBased);
            prop_assert_eq!(result.text_a(), a.clone());
            prop_assert_eq!(result.text_b(), b.clone());
            for pair in result.edits.windows(2) {
                prop_assert_ne!(pair[0].kind(), pair[1].kind());
            }
        }

        #[test]
        fn prop_reconstructs_under_tiny_budget(
            a in "[a-d \n]{1500,3000}",
            b in "[a-d \n]{1500,3000}",
            lines in line_text(900..1000),
        ) {
            let options = DiffOptions::default().with_timeout_ms(1);
            for (old, new) in [(a.as_str(), b.as_str()), (lines.as_str(), b.as_str())] {
                let result = compute_diff(old, new, &options);
                prop_assert_eq!(result.text_a(), old);
                prop_assert_eq!(result.text_b(), new);
                for pair in result.edits.windows(2) {
                    prop_assert_ne!(pair[0].kind(), pair[1].kind());
                }
            }
        }
    }
}
