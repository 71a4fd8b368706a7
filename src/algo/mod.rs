//! Algorithm implementations for text diffing.
//!
//! - `diff`: entry point, algorithm selection, options and statistics
//! - `myers`: Myers bisection with a cooperative deadline
//! - `lines`: line-granularity pre-pass
//! - `cleanup`: readability passes over edit scripts
//! - `edit`: edit operation types

mod cleanup;
mod diff;
mod edit;
mod lines;
mod myers;

pub use diff::{
    compute_diff, compute_diff_batch, Algorithm, DiffOptions, DiffResult, DiffStats,
    ACCURATE_CHAR_THRESHOLD, ACCURATE_LINE_THRESHOLD, DEFAULT_MIN_EQUALITY_LEN,
    DEFAULT_TIMEOUT_MS, MIN_TIMEOUT_MS,
};
pub use edit::{new_text, old_text, Edit, EditKind};
