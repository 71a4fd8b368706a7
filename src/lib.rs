//! textdiff-view - Time-bounded Text Diffing with Navigable Rendering
//!
//! ## Core Concepts
//!
//! **Total, time-bounded diffing**: [`compute_diff`] never fails. Myers
//! bisection runs under a cooperative deadline; when the budget runs out the
//! remaining sub-problems degrade to coarse delete/insert pairs and the result
//! is flagged with `hit_timeout`. The edit script always reconstructs both
//! inputs exactly.
//!
//! **Regions**: every delete or insert in the script is a navigable region,
//! numbered in order by the renderer and walked by a [`HighlightCursor`].
//!
//! ## Modules
//! - `algo`: Diff engine (Myers, line pre-pass, semantic cleanup)
//! - `render`: Side-by-side token views and HTML output
//! - `cursor`: Highlight navigation
//! - `session`: A diff together with its cursor
//! - `store`: Shared document storage
//! - `hash`: Stable hashing for short ids
//! - `error`: Store errors
//!
//! ## Usage
//!
//! ```
//! use textdiff_view::{compute_diff, render, DiffOptions, Edit, RenderOptions};
//!
//! let result = compute_diff("hello world", "hello earth", &DiffOptions::default());
//! assert_eq!(
//!     result.edits,
//!     vec![Edit::Equal("hello "), Edit::Delete("world"), Edit::Insert("earth")]
//! );
//!
//! let options = RenderOptions::default().with_highlight(Some(0));
//! let view = render(&result.edits, &options);
//! assert_eq!(view.change_count, 2);
//! assert!(view.left_html(&options).contains("diff-highlight"));
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Algorithms: diff, myers, cleanup
pub mod algo;

/// Highlight navigation
pub mod cursor;

/// Error types
pub mod error;

/// Deterministic hashing for document ids
pub mod hash;

/// Prelude for common imports
pub mod prelude;

/// Side-by-side rendering
pub mod render;

/// Diff plus navigation state
pub mod session;

/// Document storage
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

// Algorithms
pub use algo::{
    compute_diff, compute_diff_batch, Algorithm, DiffOptions, DiffResult, DiffStats, Edit,
    EditKind,
};

// Hashing
pub use hash::StableHasher;

// Rendering
pub use render::{render, RenderOptions, RenderedView, Role, Side, Token};

// Navigation
pub use cursor::HighlightCursor;
pub use session::DiffSession;

// Storage
pub use store::{DiffDocument, DocumentStore, MemoryStore, NewDocument, ShortId};

// Error types
pub use error::{StoreError, StoreResult};

// =============================================================================
// Tests
// =============================================================================
