//! Prelude module for common imports.
//!
//! ```
//! use textdiff_view::prelude::*;
//!
//! let mut session = DiffSession::compute(
//!     "a b c",
//!     "a B c",
//!     &DiffOptions::default(),
//!     RenderOptions::default(),
//! );
//! assert!(session.next_change());
//! ```

// Algorithms
pub use crate::algo::{
    compute_diff, compute_diff_batch, new_text, old_text, Algorithm, DiffOptions, DiffResult,
    DiffStats, Edit, EditKind,
};

// Hashing
pub use crate::hash::StableHasher;

// Render
pub use crate::render::{
    escape_html, render, render_tokens_html, RenderOptions, RenderedView, Role, Side, Token,
    DEFAULT_MAX_CHUNKS, DEFAULT_REGION_ATTR,
};

// Navigation
pub use crate::cursor::HighlightCursor;
pub use crate::session::DiffSession;

// Store
pub use crate::store::{DiffDocument, DocumentStore, MemoryStore, NewDocument, ShortId};

// Error
pub use crate::error::{StoreError, StoreResult};
