//! Storage for shared diff documents.
//!
//! A stored document is the pair of texts behind a diff, addressed by a short
//! base62 id suitable for URLs. Diffs are recomputed on fetch, so only the
//! inputs are kept.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ShortId`] | 8-character public identifier |
//! | [`NewDocument`] | Insert request |
//! | [`DiffDocument`] | Stored record |
//! | [`DocumentStore`] | Backend boundary |
//! | [`MemoryStore`] | In-process backend |

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use compact_str::CompactString;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{StoreError, StoreResult};
use crate::hash::StableHasher;

/// Length of generated short ids.
pub const SHORT_ID_LEN: usize = 8;

/// Length of generated access tokens.
pub const ACCESS_TOKEN_LEN: usize = 24;

// =============================================================================
// ShortId
// =============================================================================

/// Public identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortId(CompactString);

impl ShortId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(CompactString::new(id.as_ref()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShortId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Request to store a pair of texts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewDocument {
    pub text_a: String,
    pub text_b: String,
    /// Expiry time in unix milliseconds
    pub expires_at: Option<u64>,
    pub is_private: bool,
}

impl NewDocument {
    pub fn new(text_a: impl Into<String>, text_b: impl Into<String>) -> Self {
        Self {
            text_a: text_a.into(),
            text_b: text_b.into(),
            ..Self::default()
        }
    }

    pub fn with_expiry(mut self, expires_at: u64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Require an access token to fetch the document.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }
}

/// A stored pair of texts.
///
/// Timestamps are unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffDocument {
    /// Insertion sequence number, unique per store
    pub id: u64,
    pub short_id: ShortId,
    pub text_a: String,
    pub text_b: String,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub is_private: bool,
    /// Present exactly when `is_private` is set
    pub access_token: Option<String>,
    pub view_count: u64,
}

impl DiffDocument {
    /// Whether the document has expired at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Whether `token` grants access to this document.
    pub fn allows(&self, token: Option<&str>) -> bool {
        match (&self.access_token, token) {
            (None, _) => true,
            (Some(expected), Some(given)) => expected == given,
            (Some(_), None) => false,
        }
    }
}

// =============================================================================
// DocumentStore
// =============================================================================

/// Backend for diff documents.
pub trait DocumentStore: Send + Sync {
    /// Store a document and return its short id.
    fn insert(&self, doc: NewDocument, now: u64) -> StoreResult<ShortId>;

    /// Fetch a document, counting the view.
    ///
    /// Private documents require their access token.
    fn fetch(&self, short_id: &ShortId, token: Option<&str>, now: u64) -> StoreResult<DiffDocument>;

    /// Remove a document, returning it if present.
    fn remove(&self, short_id: &ShortId) -> Option<DiffDocument>;

    /// Drop every document expired at `now`. Returns how many were dropped.
    fn purge_expired(&self, now: u64) -> usize;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Document map keyed by short id.
pub type DocumentMap = FxHashMap<ShortId, DiffDocument>;

/// Thread-safe in-memory store.
///
/// Cloning yields another handle to the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<DocumentMap>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a closure with read access to the documents.
    pub fn with_read<R>(&self, f: impl FnOnce(&DocumentMap) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Execute a closure with write access to the documents.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut DocumentMap) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Check if the store contains a short id.
    pub fn contains(&self, short_id: &ShortId) -> bool {
        self.with_read(|docs| docs.contains_key(short_id))
    }

    /// Get the number of stored documents.
    pub fn len(&self) -> usize {
        self.with_read(|docs| docs.len())
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

fn derive_short_id(doc: &NewDocument, created_at: u64, sequence: u64) -> ShortId {
    let id = StableHasher::new()
        .update_str(&doc.text_a)
        .update_str(&doc.text_b)
        .update_u64(created_at)
        .update_u64(sequence)
        .finish_base62(SHORT_ID_LEN);
    ShortId::new(id)
}

fn derive_access_token(short_id: &ShortId, created_at: u64, sequence: u64) -> String {
    StableHasher::new()
        .update(b"access-token")
        .update_str(short_id.as_str())
        .update_u64(created_at)
        .update_u64(sequence)
        .finish_base62(ACCESS_TOKEN_LEN)
}

impl DocumentStore for MemoryStore {
    fn insert(&self, doc: NewDocument, now: u64) -> StoreResult<ShortId> {
        if let Some(expires_at) = doc.expires_at.filter(|&at| at <= now) {
            return Err(StoreError::invalid(format!(
                "expiry {expires_at} is not after creation time {now}"
            )));
        }

        self.with_write(|docs| {
            // Ids are hashes, so retry with a fresh sequence number on collision.
            let (id, short_id) = loop {
                let id = self.next_sequence();
                let short_id = derive_short_id(&doc, now, id);
                if !docs.contains_key(&short_id) {
                    break (id, short_id);
                }
                tracing::debug!(%short_id, "short id collision");
            };

            let access_token = doc
                .is_private
                .then(|| derive_access_token(&short_id, now, id));

            docs.insert(
                short_id.clone(),
                DiffDocument {
                    id,
                    short_id: short_id.clone(),
                    text_a: doc.text_a,
                    text_b: doc.text_b,
                    created_at: now,
                    expires_at: doc.expires_at,
                    is_private: doc.is_private,
                    access_token,
                    view_count: 0,
                },
            );
            tracing::debug!(%short_id, id, "document stored");
            Ok(short_id)
        })
    }

    fn fetch(&self, short_id: &ShortId, token: Option<&str>, now: u64) -> StoreResult<DiffDocument> {
        self.with_write(|docs| {
            let doc = docs
                .get_mut(short_id)
                .ok_or_else(|| StoreError::not_found(short_id.as_str()))?;

            if let Some(expired_at) = doc.expires_at.filter(|_| doc.is_expired(now)) {
                return Err(StoreError::Expired {
                    short_id: short_id.to_string(),
                    expired_at,
                });
            }
            if !doc.allows(token) {
                tracing::warn!(%short_id, "access token mismatch");
                return Err(StoreError::AccessDenied(short_id.to_string()));
            }

            doc.view_count += 1;
            Ok(doc.clone())
        })
    }

    fn remove(&self, short_id: &ShortId) -> Option<DiffDocument> {
        self.with_write(|docs| docs.remove(short_id))
    }

    fn purge_expired(&self, now: u64) -> usize {
        self.with_write(|docs| {
            let before = docs.len();
            docs.retain(|_, doc| !doc.is_expired(now));
            let purged = before - docs.len();
            if purged > 0 {
                tracing::debug!(purged, remaining = docs.len(), "purged expired documents");
            }
            purged
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        let id = ShortId::new("abc123XY");
        assert_eq!(id.as_str(), "abc123XY");
        assert_eq!(id.to_string(), "abc123XY");
        assert_eq!(ShortId::from("abc123XY"), id);
    }

    #[test]
    fn test_insert_fetch_counts_views() {
        let store = MemoryStore::new();
        let short_id = store.insert(NewDocument::new("old", "new"), 1_000).unwrap();

        assert_eq!(short_id.as_str().len(), SHORT_ID_LEN);
        assert!(short_id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));

        let first = store.fetch(&short_id, None, 2_000).unwrap();
        assert_eq!(first.text_a, "old");
        assert_eq!(first.text_b, "new");
        assert_eq!(first.created_at, 1_000);
        assert_eq!(first.view_count, 1);
        assert!(first.access_token.is_none());

        let second = store.fetch(&short_id, None, 3_000).unwrap();
        assert_eq!(second.view_count, 2);
    }

    #[test]
    fn test_same_texts_get_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.insert(NewDocument::new("x", "y"), 5).unwrap();
        let b = store.insert(NewDocument::new("x", "y"), 5).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_private_requires_token() {
        let store = MemoryStore::new();
        let short_id = store
            .insert(NewDocument::new("secret a", "secret b").private(), 10)
            .unwrap();

        let token = store
            .with_read(|docs| docs.get(&short_id).and_then(|d| d.access_token.clone()))
            .unwrap();
        assert_eq!(token.len(), ACCESS_TOKEN_LEN);

        assert_eq!(
            store.fetch(&short_id, None, 11),
            Err(StoreError::AccessDenied(short_id.to_string()))
        );
        assert!(matches!(
            store.fetch(&short_id, Some("wrong"), 11),
            Err(StoreError::AccessDenied(_))
        ));

        let doc = store.fetch(&short_id, Some(token.as_str()), 11).unwrap();
        assert!(doc.is_private);
        assert_eq!(doc.view_count, 1);
    }

    #[test]
    fn test_expiry_and_purge() {
        let store = MemoryStore::new();
        let short_lived = store
            .insert(NewDocument::new("a", "b").with_expiry(100), 0)
            .unwrap();
        let forever = store.insert(NewDocument::new("c", "d"), 0).unwrap();

        assert!(store.fetch(&short_lived, None, 99).is_ok());
        assert_eq!(
            store.fetch(&short_lived, None, 100),
            Err(StoreError::Expired {
                short_id: short_lived.to_string(),
                expired_at: 100,
            })
        );

        assert_eq!(store.purge_expired(100), 1);
        assert!(!store.contains(&short_lived));
        assert!(store.contains(&forever));
        assert_eq!(store.purge_expired(100), 0);
    }

    #[test]
    fn test_invalid_expiry_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert(NewDocument::new("a", "b").with_expiry(50), 50)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_and_remove() {
        let store = MemoryStore::new();
        assert_eq!(
            store.fetch(&ShortId::new("nope"), None, 0),
            Err(StoreError::not_found("nope"))
        );

        let short_id = store.insert(NewDocument::new("a", "b"), 0).unwrap();
        let handle = store.clone();
        assert!(handle.remove(&short_id).is_some());
        assert!(store.remove(&short_id).is_none());
    }

    #[test]
    fn test_store_is_object_safe() {
        let store: Box<dyn DocumentStore> = Box::new(MemoryStore::new());
        let short_id = store.insert(NewDocument::new("a", "b"), 0).unwrap();
        assert!(store.fetch(&short_id, None, 0).is_ok());
    }
}
