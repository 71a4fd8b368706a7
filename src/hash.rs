//! Deterministic hashing utilities
//!
//! Provides cross-process deterministic hashing using blake3, used to derive
//! short document identifiers and access tokens.

/// Alphabet for [`StableHasher::finish_base62`].
const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// =============================================================================
// StableHasher - Builder Pattern
// =============================================================================

/// A deterministic hasher using blake3
///
/// Unlike `std::hash::Hasher`, this produces the same output across
/// process restarts for the same input.
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    /// Create a new StableHasher
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Update with raw bytes
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    /// Update with a string, length-prefixed so that consecutive strings
    /// cannot run into each other (`"ab" + "c"` differs from `"a" + "bc"`)
    #[inline]
    pub fn update_str(self, s: &str) -> Self {
        self.update_usize(s.len()).update(s.as_bytes())
    }

    /// Update with a u64 value (little-endian)
    #[inline]
    pub fn update_u64(self, v: u64) -> Self {
        self.update(&v.to_le_bytes())
    }

    /// Update with a usize value (little-endian)
    #[inline]
    pub fn update_usize(self, v: usize) -> Self {
        self.update_u64(v as u64)
    }

    /// Finish and return the hash as u64
    ///
    /// Takes the first 8 bytes of blake3 output as little-endian u64.
    #[inline]
    pub fn finish(self) -> u64 {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Finish and return `len` base62 characters of the hash.
    ///
    /// Each character consumes one byte of blake3's extended output.
    pub fn finish_base62(self, len: usize) -> String {
        let mut reader = self.inner.finalize_xof();
        let mut bytes = vec![0u8; len];
        reader.fill(&mut bytes);
        bytes
            .iter()
            .map(|b| BASE62[(*b as usize) % BASE62.len()] as char)
            .collect()
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}
