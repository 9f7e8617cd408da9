//! Layout caching for memoization.

use std::collections::HashMap;
use vellum_core::{Size, VirtualNode};

/// Cache key combining node identity and the available size.
///
/// Identity is the node's address, which is stable while one tree is borrowed
/// for a layout pass. Keys must not outlive that pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Node address
    pub node: usize,
    /// Space offered to the node
    pub available: Size,
}

impl CacheKey {
    /// Key for measuring `node` within `available`.
    #[must_use]
    pub fn new(node: &VirtualNode, available: Size) -> Self {
        Self {
            node: node as *const VirtualNode as usize,
            available,
        }
    }
}

/// Layout cache for memoizing measure results within one pass.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: HashMap<CacheKey, Size>,
    hits: usize,
    misses: usize,
}

impl LayoutCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached size.
    #[must_use]
    pub fn get(&mut self, key: CacheKey) -> Option<Size> {
        if let Some(size) = self.entries.get(&key) {
            self.hits += 1;
            Some(*size)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert a computed size into the cache.
    pub fn insert(&mut self, key: CacheKey, size: Size) {
        self.entries.insert(key, size);
    }

    /// Clear the entire cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of cache hits.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Get the number of cache misses.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Get the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
