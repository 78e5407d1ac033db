use std::sync::Arc;

use log::debug;

use crate::asset::CoverImage;

struct Entry {
    key: i64,
    /// `None` once the buffer has been surrendered through
    /// [`CoverCache::discard_oldest`]; the mapping stays until eviction.
    cover: Option<Arc<CoverImage>>,
}

/// Fixed-capacity LRU cache of generated covers, keyed by item id.
///
/// Entries are kept in recency order (front = least recently used). `get`
/// deliberately does not promote its entry; promotion is a separate
/// `touch` so that a probe during generation scheduling cannot disturb
/// eviction order.
pub struct CoverCache {
    entries: Vec<Entry>,
    capacity: usize,
}

impl CoverCache {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        CoverCache {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Look up the cover for `key` without touching recency.
    pub fn get(&self, key: i64) -> Option<Arc<CoverImage>> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.cover.clone())
    }

    /// Mark `key` most-recently-used. No-op if absent.
    pub fn touch(&mut self, key: i64) {
        if let Some(pos) = self.entries.iter().position(|e| e.key == key) {
            let entry = self.entries.remove(pos);
            self.entries.push(entry);
        }
    }

    /// Insert or replace the cover for `key`, making it most-recently-used.
    ///
    /// Inserting a new key at capacity evicts the least-recently-used entry
    /// first; its cover (if it still holds one) is returned so the caller
    /// can release the buffer. Replacing an existing key returns the
    /// previous cover the same way.
    pub fn put(&mut self, key: i64, cover: Arc<CoverImage>) -> Option<Arc<CoverImage>> {
        if let Some(pos) = self.entries.iter().position(|e| e.key == key) {
            let mut entry = self.entries.remove(pos);
            let previous = entry.cover.replace(cover);
            self.entries.push(entry);
            return previous;
        }

        let evicted = if self.entries.len() == self.capacity {
            let oldest = self.entries.remove(0);
            debug!("evicting cached cover for item {}", oldest.key);
            oldest.cover
        } else {
            None
        };

        self.entries.push(Entry {
            key,
            cover: Some(cover),
        });
        evicted
    }

    /// Surrender the least-recently-used entry's cover for buffer reuse,
    /// leaving the mapping in place. The cache never reads the buffer
    /// again: a later `get` under that key reports absent, and a repeated
    /// call cannot hand the same buffer out twice.
    pub fn discard_oldest(&mut self) -> Option<Arc<CoverImage>> {
        self.entries.first_mut().and_then(|e| e.cover.take())
    }

    /// Drop every mapping, returning the held covers for explicit release.
    /// Used on full invalidation (viewport resize).
    pub fn clear(&mut self) -> Vec<Arc<CoverImage>> {
        self.entries.drain(..).filter_map(|e| e.cover).collect()
    }
}
