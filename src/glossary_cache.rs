//! Glossary entry cache.
//!
//! Caches fetched entry lists per glossary id. Entries are fetched on first
//! use and kept for the lifetime of the process; only deletion or
//! recreation of a glossary removes them.

use crate::client::GlossaryEntry;
use lru::LruCache;

/// Cache of glossary entry lists keyed by glossary id.
pub struct GlossaryCache {
    cache: LruCache<String, Vec<GlossaryEntry>>,
}

impl GlossaryCache {
    /// Creates an empty cache that never evicts on its own.
    pub fn new() -> Self {
        Self {
            cache: LruCache::unbounded(),
        }
    }

    /// Retrieves the entries of a glossary if they were fetched before.
    pub fn get(&mut self, id: &str) -> Option<Vec<GlossaryEntry>> {
        let result = self.cache.get(id).cloned();
        if result.is_some() {
            log::info!("Cache HIT: glossary {}", id);
        } else {
            log::info!("Cache MISS: glossary {}", id);
        }
        result
    }

    /// Stores the entries of a glossary.
    pub fn put(&mut self, id: String, entries: Vec<GlossaryEntry>) {
        log::info!("Cache PUT: glossary {} ({} entries)", id, entries.len());
        self.cache.put(id, entries);
    }

    /// Drops the entries of a glossary.
    pub fn remove(&mut self, id: &str) {
        if self.cache.pop(id).is_some() {
            log::info!("Cache DROP: glossary {}", id);
        }
    }

    /// Drops every cached glossary whose id does not satisfy `keep`.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        let orphaned: Vec<String> = self
            .cache
            .iter()
            .filter(|(id, _)| !keep(id.as_str()))
            .map(|(id, _)| id.clone())
            .collect();
        for id in orphaned {
            self.remove(&id);
        }
    }
}

impl Default for GlossaryCache {
    fn default() -> Self {
        Self::new()
    }
}
