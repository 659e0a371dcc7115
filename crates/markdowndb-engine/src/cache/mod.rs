//! # Parse Cache
//!
//! A per-entity memo in front of [`parse`](crate::parsing::parse), so UI reads
//! that re-parse on every render do not redo the work when the text has not
//! changed.
//!
//! The fingerprint is a fixed-length prefix of the raw text. An edit that only
//! touches text past the prefix is not noticed and the stale parse is served.
//! This is a known limitation of the fingerprint, kept as is.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::parsing::{ParsedDocument, parse};

/// Characters of raw text used as the fingerprint unless configured otherwise.
pub const DEFAULT_FINGERPRINT_LEN: usize = 100;

/// Cumulative counters. Monotonic for the life of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses where an entry existed but its fingerprint no longer matched.
    pub invalidations: u64,
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: String,
    doc: Arc<ParsedDocument>,
}

/// Memo of parsed documents keyed by entity id.
///
/// Owned by whatever owns the list of live entities (see
/// [`Catalog`](crate::models::Catalog)); it is not global state.
#[derive(Debug)]
pub struct ParseCache {
    entries: HashMap<String, CacheEntry>,
    fingerprint_len: usize,
    stats: CacheStats,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::with_fingerprint_len(DEFAULT_FINGERPRINT_LEN)
    }

    pub fn with_fingerprint_len(fingerprint_len: usize) -> Self {
        Self {
            entries: HashMap::new(),
            fingerprint_len,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached parse for `id` if `text` still matches its
    /// fingerprint, otherwise parses, stores and returns a fresh one.
    pub fn get_or_parse(&mut self, id: &str, text: &str) -> Arc<ParsedDocument> {
        let fingerprint = self.fingerprint(text);

        if let Some(entry) = self.entries.get(id) {
            if entry.fingerprint == fingerprint {
                self.stats.hits += 1;
                log::debug!("parse cache hit for {id}");
                return Arc::clone(&entry.doc);
            }
            self.stats.invalidations += 1;
            log::debug!("parse cache invalidated for {id}");
        }

        self.stats.misses += 1;
        log::debug!("parse cache miss for {id}");

        let doc = Arc::new(parse(text));
        self.entries.insert(
            id.to_string(),
            CacheEntry {
                fingerprint,
                doc: Arc::clone(&doc),
            },
        );
        doc
    }

    /// Drops every entry whose id is not live. Returns how many were removed.
    ///
    /// Call when the entity collection changes size, not on every read.
    pub fn prune<'a>(&mut self, live_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let live: HashSet<&str> = live_ids.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id.as_str()));

        let removed = before - self.entries.len();
        if removed > 0 {
            log::info!("parse cache pruned {removed} stale entries");
        }
        removed
    }

    /// Forgets the entry for `id` so the next read parses afresh.
    ///
    /// For owners that rewrote the text themselves and so know it changed,
    /// even past the fingerprint. Returns whether an entry was dropped.
    pub fn invalidate(&mut self, id: &str) -> bool {
        let removed = self.entries.remove(id).is_some();
        if removed {
            self.stats.invalidations += 1;
            log::debug!("parse cache invalidated for {id}");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn fingerprint_len(&self) -> usize {
        self.fingerprint_len
    }

    /// The first `fingerprint_len` characters of `text`.
    pub fn fingerprint(&self, text: &str) -> String {
        match text.char_indices().nth(self.fingerprint_len) {
            Some((cut, _)) => text[..cut].to_string(),
            None => text.to_string(),
        }
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`ParseCache`] behind a mutex, for hosts that read from several threads.
///
/// Each call holds the lock for its whole check-then-insert (or prune), so two
/// readers can never interleave inside one operation.
#[derive(Debug, Clone, Default)]
pub struct SharedParseCache(Arc<Mutex<ParseCache>>);

impl SharedParseCache {
    pub fn new(cache: ParseCache) -> Self {
        Self(Arc::new(Mutex::new(cache)))
    }

    pub fn get_or_parse(&self, id: &str, text: &str) -> Arc<ParsedDocument> {
        self.lock().get_or_parse(id, text)
    }

    pub fn prune<'a>(&self, live_ids: impl IntoIterator<Item = &'a str>) -> usize {
        self.lock().prune(live_ids)
    }

    pub fn invalidate(&self, id: &str) -> bool {
        self.lock().invalidate(id)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    // Parsing cannot leave the map half-written, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, ParseCache> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
