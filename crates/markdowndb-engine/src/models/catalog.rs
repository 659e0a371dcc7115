use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::{CacheStats, ParseCache};
use crate::editing::{Patch, apply_fix};
use crate::io::{DocumentStore, StoreError};
use crate::parsing::ParsedDocument;
use crate::validation::{Fix, ValidationReport, validate};

use super::entity_kind::{EntityKind, SchemaSet};

/// The collection of live entities.
///
/// Owns the store, the set of live ids and the parse cache for them, and is
/// the one place that prunes the cache when entities go away.
#[derive(Debug)]
pub struct Catalog<S: DocumentStore> {
    store: S,
    live: BTreeSet<String>,
    cache: ParseCache,
    schemas: SchemaSet,
}

impl<S: DocumentStore> Catalog<S> {
    /// Opens a catalog over every document already in `store`.
    pub fn open(store: S) -> Result<Self, StoreError> {
        Self::with_cache(store, ParseCache::new())
    }

    pub fn with_cache(store: S, cache: ParseCache) -> Result<Self, StoreError> {
        let live = store.ids()?.into_iter().collect();
        Ok(Self {
            store,
            live,
            cache,
            schemas: SchemaSet::default(),
        })
    }

    pub fn with_schemas(mut self, schemas: SchemaSet) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Live ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.live.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.live.contains(id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Starts a new entry seeded from the kind's template.
    ///
    /// Overwrites nothing: an existing id is left alone and its text returned.
    pub fn create(&mut self, kind: EntityKind, id: &str) -> Result<String, StoreError> {
        if let Some(existing) = self.store.get(id)? {
            log::warn!("{id} already exists; not overwriting it with a {kind} template");
            return Ok(existing);
        }
        let text = crate::models::template_for(self.schemas.get(kind));
        self.write(id, &text)?;
        Ok(text)
    }

    /// Persists text verbatim, registering the id if it is new.
    ///
    /// The cached parse is dropped too, since the edit may lie past the
    /// fingerprint.
    pub fn write(&mut self, id: &str, text: &str) -> Result<(), StoreError> {
        self.store.set(id, text)?;
        self.cache.invalidate(id);
        self.live.insert(id.to_string());
        Ok(())
    }

    pub fn read_text(&self, id: &str) -> Result<String, StoreError> {
        self.store
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// The parsed document for `id`, served from the cache when unchanged.
    pub fn parsed(&mut self, id: &str) -> Result<Arc<ParsedDocument>, StoreError> {
        let text = self.read_text(id)?;
        Ok(self.cache.get_or_parse(id, &text))
    }

    /// Validates `id`.
    ///
    /// The schema is picked from `kind` if given, else from the document's
    /// type tag, else the job schema.
    pub fn validate(
        &mut self,
        id: &str,
        kind: Option<EntityKind>,
    ) -> Result<ValidationReport, StoreError> {
        let doc = self.parsed(id)?;
        let kind = kind
            .or_else(|| EntityKind::detect(&doc))
            .unwrap_or(EntityKind::Job);
        Ok(validate(&doc, self.schemas.get(kind)))
    }

    /// Applies a fix to the stored text and saves the result if it changed.
    pub fn apply_fix(&mut self, id: &str, fix: &Fix, cursor: usize) -> Result<Patch, StoreError> {
        let text = self.read_text(id)?;
        let patch = apply_fix(&text, fix, cursor);
        if !patch.is_noop() {
            self.write(id, &patch.text)?;
        }
        Ok(patch)
    }

    /// Deletes `id` and prunes the cache down to the remaining live ids.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id)?;
        let before = self.live.len();
        self.live.remove(id);
        if self.live.len() != before {
            self.cache.prune(self.live.iter().map(String::as_str));
        }
        Ok(())
    }

    /// Consumes the catalog, handing back its store.
    pub fn into_store(self) -> S {
        self.store
    }
}
