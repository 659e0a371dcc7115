//! Persistence adapters. The engine itself never decides when to save; these
//! store and fetch raw text by entity id and know nothing about schemas.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of documents kept by [`FileStore`].
pub const DOCUMENT_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid documents directory: {0}")]
    InvalidDocumentsDir(PathBuf),
}

/// Get/set of raw document text by entity id.
pub trait DocumentStore {
    /// The text for `id`, or `None` if there is no such document.
    fn get(&self, id: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, id: &str, text: &str) -> Result<(), StoreError>;
    /// Removes `id`. Removing an unknown id is an error.
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
    /// All ids, sorted.
    fn ids(&self) -> Result<Vec<String>, StoreError>;
}

/// Rejects ids that are empty, hidden, or could escape the store directory.
pub fn validate_id(id: &str) -> Result<(), StoreError> {
    let bad = id.trim().is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0'])
        || id != id.trim();
    if bad {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Stores each document as `<id>.md` in one flat directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::InvalidDocumentsDir(root));
        }
        Ok(Self { root })
    }

    /// Opens `root`, creating it first if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.{DOCUMENT_EXTENSION}")))
    }
}

impl DocumentStore for FileStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&mut self, id: &str, text: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        fs::write(&path, text)?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(ext) = path.extension()
                && ext == DOCUMENT_EXTENSION
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_id(stem).is_ok()
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// In-memory store, for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<String>, StoreError> {
        validate_id(id)?;
        Ok(self.docs.get(id).cloned())
    }

    fn set(&mut self, id: &str, text: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        self.docs.insert(id.to_string(), text.to_string());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.docs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.docs.keys().cloned().collect())
    }
}
