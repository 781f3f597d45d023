//! In-memory knowledge store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use mend_core::{
    application::{ApplicationError, ports::KnowledgeStore},
    domain::{KnowledgeBaseEntry, Signature},
    error::MendResult,
};

/// Thread-safe, non-persistent knowledge store.
///
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct InMemoryKnowledgeStore {
    inner: Arc<RwLock<HashMap<Signature, KnowledgeBaseEntry>>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from an exported knowledge base.
    pub fn with_entries(entries: impl IntoIterator<Item = KnowledgeBaseEntry>) -> Self {
        let map = entries.into_iter().map(|e| (e.signature, e)).collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KnowledgeStore for InMemoryKnowledgeStore {
    fn get(&self, signature: &Signature) -> MendResult<Option<KnowledgeBaseEntry>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError {
            during: "reading the knowledge base",
        })?;
        Ok(inner.get(signature).cloned())
    }

    fn put(&self, entry: KnowledgeBaseEntry) -> MendResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError {
            during: "writing the knowledge base",
        })?;
        inner.insert(entry.signature, entry);
        Ok(())
    }

    fn entries(&self) -> MendResult<Vec<KnowledgeBaseEntry>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError {
            during: "reading the knowledge base",
        })?;
        Ok(inner.values().cloned().collect())
    }

    fn flush(&self) -> MendResult<()> {
        Ok(())
    }
}
