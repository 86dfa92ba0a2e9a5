use std::collections::BTreeMap;
use std::sync::RwLock;

use stockroom_core::{Precondition, Revision};

use super::r#trait::{Document, DocumentStore, FieldFilter, Fields, StoreError, WriteMode};

#[derive(Debug, Clone)]
struct Entry {
    fields: Fields,
    revision: u64,
}

#[derive(Debug, Default)]
struct Collection {
    docs: BTreeMap<String, Entry>,
    last_revision: u64,
}

impl Collection {
    fn current_revision(&self, key: &str) -> Option<Revision> {
        self.docs
            .get(key)
            .map(|e| Revision::new(e.revision.to_string()))
    }

    fn check(&self, key: &str, precondition: &Precondition) -> Result<(), StoreError> {
        precondition
            .check(self.current_revision(key).as_ref())
            .map_err(|e| StoreError::PreconditionFailed(format!("{key}: {e}")))
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. Revisions are a store-wide counter, so every write
/// produces a revision never seen before. Lists come back ordered by key.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Collection>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().map(|c| c.docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let collection = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(collection.docs.get(key).map(|e| Document {
            key: key.to_string(),
            fields: e.fields.clone(),
            revision: Revision::new(e.revision.to_string()),
        }))
    }

    async fn list(&self, filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError> {
        let collection = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(collection
            .docs
            .iter()
            .filter(|(_, e)| filter.is_none_or(|f| f.matches(&e.fields)))
            .map(|(k, e)| Document {
                key: k.clone(),
                fields: e.fields.clone(),
                revision: Revision::new(e.revision.to_string()),
            })
            .collect())
    }

    async fn set(
        &self,
        key: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<Revision, StoreError> {
        let mut collection = self.inner.write().map_err(|_| Self::poisoned())?;
        collection.check(key, &precondition)?;

        collection.last_revision += 1;
        let revision = collection.last_revision;

        match (mode, collection.docs.get_mut(key)) {
            (WriteMode::Merge, Some(entry)) => {
                entry.fields.extend(fields);
                entry.revision = revision;
            }
            _ => {
                collection
                    .docs
                    .insert(key.to_string(), Entry { fields, revision });
            }
        }

        Ok(Revision::new(revision.to_string()))
    }

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), StoreError> {
        let mut collection = self.inner.write().map_err(|_| Self::poisoned())?;
        collection.check(key, &precondition)?;
        collection.docs.remove(key);
        Ok(())
    }
}
