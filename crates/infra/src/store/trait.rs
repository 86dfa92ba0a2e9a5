use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use stockroom_core::{Precondition, Revision};

/// Field map of a single document.
pub type Fields = serde_json::Map<String, JsonValue>;

/// A document as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
    /// Revision assigned by the store on the last write.
    pub revision: Revision,
}

/// Equality filter on a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: JsonValue,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.equals)
    }
}

/// How `set` treats fields not mentioned in the write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document.
    Replace,
    /// Update only the given fields; creates the document when absent.
    Merge,
}

/// Document store operation error.
///
/// ## Error Categories
///
/// - **Unavailable**: the remote call failed, timed out, or returned an unexpected status
/// - **PreconditionFailed**: a write precondition did not hold (stale revision, existence)
/// - **Codec**: a document could not be encoded/decoded at the wire level
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("codec error: {0}")]
    Codec(String),
}

/// Key/document store over a single logical collection.
///
/// ## Semantics
///
/// - `get` returns `None` for an absent key.
/// - `list` returns every document, or only those matching the filter, in
///   whatever order the backend yields.
/// - `set` checks the precondition, applies the write and returns the new revision.
/// - `delete` of an absent key is not an error (unless the precondition requires existence).
///
/// There is no cross-document atomicity and no retry; implementations report
/// transport failures as [`StoreError::Unavailable`].
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError>;

    async fn list(&self, filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError>;

    async fn set(
        &self,
        key: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<Revision, StoreError>;

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(key).await
    }

    async fn list(&self, filter: Option<&FieldFilter>) -> Result<Vec<Document>, StoreError> {
        (**self).list(filter).await
    }

    async fn set(
        &self,
        key: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<Revision, StoreError> {
        (**self).set(key, fields, mode, precondition).await
    }

    async fn delete(&self, key: &str, precondition: Precondition) -> Result<(), StoreError> {
        (**self).delete(key, precondition).await
    }
}
