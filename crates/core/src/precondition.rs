//! Optimistic concurrency primitives for document writes.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Opaque, store-assigned token identifying one version of a document.
///
/// Stores are free to choose the representation (a counter, a commit
/// timestamp); callers only ever compare revisions for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Revision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expectation about the current state of a document, checked by the store
/// before a write is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Precondition {
    /// Skip checking (last write wins).
    #[default]
    Any,
    /// The document must exist, at any revision.
    MustExist,
    /// The document must not exist yet.
    MustNotExist,
    /// The document must exist at exactly this revision.
    Revision(Revision),
}

impl Precondition {
    /// Whether the precondition holds given the document's current revision
    /// (`None` when the document is absent).
    pub fn matches(&self, current: Option<&Revision>) -> bool {
        match self {
            Precondition::Any => true,
            Precondition::MustExist => current.is_some(),
            Precondition::MustNotExist => current.is_none(),
            Precondition::Revision(expected) => current == Some(expected),
        }
    }

    pub fn check(&self, current: Option<&Revision>) -> DomainResult<()> {
        if self.matches(current) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "precondition failed (expected: {self:?}, actual: {current:?})"
            )))
        }
    }

    /// Precondition pinning a write to the revision just read, or to absence
    /// when nothing was read.
    pub fn from_read(current: Option<&Revision>) -> Self {
        match current {
            Some(rev) => Precondition::Revision(rev.clone()),
            None => Precondition::MustNotExist,
        }
    }
}
