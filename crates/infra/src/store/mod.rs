//! Document store boundary.
//!
//! The inventory is kept in one collection of a document database, one
//! document per item keyed by item name. This module defines that boundary
//! without assuming a particular backend.

pub mod firestore;
pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{Document, DocumentStore, FieldFilter, Fields, StoreError, WriteMode};
