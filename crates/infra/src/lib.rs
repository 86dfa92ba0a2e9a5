//! Infrastructure layer: document store adapters, configuration, and the
//! inventory access module built on top of them.

pub mod config;
pub mod inventory;
pub mod store;

mod integration_tests;

pub use config::{ConcurrencyMode, Config, FirestoreConfig, MissingItemPolicy};
pub use inventory::{AccessOptions, InventoryAccess, InventoryError};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError};
