//! Inventory access: the data-access layer between the view and the store.

pub mod access;
pub mod error;

pub use access::{AccessOptions, InventoryAccess};
pub use error::InventoryError;
