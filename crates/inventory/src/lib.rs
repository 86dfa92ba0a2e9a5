//! Inventory domain module.
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). The infra layer
//! decides *what* to read and write; this crate decides what a quantity
//! change means for a record.

pub mod category;
pub mod item;
pub mod stock;

pub use category::{Category, CategoryFilter};
pub use item::{InventoryItem, ItemDetails, ItemName, ItemRecord, MetadataPatch};
pub use stock::{QuantityChange, StockOutcome};
