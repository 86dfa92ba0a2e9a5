use thiserror::Error;

use stockroom_core::DomainError;
use stockroom_inventory::ItemName;

use crate::store::StoreError;

/// Inventory access error.
///
/// Store failures are passed through untouched as `StoreUnavailable`; nothing
/// at this layer retries them.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("item not found: {0}")]
    NotFound(ItemName),

    #[error("conflicting writes to {name}; gave up after {attempts} attempts")]
    Conflict { name: ItemName, attempts: u32 },

    #[error("malformed record {name}: {reason}")]
    MalformedRecord { name: ItemName, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl InventoryError {
    pub fn malformed(name: &ItemName, reason: impl core::fmt::Display) -> Self {
        Self::MalformedRecord {
            name: name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure came from the store itself rather than from the data.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
