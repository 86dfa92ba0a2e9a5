//! Quantity arithmetic.
//!
//! A [`QuantityChange`] is decided against the quantity currently stored (if
//! any) and yields a [`StockOutcome`] describing the single write to perform.
//! A zero quantity is never produced: reaching zero means removal.

use stockroom_core::{DomainError, DomainResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// Add stock, creating the item when it does not exist.
    Add(u32),
    Increment,
    Decrement,
}

/// The write a [`QuantityChange`] resolves to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockOutcome {
    /// Nothing to write.
    Unchanged,
    /// Create a new record with this quantity.
    Create(u32),
    /// Merge this quantity into the existing record.
    Set(u32),
    /// Delete the record.
    Remove,
}

impl QuantityChange {
    /// Decide the outcome given the currently stored quantity (`None` when the
    /// item does not exist).
    pub fn resolve(self, current: Option<u32>) -> DomainResult<StockOutcome> {
        let outcome = match (self, current) {
            (QuantityChange::Add(0), None) => StockOutcome::Unchanged,
            (QuantityChange::Add(n), None) => StockOutcome::Create(n),
            (QuantityChange::Add(n), Some(q)) => match q.checked_add(n) {
                // Adding nothing to an unstocked record leaves it (and its metadata) alone.
                Some(0) => StockOutcome::Unchanged,
                Some(total) => StockOutcome::Set(total),
                None => {
                    return Err(DomainError::invariant(format!(
                        "quantity overflow ({q} + {n})"
                    )));
                }
            },
            (QuantityChange::Increment | QuantityChange::Decrement, None) => StockOutcome::Unchanged,
            (QuantityChange::Increment, Some(q)) => match q.checked_add(1) {
                Some(total) => StockOutcome::Set(total),
                None => return Err(DomainError::invariant("quantity overflow")),
            },
            (QuantityChange::Decrement, Some(q)) if q > 1 => StockOutcome::Set(q - 1),
            (QuantityChange::Decrement, Some(_)) => StockOutcome::Remove,
        };
        Ok(outcome)
    }
}
