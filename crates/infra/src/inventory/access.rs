//! Inventory access module.
//!
//! Wraps a [`DocumentStore`] and exposes the operations the view layer needs:
//! filtered listing, add-or-merge, increment/decrement, delete, and metadata
//! edits. It owns no state of its own; every call reads or writes the store,
//! and callers re-list after a mutation.
//!
//! ## Read-modify-write
//!
//! `add`, `increment_quantity` and `decrement_quantity` read the current
//! quantity and then write. Under [`ConcurrencyMode::CompareAndSwap`] the
//! write is pinned to the revision that was read and the whole read/decide/
//! write step is retried on conflict; under
//! [`ConcurrencyMode::LastWriteWins`] writes are unconditional and a
//! concurrent update can be lost.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use stockroom_core::{Precondition, Revision};
use stockroom_inventory::{
    Category, CategoryFilter, InventoryItem, ItemDetails, ItemName, ItemRecord, MetadataPatch,
    QuantityChange, StockOutcome,
};

use super::error::InventoryError;
use crate::config::{ConcurrencyMode, Config, MissingItemPolicy};
use crate::store::{Document, DocumentStore, FieldFilter, Fields, StoreError, WriteMode};

const QUANTITY_FIELD: &str = "quantity";
const CATEGORY_FIELD: &str = "category";

/// Behavioural knobs of [`InventoryAccess`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessOptions {
    pub concurrency: ConcurrencyMode,
    pub max_conflict_retries: u32,
    pub missing_item: MissingItemPolicy,
}

impl Default for AccessOptions {
    fn default() -> Self {
        AccessOptions::from(&Config::default())
    }
}

impl From<&Config> for AccessOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency,
            max_conflict_retries: config.max_conflict_retries,
            missing_item: config.missing_item,
        }
    }
}

impl AccessOptions {
    fn max_attempts(&self) -> u32 {
        match self.concurrency {
            ConcurrencyMode::CompareAndSwap => self.max_conflict_retries.saturating_add(1),
            ConcurrencyMode::LastWriteWins => 1,
        }
    }

    fn write_precondition(&self, read: Option<&Revision>) -> Precondition {
        match self.concurrency {
            ConcurrencyMode::CompareAndSwap => Precondition::from_read(read),
            ConcurrencyMode::LastWriteWins => Precondition::Any,
        }
    }
}

/// Data access for the inventory collection.
#[derive(Debug)]
pub struct InventoryAccess<S> {
    store: S,
    options: AccessOptions,
}

impl<S> InventoryAccess<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, AccessOptions::default())
    }

    pub fn with_options(store: S, options: AccessOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> InventoryAccess<S>
where
    S: DocumentStore,
{
    /// All items, or only those in the filter's category. Order is whatever
    /// the store yields. Records that do not decode are skipped.
    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<InventoryItem>, InventoryError> {
        let field_filter = filter
            .category()
            .map(|c| FieldFilter::equals(CATEGORY_FIELD, c.as_str()));
        let docs = self.store.list(field_filter.as_ref()).await?;
        let fetched = docs.len();

        let items: Vec<InventoryItem> = docs
            .into_iter()
            .filter_map(|doc| match decode_item(doc) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "skipping malformed inventory record");
                    None
                }
            })
            .filter(|item| filter.matches(item.category))
            .collect();

        debug!(%filter, fetched, returned = items.len(), "listed inventory");
        Ok(items)
    }

    /// Point read of one item.
    pub async fn get(&self, name: &ItemName) -> Result<Option<InventoryItem>, InventoryError> {
        self.store
            .get(name.as_str())
            .await?
            .map(decode_item)
            .transpose()
    }

    /// Metadata of one item for an edit form; absent fields are empty strings.
    /// `None` when the item does not exist.
    pub async fn get_details(&self, name: &ItemName) -> Result<Option<ItemDetails>, InventoryError> {
        let Some(mut doc) = self.store.get(name.as_str()).await? else {
            return Ok(None);
        };
        Ok(Some(ItemDetails::from(take_metadata(name, &mut doc.fields))))
    }

    /// Add stock. An existing item gets `quantity` added and its category
    /// overwritten; a new item is created with exactly `quantity` and
    /// `category` and no metadata.
    pub async fn add(
        &self,
        name: &ItemName,
        quantity: u32,
        category: Category,
    ) -> Result<StockOutcome, InventoryError> {
        self.change_quantity(name, QuantityChange::Add(quantity), Some(category))
            .await
    }

    /// +1. No-op when the item does not exist.
    pub async fn increment_quantity(&self, name: &ItemName) -> Result<StockOutcome, InventoryError> {
        self.change_quantity(name, QuantityChange::Increment, None).await
    }

    /// -1, deleting the item instead of storing zero. No-op when the item
    /// does not exist.
    pub async fn decrement_quantity(&self, name: &ItemName) -> Result<StockOutcome, InventoryError> {
        self.change_quantity(name, QuantityChange::Decrement, None).await
    }

    /// Delete unconditionally. Deleting an absent item is not an error.
    pub async fn remove(&self, name: &ItemName) -> Result<(), InventoryError> {
        self.store.delete(name.as_str(), Precondition::Any).await?;
        info!(item = %name, "item removed");
        Ok(())
    }

    /// Merge the supplied metadata fields; quantity and category are never
    /// touched. A nonexistent item is handled per [`MissingItemPolicy`].
    pub async fn update_metadata(
        &self,
        name: &ItemName,
        patch: &MetadataPatch,
    ) -> Result<(), InventoryError> {
        let policy = self.options.missing_item;

        if patch.is_empty() {
            if policy == MissingItemPolicy::Fail && self.store.get(name.as_str()).await?.is_none() {
                return Err(InventoryError::NotFound(name.clone()));
            }
            return Ok(());
        }

        let precondition = match policy {
            MissingItemPolicy::Fail => Precondition::MustExist,
            MissingItemPolicy::CreateBare => Precondition::Any,
        };
        let fields = to_fields(name, patch)?;

        match self
            .store
            .set(name.as_str(), fields, WriteMode::Merge, precondition)
            .await
        {
            Ok(_) => {
                info!(item = %name, fields = ?patch.field_names(), "metadata updated");
                Ok(())
            }
            Err(StoreError::PreconditionFailed(_)) => Err(InventoryError::NotFound(name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn change_quantity(
        &self,
        name: &ItemName,
        change: QuantityChange,
        category: Option<Category>,
    ) -> Result<StockOutcome, InventoryError> {
        let key = name.as_str();
        let max_attempts = self.options.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let current = self.store.get(key).await?;
            let revision = current.as_ref().map(|doc| &doc.revision);
            // A metadata-only record gains stock through `add` alone; to
            // increment and decrement it does not exist yet.
            let quantity = match &current {
                Some(doc) if is_stocked(doc) || matches!(change, QuantityChange::Add(_)) => {
                    Some(stored_quantity(name, doc)?)
                }
                _ => None,
            };

            let outcome = change.resolve(quantity)?;
            let precondition = self.options.write_precondition(revision);

            let written = match outcome {
                StockOutcome::Unchanged => {
                    debug!(item = %name, ?change, "nothing to write");
                    return Ok(outcome);
                }
                StockOutcome::Create(q) => self
                    .store
                    .set(key, quantity_fields(q, category), WriteMode::Replace, precondition)
                    .await
                    .map(|_| ()),
                StockOutcome::Set(q) => self
                    .store
                    .set(key, quantity_fields(q, category), WriteMode::Merge, precondition)
                    .await
                    .map(|_| ()),
                StockOutcome::Remove => self.store.delete(key, precondition).await,
            };

            match written {
                Ok(()) => {
                    info!(item = %name, ?change, ?outcome, category = ?category, "quantity changed");
                    return Ok(outcome);
                }
                Err(StoreError::PreconditionFailed(reason)) if attempt < max_attempts => {
                    warn!(item = %name, attempt, %reason, "concurrent write detected; retrying");
                }
                Err(StoreError::PreconditionFailed(_)) => {
                    return Err(InventoryError::Conflict {
                        name: name.clone(),
                        attempts: attempt,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Decode a stocked record. Quantity and category must be valid; metadata is
/// decoded leniently by [`take_metadata`].
fn decode_item(doc: Document) -> Result<InventoryItem, InventoryError> {
    let name = ItemName::new(doc.key);
    let mut fields = doc.fields;
    let metadata = take_metadata(&name, &mut fields);
    let record = serde_json::from_value::<ItemRecord>(JsonValue::Object(fields))
        .map_err(|e| InventoryError::malformed(&name, e))?;

    Ok(InventoryItem {
        description: metadata.description,
        price: metadata.price,
        supplier: metadata.supplier,
        ..record.into_item(name)
    })
}

/// Remove and decode the metadata fields one by one. A field of the wrong
/// type is dropped with a warning instead of failing the whole record; a
/// price saved as text is parsed, and a blank one counts as absent.
fn take_metadata(name: &ItemName, fields: &mut Fields) -> MetadataPatch {
    MetadataPatch {
        description: take_text(name, fields, "description"),
        price: take_price(name, fields),
        supplier: take_text(name, fields, "supplier"),
    }
}

fn take_text(name: &ItemName, fields: &mut Fields, field: &str) -> Option<String> {
    match fields.remove(field)? {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text),
        other => {
            warn!(item = %name, field, value = %other, "ignoring malformed metadata field");
            None
        }
    }
}

fn take_price(name: &ItemName, fields: &mut Fields) -> Option<f64> {
    let price = match fields.remove("price")? {
        JsonValue::Null => return None,
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(text) if text.trim().is_empty() => return None,
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    let price = price.filter(|p| p.is_finite());
    if price.is_none() {
        warn!(item = %name, "ignoring malformed price");
    }
    price
}

/// Whether the record carries stock: both a quantity and a category.
fn is_stocked(doc: &Document) -> bool {
    [QUANTITY_FIELD, CATEGORY_FIELD]
        .iter()
        .all(|field| doc.fields.get(*field).is_some_and(|v| !v.is_null()))
}

/// Quantity currently stored. A record without a quantity (metadata written
/// before any stock) counts as zero.
fn stored_quantity(name: &ItemName, doc: &Document) -> Result<u32, InventoryError> {
    match doc.fields.get(QUANTITY_FIELD) {
        None | Some(JsonValue::Null) => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| InventoryError::malformed(name, format!("invalid quantity {value}"))),
    }
}

fn quantity_fields(quantity: u32, category: Option<Category>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(QUANTITY_FIELD.to_string(), JsonValue::from(quantity));
    if let Some(category) = category {
        fields.insert(
            CATEGORY_FIELD.to_string(),
            JsonValue::String(category.as_str().to_string()),
        );
    }
    fields
}

fn to_fields<T: Serialize>(name: &ItemName, value: &T) -> Result<Fields, InventoryError> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(InventoryError::malformed(name, format!("expected a field map, got {other}"))),
        Err(e) => Err(InventoryError::malformed(name, e)),
    }
}
