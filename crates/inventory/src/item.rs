use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Item name: the primary key of an item.
///
/// Case-sensitive and used verbatim as the document key; no trimming or
/// normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Persisted shape of an item: everything except the name, which is the key.
///
/// Absent optional fields are omitted from the document rather than written
/// as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub quantity: u32,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl ItemRecord {
    /// Record for a freshly added item: no metadata.
    pub fn new(quantity: u32, category: Category) -> Self {
        Self {
            quantity,
            category,
            description: None,
            price: None,
            supplier: None,
        }
    }

    pub fn into_item(self, name: ItemName) -> InventoryItem {
        InventoryItem {
            name,
            quantity: self.quantity,
            category: self.category,
            description: self.description,
            price: self.price,
            supplier: self.supplier,
        }
    }
}

/// One named, quantity-tracked inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: ItemName,
    pub quantity: u32,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl InventoryItem {
    pub fn has_metadata(&self) -> bool {
        self.description.is_some() || self.price.is_some() || self.supplier.is_some()
    }

    pub fn details(&self) -> ItemDetails {
        ItemDetails::from(self.metadata())
    }

    pub fn metadata(&self) -> MetadataPatch {
        MetadataPatch {
            description: self.description.clone(),
            price: self.price,
            supplier: self.supplier.clone(),
        }
    }
}

/// Merge write for the metadata fields.
///
/// `None` means "leave as is"; only supplied fields are written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.price.is_none() && self.supplier.is_none()
    }

    /// Field names this patch writes, in document order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(3);
        if self.description.is_some() {
            names.push("description");
        }
        if self.price.is_some() {
            names.push("price");
        }
        if self.supplier.is_some() {
            names.push("supplier");
        }
        names
    }
}

/// Metadata as shown in an edit form: absent fields become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemDetails {
    pub description: String,
    pub price: String,
    pub supplier: String,
}

impl From<MetadataPatch> for ItemDetails {
    fn from(value: MetadataPatch) -> Self {
        Self {
            description: value.description.unwrap_or_default(),
            price: value.price.map(|p| p.to_string()).unwrap_or_default(),
            supplier: value.supplier.unwrap_or_default(),
        }
    }
}
