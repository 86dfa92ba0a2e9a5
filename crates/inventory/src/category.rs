//! Closed set of item categories and the list filter built on top of it.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;

/// Classification tag assigned to every item.
///
/// Persisted as its display string, so `OfficeSupplies` is stored as
/// `"Office Supplies"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Books,
    Clothing,
    Electronics,
    Entertainment,
    Furniture,
    Groceries,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    Tools,
    Other,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 10] = [
        Category::Books,
        Category::Clothing,
        Category::Electronics,
        Category::Entertainment,
        Category::Furniture,
        Category::Groceries,
        Category::OfficeSupplies,
        Category::PersonalCare,
        Category::Tools,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Books => "Books",
            Category::Clothing => "Clothing",
            Category::Electronics => "Electronics",
            Category::Entertainment => "Entertainment",
            Category::Furniture => "Furniture",
            Category::Groceries => "Groceries",
            Category::OfficeSupplies => "Office Supplies",
            Category::PersonalCare => "Personal Care",
            Category::Tools => "Tools",
            Category::Other => "Other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Parses the display string, ignoring ASCII case and surrounding
    /// whitespace. `office-supplies` and `office_supplies` are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown category: {s:?}")))
    }
}

/// Which items a list should contain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(*c),
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(value: Category) -> Self {
        CategoryFilter::Only(value)
    }
}

impl core::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => core::fmt::Display::fmt(c, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}
