//! View state and its transitions.

use stockroom_inventory::{
    Category, CategoryFilter, InventoryItem, ItemDetails, ItemName, MetadataPatch,
};

/// Fields of the "add item" form, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddForm {
    pub name: String,
    pub quantity: String,
    pub category: Option<Category>,
}

/// A validated add request, ready for the access module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubmission {
    pub name: ItemName,
    pub quantity: u32,
    pub category: Category,
}

impl AddForm {
    /// Coerce the form into a submission.
    ///
    /// A blank name yields `None`. The quantity goes through
    /// [`parse_quantity`]; a missing category becomes `Other`.
    pub fn submission(&self) -> Option<AddSubmission> {
        if self.name.trim().is_empty() {
            return None;
        }
        Some(AddSubmission {
            name: ItemName::new(self.name.clone()),
            quantity: parse_quantity(&self.quantity),
            category: self.category.unwrap_or(Category::Other),
        })
    }
}

/// Parse a quantity the way a loosely typed number field would: leading
/// digits count, anything after them is ignored, and a missing, zero or
/// negative number becomes 1.
pub fn parse_quantity(text: &str) -> u32 {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();
    if negative || digits.is_empty() {
        return 1;
    }
    match digits.parse::<u64>() {
        Ok(0) => 1,
        Ok(n) => u32::try_from(n).unwrap_or(u32::MAX),
        // Too many digits for u64.
        Err(_) => u32::MAX,
    }
}

/// Fields of the "edit details" form for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub name: ItemName,
    pub description: String,
    pub price: String,
    pub supplier: String,
}

impl EditForm {
    pub fn new(name: ItemName, details: ItemDetails) -> Self {
        Self {
            name,
            description: details.description,
            price: details.price,
            supplier: details.supplier,
        }
    }

    /// Description and supplier are always written; the price only when the
    /// text is a finite number.
    pub fn patch(&self) -> MetadataPatch {
        MetadataPatch {
            description: Some(self.description.clone()),
            price: self
                .price
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite()),
            supplier: Some(self.supplier.clone()),
        }
    }
}

/// Discrete transitions of [`ViewState`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    ItemsLoaded(Vec<InventoryItem>),
    SetFilter(CategoryFilter),
    SetSearch(String),
    OpenAdd,
    CloseAdd,
    SetAddName(String),
    SetAddQuantity(String),
    SetAddCategory(Category),
    /// The add form was submitted: clear it and close it.
    AddSubmitted,
    EditOpened { name: ItemName, details: ItemDetails },
    SetEditDescription(String),
    SetEditPrice(String),
    SetEditSupplier(String),
    CloseEdit,
}

/// Everything an inventory screen shows, as one value.
///
/// Never mutated in place: [`ViewState::apply`] consumes the state and returns
/// the next one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    items: Vec<InventoryItem>,
    filter: CategoryFilter,
    search: String,
    add_open: bool,
    add_form: AddForm,
    edit_form: Option<EditForm>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(self, action: ViewAction) -> Self {
        match action {
            ViewAction::ItemsLoaded(items) => Self { items, ..self },
            ViewAction::SetFilter(filter) => Self { filter, ..self },
            ViewAction::SetSearch(search) => Self { search, ..self },
            ViewAction::OpenAdd => Self {
                add_open: true,
                ..self
            },
            ViewAction::CloseAdd => Self {
                add_open: false,
                ..self
            },
            ViewAction::SetAddName(name) => Self {
                add_form: AddForm { name, ..self.add_form },
                ..self
            },
            ViewAction::SetAddQuantity(quantity) => Self {
                add_form: AddForm {
                    quantity,
                    ..self.add_form
                },
                ..self
            },
            ViewAction::SetAddCategory(category) => Self {
                add_form: AddForm {
                    category: Some(category),
                    ..self.add_form
                },
                ..self
            },
            ViewAction::AddSubmitted => Self {
                add_open: false,
                add_form: AddForm::default(),
                ..self
            },
            ViewAction::EditOpened { name, details } => Self {
                edit_form: Some(EditForm::new(name, details)),
                ..self
            },
            ViewAction::SetEditDescription(description) => {
                self.map_edit(|form| EditForm { description, ..form })
            }
            ViewAction::SetEditPrice(price) => self.map_edit(|form| EditForm { price, ..form }),
            ViewAction::SetEditSupplier(supplier) => {
                self.map_edit(|form| EditForm { supplier, ..form })
            }
            ViewAction::CloseEdit => Self {
                edit_form: None,
                ..self
            },
        }
    }

    /// Edit-form transitions are ignored while no edit form is open.
    fn map_edit(self, f: impl FnOnce(EditForm) -> EditForm) -> Self {
        Self {
            edit_form: self.edit_form.map(f),
            ..self
        }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_add_open(&self) -> bool {
        self.add_open
    }

    pub fn add_form(&self) -> &AddForm {
        &self.add_form
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit_form.as_ref()
    }

    /// Items whose name contains the search text, ignoring case.
    pub fn visible_items(&self) -> impl Iterator<Item = &InventoryItem> {
        let needle = self.search.to_lowercase();
        self.items
            .iter()
            .filter(move |item| item.name.as_str().to_lowercase().contains(&needle))
    }
}

/// Name as shown in the list: first character upper-cased.
pub fn display_name(name: &ItemName) -> String {
    let mut chars = name.as_str().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::ItemRecord;

    fn item(name: &str, quantity: u32, category: Category) -> InventoryItem {
        ItemRecord::new(quantity, category).into_item(ItemName::from(name))
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let state = ViewState::new()
            .apply(ViewAction::ItemsLoaded(vec![
                item("apple", 3, Category::Groceries),
                item("Pineapple", 1, Category::Groceries),
                item("Hammer", 2, Category::Tools),
            ]))
            .apply(ViewAction::SetSearch("APPLE".into()));

        let names: Vec<&str> = state.visible_items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "Pineapple"]);

        let state = state.apply(ViewAction::SetSearch(String::new()));
        assert_eq!(state.visible_items().count(), 3);
    }

    #[test]
    fn quantity_coercion() {
        assert_eq!(parse_quantity("5"), 5);
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity("3abc"), 3);
        assert_eq!(parse_quantity(""), 1);
        assert_eq!(parse_quantity("abc"), 1);
        assert_eq!(parse_quantity("0"), 1);
        assert_eq!(parse_quantity("-4"), 1);
        assert_eq!(parse_quantity("99999999999999999999999"), u32::MAX);
    }

    #[test]
    fn add_form_submission() {
        let state = ViewState::new()
            .apply(ViewAction::OpenAdd)
            .apply(ViewAction::SetAddName("Widget".into()))
            .apply(ViewAction::SetAddQuantity("x".into()));
        assert!(state.is_add_open());

        let submission = state.add_form().submission().unwrap();
        assert_eq!(submission.name, ItemName::from("Widget"));
        assert_eq!(submission.quantity, 1);
        assert_eq!(submission.category, Category::Other);

        let state = state.apply(ViewAction::SetAddCategory(Category::Tools));
        assert_eq!(state.add_form().submission().unwrap().category, Category::Tools);

        let state = state.apply(ViewAction::AddSubmitted);
        assert!(!state.is_add_open());
        assert_eq!(state.add_form(), &AddForm::default());
        assert!(state.add_form().submission().is_none());
    }

    #[test]
    fn edit_form_transitions_and_patch() {
        let details = ItemDetails {
            description: String::new(),
            price: "9.99".into(),
            supplier: "Acme".into(),
        };
        let state = ViewState::new()
            .apply(ViewAction::SetEditPrice("1".into()))
            .apply(ViewAction::EditOpened {
                name: ItemName::from("Widget"),
                details,
            });
        // The price set before the form opened was dropped.
        assert_eq!(state.edit_form().unwrap().price, "9.99");

        let state = state
            .apply(ViewAction::SetEditDescription("blue".into()))
            .apply(ViewAction::SetEditPrice("not a number".into()));
        let patch = state.edit_form().unwrap().patch();
        assert_eq!(patch.description.as_deref(), Some("blue"));
        assert_eq!(patch.supplier.as_deref(), Some("Acme"));
        assert_eq!(patch.price, None);

        let state = state.apply(ViewAction::SetEditPrice("12.5".into()));
        assert_eq!(state.edit_form().unwrap().patch().price, Some(12.5));

        let state = state.apply(ViewAction::CloseEdit);
        assert!(state.edit_form().is_none());
    }

    #[test]
    fn display_name_capitalizes_first_letter() {
        assert_eq!(display_name(&ItemName::from("widget")), "Widget");
        assert_eq!(display_name(&ItemName::from("éclair")), "Éclair");
        assert_eq!(display_name(&ItemName::from("")), "");
    }

    #[test]
    fn filter_transition_keeps_other_fields() {
        let state = ViewState::new()
            .apply(ViewAction::SetSearch("ham".into()))
            .apply(ViewAction::SetFilter(CategoryFilter::Only(Category::Tools)));
        assert_eq!(state.filter(), CategoryFilter::Only(Category::Tools));
        assert_eq!(state.search(), "ham");
    }
}
