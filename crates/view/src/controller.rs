//! Runs user intents against the inventory access module.
//!
//! Every mutating intent is followed by a fresh list with the current filter,
//! so the state always shows what the store holds. Failures are logged and
//! returned; the state keeps whatever it had before the failed call.

use stockroom_infra::{DocumentStore, InventoryAccess, InventoryError};
use stockroom_inventory::{CategoryFilter, ItemName, StockOutcome};

use crate::state::{ViewAction, ViewState};

pub struct InventoryController<S> {
    access: InventoryAccess<S>,
    state: ViewState,
}

impl<S> InventoryController<S>
where
    S: DocumentStore,
{
    pub fn new(access: InventoryAccess<S>) -> Self {
        Self {
            access,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn access(&self) -> &InventoryAccess<S> {
        &self.access
    }

    /// Apply a purely local transition (typing, opening/closing forms).
    pub fn dispatch(&mut self, action: ViewAction) {
        self.state = std::mem::take(&mut self.state).apply(action);
    }

    /// Re-fetch the list for the current filter.
    pub async fn refresh(&mut self) -> Result<(), InventoryError> {
        let items = self
            .access
            .list(self.state.filter())
            .await
            .inspect_err(|err| tracing::error!("failed to refresh inventory: {err}"))?;
        self.dispatch(ViewAction::ItemsLoaded(items));
        Ok(())
    }

    pub async fn set_filter(&mut self, filter: CategoryFilter) -> Result<(), InventoryError> {
        self.dispatch(ViewAction::SetFilter(filter));
        self.refresh().await
    }

    /// Submit the add form. The form is cleared and closed either way; a blank
    /// name submits nothing and returns `None`.
    pub async fn submit_add(&mut self) -> Result<Option<StockOutcome>, InventoryError> {
        let submission = self.state.add_form().submission();
        self.dispatch(ViewAction::AddSubmitted);

        let Some(submission) = submission else {
            tracing::debug!("add form submitted without a name; ignoring");
            return Ok(None);
        };

        let outcome = self
            .access
            .add(&submission.name, submission.quantity, submission.category)
            .await
            .inspect_err(|err| tracing::error!(item = %submission.name, "failed to add item: {err}"))?;
        self.refresh().await?;
        Ok(Some(outcome))
    }

    pub async fn increment(&mut self, name: &ItemName) -> Result<StockOutcome, InventoryError> {
        let outcome = self
            .access
            .increment_quantity(name)
            .await
            .inspect_err(|err| tracing::error!(item = %name, "failed to increment: {err}"))?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub async fn decrement(&mut self, name: &ItemName) -> Result<StockOutcome, InventoryError> {
        let outcome = self
            .access
            .decrement_quantity(name)
            .await
            .inspect_err(|err| tracing::error!(item = %name, "failed to decrement: {err}"))?;
        self.refresh().await?;
        Ok(outcome)
    }

    pub async fn delete(&mut self, name: &ItemName) -> Result<(), InventoryError> {
        self.access
            .remove(name)
            .await
            .inspect_err(|err| tracing::error!(item = %name, "failed to delete: {err}"))?;
        self.refresh().await
    }

    /// Load an item's details into the edit form. Returns `false` (and leaves
    /// the form closed) when the item no longer exists.
    pub async fn open_edit(&mut self, name: &ItemName) -> Result<bool, InventoryError> {
        let details = self
            .access
            .get_details(name)
            .await
            .inspect_err(|err| tracing::error!(item = %name, "failed to load details: {err}"))?;

        match details {
            Some(details) => {
                self.dispatch(ViewAction::EditOpened {
                    name: name.clone(),
                    details,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save the open edit form, close it, and refresh. No-op when no form is open.
    pub async fn save_edit(&mut self) -> Result<(), InventoryError> {
        let Some(form) = self.state.edit_form().cloned() else {
            return Ok(());
        };

        self.access
            .update_metadata(&form.name, &form.patch())
            .await
            .inspect_err(|err| tracing::error!(item = %form.name, "failed to save details: {err}"))?;
        self.dispatch(ViewAction::CloseEdit);
        self.refresh().await
    }
}
