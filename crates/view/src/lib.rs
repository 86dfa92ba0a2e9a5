//! `stockroom-view`
//!
//! **Responsibility:** the state behind an inventory screen, independent of
//! any UI toolkit.
//!
//! This crate provides:
//! - `ViewState`: one immutable value holding list, filter, search text and form fields
//! - `ViewAction`: the discrete transitions that produce the next `ViewState`
//! - `InventoryController`: runs user intents against the access module and refreshes the list
//!
//! Rendering is left to whatever shell embeds it.

pub mod controller;
pub mod state;

pub use controller::InventoryController;
pub use state::{AddForm, AddSubmission, EditForm, ViewAction, ViewState, display_name, parse_quantity};
