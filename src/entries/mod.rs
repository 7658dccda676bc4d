//! Entry model
//!
//! - **types**: Category, Entry, EntryDraft
//! - **validation**: form fields and per-field error messages
//! - **list**: the displayed list and the change-event reducer
//!
//! This module has no runtime dependencies and is shared with the browser
//! front-end.

pub mod list;
pub mod types;
pub mod validation;

pub use list::{ChangeEvent, EntryList};
pub use types::{Category, CategoryParseError, Entry, EntryDraft, EntryId};
pub use validation::{Field, FieldErrors, FormFields, DATE_FORMAT};
