//! UI Components
//!
//! Entry form and table for one category.

pub mod entries_table;
pub mod form_tab;

pub use entries_table::EntriesTable;
pub use form_tab::FormTab;
