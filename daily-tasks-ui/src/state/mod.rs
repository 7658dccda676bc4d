//! State Management
//!
//! Per-category entry state and the change-feed connection behind it.

pub mod backlog;
pub mod entries;
pub mod feed;

pub use entries::{use_form_entries, FormEntries};
pub use feed::ChangeFeed;
