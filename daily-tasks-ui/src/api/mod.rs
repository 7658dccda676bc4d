//! Backend Access
//!
//! Row API calls and connection settings.

pub mod client;

pub use client::{fetch_entries, insert_entry, settings, Settings};
