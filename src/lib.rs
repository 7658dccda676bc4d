//! # Daily Tasks
//!
//! Two-category daily entry form with a live-updating entry table. Entries
//! (date, referral link, comment) are kept by a hosted row store that also
//! streams insert/update/delete events per category.
//!
//! ## Modules
//!
//! - [`entries`]: entry model, draft validation, list reducer
//! - [`backend`]: hosted row API and change-feed clients
//! - [`store`]: the storage seam, hosted or in-process
//! - [`panel`]: one category's form and live table
//! - [`shell`]: tabs switching between the two panels
//! - [`render`]: terminal views
//! - [`config`]: TOML config, env overrides, logging setup
//!
//! Without the `native` feature only [`entries`] and the wire formats in
//! [`backend`] are built, for use from the browser front-end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daily_tasks::{AppShell, Field, MemoryStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let mut shell = AppShell::start(store).await;
//!
//!     let panel = shell.panel_mut();
//!     panel.set_field(Field::Date, "2024-05-01");
//!     panel.set_field(Field::ReferralLink, "https://github.com/tokio-rs/tokio");
//!     panel.set_field(Field::Comment, "Read the scheduler docs");
//!     panel.submit().await;
//!
//!     // The new row arrives through the change feed
//!     panel.recv_change().await;
//!     println!("{}", daily_tasks::render::render_shell(&shell));
//! }
//! ```

pub mod backend;
pub mod entries;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod panel;
#[cfg(feature = "native")]
pub mod render;
#[cfg(feature = "native")]
pub mod shell;
#[cfg(feature = "native")]
pub mod store;

// Re-export top-level types for convenience
pub use entries::{
    Category, CategoryParseError, ChangeEvent, Entry, EntryDraft, EntryId, EntryList, Field,
    FieldErrors, FormFields,
};

pub use backend::{BackendConfig, RealtimeConfig};

#[cfg(feature = "native")]
pub use backend::{BackendError, RealtimeClient, RestClient};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig};

#[cfg(feature = "native")]
pub use panel::{FormPanel, SubmitOutcome};

#[cfg(feature = "native")]
pub use shell::AppShell;

#[cfg(feature = "native")]
pub use store::{EntryStore, HostedStore, MemoryStore, StoreError, Subscription};
