//! Entry Store
//!
//! The seam between the form panel and wherever entries live.
//!
//! - [`EntryStore`]: fetch / insert / subscribe for one category
//! - [`Subscription`]: change events for one category, released exactly once
//! - [`HostedStore`]: the hosted backend (row API + change feed)
//! - [`MemoryStore`]: an in-process store with the same semantics

mod hosted;
mod memory;

pub use hosted::HostedStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::backend::{BackendConfig, BackendError, RealtimeConfig};
use crate::entries::{Category, ChangeEvent, Entry, EntryDraft};

/// Storage operations the form panel relies on
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// All entries of `category`, newest first
    async fn fetch_entries(&self, category: Category) -> Result<Vec<Entry>, StoreError>;

    /// Insert a draft. Identifier and timestamp are assigned by the store.
    async fn insert_entry(&self, draft: EntryDraft) -> Result<(), StoreError>;

    /// Start receiving change events for `category` only
    async fn subscribe(&self, category: Category) -> Result<Subscription, StoreError>;
}

/// The hosted store, or an in-process one when `offline`
pub fn open(
    backend: &BackendConfig,
    realtime: &RealtimeConfig,
    offline: bool,
) -> Result<Arc<dyn EntryStore>, StoreError> {
    if offline {
        tracing::info!("Using in-process store");
        return Ok(Arc::new(MemoryStore::with_buffer(realtime.event_buffer)));
    }

    tracing::info!(url = %backend.url, table = %backend.table, "Using hosted store");
    Ok(Arc::new(HostedStore::new(backend.clone(), realtime.clone())?))
}

type Release = Box<dyn FnOnce() + Send>;

/// Live change events for one category
///
/// The release hook registered by the store runs exactly once: on
/// [`Subscription::unsubscribe`] or, failing that, on drop.
pub struct Subscription {
    category: Category,
    events: mpsc::Receiver<ChangeEvent>,
    release: Option<Release>,
}

impl Subscription {
    pub fn new(
        category: Category,
        events: mpsc::Receiver<ChangeEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            category,
            events,
            release: Some(Box::new(release)),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Wait for the next event. `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Next already-delivered event, if any
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Stop the feed
    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(category = %self.category, "Releasing subscription");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("category", &self.category)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Errors surfaced to the panel
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Store closed")]
    Closed,

    #[error("{0}")]
    Rejected(String),
}
