//! In-Process Entry Store
//!
//! Keeps rows in memory and fans change events out to subscribers of the
//! row's category, the way the hosted change feed filters by category.
//! Used for offline runs and tests; `update_entry` / `delete_entry` stand in
//! for changes made by other clients.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{EntryStore, StoreError, Subscription};
use crate::entries::{Category, ChangeEvent, Entry, EntryDraft, EntryId};

/// Unique identifier for a subscriber
type SubscriberId = u64;

/// Default per-subscriber event buffer
const DEFAULT_BUFFER: usize = 256;

/// In-memory entry store
pub struct MemoryStore {
    inner: Arc<Shared>,
    buffer: usize,
}

#[derive(Default)]
struct Shared {
    /// Rows in insertion order
    rows: Mutex<Vec<Entry>>,
    /// Active subscribers: SubscriberId → (category, sender)
    subscribers: Mutex<HashMap<SubscriberId, (Category, mpsc::Sender<ChangeEvent>)>>,
    next_subscriber: AtomicU64,
    /// Insert calls seen, successful or not
    insert_calls: AtomicUsize,
    /// Error message every insert fails with, when set
    fail_inserts: Mutex<Option<String>>,
    /// Error message every fetch fails with, when set
    fail_fetches: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            inner: Arc::new(Shared::default()),
            buffer: buffer.max(1),
        }
    }

    /// Store pre-filled with rows (ids and timestamps are assigned)
    pub fn seeded(drafts: Vec<EntryDraft>) -> Self {
        let store = Self::new();
        {
            let mut rows = lock(&store.inner.rows);
            for draft in drafts {
                rows.push(Entry::from_draft(draft, Uuid::new_v4(), Utc::now()));
            }
        }
        store
    }

    /// Make every following insert fail with `message` (`None` to recover)
    pub fn fail_inserts(&self, message: Option<&str>) {
        *lock(&self.inner.fail_inserts) = message.map(str::to_string);
    }

    /// Make every following fetch fail with `message` (`None` to recover)
    pub fn fail_fetches(&self, message: Option<&str>) {
        *lock(&self.inner.fail_fetches) = message.map(str::to_string);
    }

    pub fn insert_calls(&self) -> usize {
        self.inner.insert_calls.load(Ordering::SeqCst)
    }

    /// Every stored row, any category, in insertion order
    pub fn rows(&self) -> Vec<Entry> {
        lock(&self.inner.rows).clone()
    }

    /// Number of live subscriptions for `category`
    pub fn subscriber_count(&self, category: Category) -> usize {
        lock(&self.inner.subscribers)
            .values()
            .filter(|(c, _)| *c == category)
            .count()
    }

    /// Replace the values of an existing row, as another client would.
    ///
    /// Category and identifier are kept. Returns `false` if no row has `id`.
    pub fn update_entry(
        &self,
        id: EntryId,
        referral_link: impl Into<String>,
        comment: impl Into<String>,
    ) -> bool {
        let updated = {
            let mut rows = lock(&self.inner.rows);
            let Some(row) = rows.iter_mut().find(|e| e.has_id(&id)) else {
                return false;
            };
            row.referral_link = referral_link.into();
            row.comment = comment.into();
            row.clone()
        };

        self.inner
            .publish(updated.category, ChangeEvent::Updated { entry: updated });
        true
    }

    /// Delete a row, as another client would. Returns `false` if no row has `id`.
    pub fn delete_entry(&self, id: EntryId) -> bool {
        let removed = {
            let mut rows = lock(&self.inner.rows);
            let Some(pos) = rows.iter().position(|e| e.has_id(&id)) else {
                return false;
            };
            rows.remove(pos)
        };

        self.inner
            .publish(removed.category, ChangeEvent::Deleted { id });
        true
    }
}

impl Shared {
    /// Send an event to every subscriber of `category`
    fn publish(&self, category: Category, event: ChangeEvent) {
        let mut subscribers = lock(&self.subscribers);
        let mut sent_count = 0;

        subscribers.retain(|id, (subscribed, sender)| {
            if *subscribed != category {
                return true;
            }
            match sender.try_send(event.clone()) {
                Ok(()) => {
                    sent_count += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = id, category = %category, "Subscriber buffer full, event dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });

        tracing::trace!(
            category = %category,
            kind = event.kind(),
            subscribers = sent_count,
            "Published change"
        );
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_entries(&self, category: Category) -> Result<Vec<Entry>, StoreError> {
        if let Some(message) = lock(&self.inner.fail_fetches).clone() {
            return Err(StoreError::Rejected(message));
        }

        let mut entries: Vec<Entry> = lock(&self.inner.rows)
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        // Stable sort keeps later inserts first on equal timestamps
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn insert_entry(&self, draft: EntryDraft) -> Result<(), StoreError> {
        self.inner.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = lock(&self.inner.fail_inserts).clone() {
            return Err(StoreError::Rejected(message));
        }

        let entry = Entry::from_draft(draft, Uuid::new_v4(), Utc::now());
        lock(&self.inner.rows).push(entry.clone());

        self.inner
            .publish(entry.category, ChangeEvent::Inserted { entry });
        Ok(())
    }

    async fn subscribe(&self, category: Category) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);
        lock(&self.inner.subscribers).insert(id, (category, tx));

        tracing::debug!(subscriber = id, category = %category, "Subscribed");

        let shared = Arc::clone(&self.inner);
        Ok(Subscription::new(category, rx, move || {
            lock(&shared.subscribers).remove(&id);
            tracing::debug!(subscriber = id, "Unsubscribed");
        }))
    }
}
