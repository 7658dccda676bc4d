//! Store backed by the hosted row API and change feed

use async_trait::async_trait;

use super::{EntryStore, StoreError, Subscription};
use crate::backend::{BackendConfig, RealtimeClient, RealtimeConfig, RestClient};
use crate::entries::{Category, Entry, EntryDraft};

/// Entries kept by the hosted backend
pub struct HostedStore {
    rest: RestClient,
    realtime: RealtimeClient,
}

impl HostedStore {
    pub fn new(backend: BackendConfig, realtime: RealtimeConfig) -> Result<Self, StoreError> {
        let rest = RestClient::new(backend.clone())?;
        let realtime = RealtimeClient::new(backend, realtime);
        Ok(Self { rest, realtime })
    }
}

#[async_trait]
impl EntryStore for HostedStore {
    fn name(&self) -> &str {
        "hosted"
    }

    async fn fetch_entries(&self, category: Category) -> Result<Vec<Entry>, StoreError> {
        Ok(self.rest.fetch_entries(category).await?)
    }

    async fn insert_entry(&self, draft: EntryDraft) -> Result<(), StoreError> {
        Ok(self.rest.insert_entry(&draft).await?)
    }

    async fn subscribe(&self, category: Category) -> Result<Subscription, StoreError> {
        let (events, feed) = self.realtime.subscribe(category).await?;
        Ok(Subscription::new(category, events, move || feed.stop()))
    }
}
