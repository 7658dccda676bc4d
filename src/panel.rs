//! Form Panel
//!
//! One category's entry form plus its live entry table.
//!
//! The panel owns its list and is the only thing that mutates it. New
//! entries show up through the subscription, never through the insert call.

use std::sync::Arc;

use crate::entries::{
    Category, ChangeEvent, EntryDraft, EntryList, Field, FieldErrors, FormFields,
};
use crate::store::{EntryStore, StoreError, Subscription};

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store accepted the entry; the form was cleared
    Submitted,
    /// Validation failed; see [`FormPanel::field_errors`]
    Invalid,
    /// The store rejected the entry; see [`FormPanel::error`]
    Failed,
    /// A submission is already in flight
    Busy,
}

/// Form and entry table for one category
pub struct FormPanel {
    category: Category,
    title: String,
    store: Arc<dyn EntryStore>,
    fields: FormFields,
    field_errors: FieldErrors,
    entries: EntryList,
    loading: bool,
    submitting: bool,
    error: Option<String>,
    subscription: Option<Subscription>,
}

impl FormPanel {
    /// Subscribe to the category's changes, then load its entries.
    ///
    /// Failures are shown in the panel's error banner rather than returned.
    /// Events that arrive while the fetch is in flight are queued and applied
    /// after the fetched rows, so an entry inserted in that window can show
    /// up twice.
    pub async fn mount(
        store: Arc<dyn EntryStore>,
        category: Category,
        title: impl Into<String>,
    ) -> Self {
        let mut panel = Self {
            category,
            title: title.into(),
            store,
            fields: FormFields::default(),
            field_errors: FieldErrors::default(),
            entries: EntryList::new(),
            loading: true,
            submitting: false,
            error: None,
            subscription: None,
        };

        match panel.store.subscribe(category).await {
            Ok(subscription) => panel.subscription = Some(subscription),
            Err(e) => {
                tracing::error!(category = %category, error = %e, "Failed to subscribe to changes");
                panel.error = Some(e.to_string());
            }
        }

        panel.refresh().await;
        tracing::info!(
            category = %category,
            store = panel.store.name(),
            entries = panel.entries.len(),
            "Panel mounted"
        );
        panel
    }

    /// Reload the list from the store
    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.store.fetch_entries(self.category).await {
            Ok(entries) => self.entries.replace_all(entries),
            Err(e) => {
                tracing::error!(category = %self.category, error = %e, "Failed to fetch entries");
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The store this panel reads from and writes to
    pub fn store(&self) -> Arc<dyn EntryStore> {
        Arc::clone(&self.store)
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// List-level error banner
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Edit one field; clears that field's error message
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
        self.field_errors.clear_field(field);
    }

    /// Validate and submit the draft.
    ///
    /// Invalid drafts never reach the store. The draft is cleared once the
    /// store has been called, whether or not the insert succeeded.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let draft = match self.begin_submit() {
            Ok(draft) => draft,
            Err(outcome) => return outcome,
        };
        let result = self.store.insert_entry(draft).await;
        self.finish_submit(result)
    }

    /// First half of [`submit`](Self::submit): validate and mark the panel
    /// as submitting.
    ///
    /// The caller inserts the returned draft through [`store`](Self::store)
    /// and hands the result to [`finish_submit`](Self::finish_submit), so the
    /// panel can be drawn while the insert is in flight.
    pub fn begin_submit(&mut self) -> Result<EntryDraft, SubmitOutcome> {
        if self.submitting {
            return Err(SubmitOutcome::Busy);
        }

        let draft = match self.fields.validate(self.category) {
            Ok(draft) => draft,
            Err(errors) => {
                tracing::debug!(category = %self.category, errors = %errors, "Draft rejected");
                self.field_errors = errors;
                return Err(SubmitOutcome::Invalid);
            }
        };
        self.field_errors.clear();
        self.submitting = true;
        Ok(draft)
    }

    /// Record the store's answer to a submission started with
    /// [`begin_submit`](Self::begin_submit)
    pub fn finish_submit(&mut self, result: Result<(), StoreError>) -> SubmitOutcome {
        self.submitting = false;
        self.fields.clear();

        match result {
            Ok(()) => {
                tracing::info!(category = %self.category, "Entry submitted");
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::error!(category = %self.category, error = %e, "Failed to submit entry");
                self.error = Some(e.to_string());
                SubmitOutcome::Failed
            }
        }
    }

    /// Apply one change event to the list
    pub fn apply_change(&mut self, event: ChangeEvent) {
        tracing::debug!(category = %self.category, kind = event.kind(), "Applying change");
        self.entries.apply(event);
    }

    /// Wait for the next change event and apply it.
    ///
    /// Never completes once the feed has ended, so it can sit in a
    /// `select!` next to user input.
    pub async fn recv_change(&mut self) {
        let event = match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => std::future::pending().await,
        };

        match event {
            Some(event) => self.apply_change(event),
            None => {
                tracing::warn!(category = %self.category, "Change feed ended");
                self.subscription = None;
            }
        }
    }

    /// Apply every event that has already been delivered; returns how many
    pub fn drain_changes(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.apply_change(event);
            applied += 1;
        }
        applied
    }

    /// Stop listening for changes; the list stays as it is
    pub fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Tear the panel down, releasing its subscription
    pub fn dispose(mut self) {
        self.unsubscribe();
        tracing::info!(category = %self.category, "Panel disposed");
    }
}

impl std::fmt::Debug for FormPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormPanel")
            .field("category", &self.category)
            .field("entries", &self.entries.len())
            .field("loading", &self.loading)
            .field("submitting", &self.submitting)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fill(panel: &mut FormPanel) {
        panel.set_field(Field::Date, "2024-04-10");
        panel.set_field(Field::ReferralLink, "https://github.com/serde-rs/serde");
        panel.set_field(Field::Comment, "Derive docs");
    }

    #[tokio::test]
    async fn test_mount_loads_entries() {
        let store = Arc::new(MemoryStore::new());
        let mut seed = FormFields::default();
        seed.set(Field::Date, "2024-01-01");
        seed.set(Field::ReferralLink, "https://youtube.com");
        seed.set(Field::Comment, "seed");
        store
            .insert_entry(seed.validate(Category::Vishnu).unwrap())
            .await
            .unwrap();

        let panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;
        assert!(!panel.is_loading());
        assert!(panel.is_subscribed());
        assert_eq!(panel.entries().len(), 1);
        assert_eq!(store.subscriber_count(Category::Vishnu), 1);
    }

    #[tokio::test]
    async fn test_invalid_submit_never_reaches_store() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;

        panel.set_field(Field::ReferralLink, "not a url");
        assert_eq!(panel.submit().await, SubmitOutcome::Invalid);
        assert_eq!(store.insert_calls(), 0);

        let errors = panel.field_errors();
        assert_eq!(errors.get(Field::Date), Some("Date is required"));
        assert_eq!(errors.get(Field::ReferralLink), Some("Please enter a valid URL"));
        assert_eq!(errors.get(Field::Comment), Some("Comment is required"));
        // The draft is kept so the user can fix it
        assert_eq!(panel.fields().referral_link, "not a url");
    }

    #[tokio::test]
    async fn test_editing_clears_that_fields_error() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = FormPanel::mount(store, Category::Krishna, "Krishna").await;

        panel.submit().await;
        assert_eq!(panel.field_errors().len(), 3);

        panel.set_field(Field::Comment, "x");
        assert!(panel.field_errors().get(Field::Comment).is_none());
        assert!(panel.field_errors().get(Field::Date).is_some());
    }

    #[tokio::test]
    async fn test_submit_clears_form_and_list_updates_via_feed() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = FormPanel::mount(store.clone(), Category::Krishna, "Krishna").await;

        fill(&mut panel);
        assert_eq!(panel.submit().await, SubmitOutcome::Submitted);
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(panel.fields(), &FormFields::default());
        assert!(panel.field_errors().is_empty());

        // Nothing is inserted optimistically
        assert!(panel.entries().is_empty());
        assert_eq!(panel.drain_changes(), 1);

        let entry = &panel.entries().entries()[0];
        assert_eq!(entry.category, Category::Krishna);
        assert_eq!(entry.comment, "Derive docs");
    }

    #[tokio::test]
    async fn test_failed_insert_sets_banner_and_drops_draft() {
        let store = Arc::new(MemoryStore::new());
        store.fail_inserts(Some("permission denied for table form_entries"));
        let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;

        fill(&mut panel);
        assert_eq!(panel.submit().await, SubmitOutcome::Failed);
        assert_eq!(panel.error(), Some("permission denied for table form_entries"));
        assert_eq!(panel.fields(), &FormFields::default());
        assert!(!panel.is_submitting());
        assert_eq!(panel.drain_changes(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;

        fill(&mut panel);
        let draft = panel.begin_submit().unwrap();
        assert!(panel.is_submitting());
        assert_eq!(panel.begin_submit(), Err(SubmitOutcome::Busy));
        assert_eq!(panel.submit().await, SubmitOutcome::Busy);
        assert_eq!(store.insert_calls(), 0);

        let result = panel.store().insert_entry(draft).await;
        assert_eq!(panel.finish_submit(result), SubmitOutcome::Submitted);
        assert!(!panel.is_submitting());
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(panel.fields(), &FormFields::default());
    }

    #[tokio::test]
    async fn test_invalid_begin_leaves_panel_idle() {
        let store = Arc::new(MemoryStore::new());
        let mut panel = FormPanel::mount(store, Category::Krishna, "Krishna").await;

        assert_eq!(panel.begin_submit(), Err(SubmitOutcome::Invalid));
        assert!(!panel.is_submitting());
        assert_eq!(panel.field_errors().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_banner() {
        let store = Arc::new(MemoryStore::new());
        store.fail_fetches(Some("connection reset"));

        let panel = FormPanel::mount(store, Category::Vishnu, "Vishnu").await;
        assert_eq!(panel.error(), Some("connection reset"));
        assert!(panel.entries().is_empty());
        assert!(!panel.is_loading());
    }

    #[tokio::test]
    async fn test_dispose_releases_subscription() {
        let store = Arc::new(MemoryStore::new());
        let panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;
        assert_eq!(store.subscriber_count(Category::Vishnu), 1);

        panel.dispose();
        assert_eq!(store.subscriber_count(Category::Vishnu), 0);
    }
}
