//! Application Shell
//!
//! Two tabs, one per category. Only the active tab's panel is mounted;
//! switching tabs disposes the old panel (releasing its subscription) and
//! mounts a fresh one.

use std::sync::Arc;

use crate::entries::Category;
use crate::panel::FormPanel;
use crate::store::EntryStore;

/// Heading shown above the tabs
pub const APP_TITLE: &str = "Daily Tasks";

/// Line under the heading
pub const APP_SUBTITLE: &str = "Update Your Daily Work Here";

pub struct AppShell {
    store: Arc<dyn EntryStore>,
    panel: FormPanel,
}

impl AppShell {
    /// Start on the first tab
    pub async fn start(store: Arc<dyn EntryStore>) -> Self {
        Self::start_on(store, Category::default()).await
    }

    pub async fn start_on(store: Arc<dyn EntryStore>, category: Category) -> Self {
        let panel = FormPanel::mount(Arc::clone(&store), category, category.title()).await;
        Self { store, panel }
    }

    pub fn active(&self) -> Category {
        self.panel.category()
    }

    pub fn tabs(&self) -> &'static [Category] {
        Category::all()
    }

    pub fn panel(&self) -> &FormPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut FormPanel {
        &mut self.panel
    }

    /// Activate `category`'s tab. Returns `false` if it was already active.
    ///
    /// The previous panel's draft and list are discarded with it.
    pub async fn switch_to(&mut self, category: Category) -> bool {
        if category == self.active() {
            return false;
        }

        tracing::info!(from = %self.active(), to = %category, "Switching tab");

        // Old feed goes first so the two categories never overlap
        self.panel.unsubscribe();
        let next = FormPanel::mount(Arc::clone(&self.store), category, category.title()).await;
        let previous = std::mem::replace(&mut self.panel, next);
        previous.dispose();
        true
    }

    /// Dispose the active panel
    pub fn shutdown(self) {
        self.panel.dispose();
    }
}
