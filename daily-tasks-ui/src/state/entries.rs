//! Entry State
//!
//! Reactive list of one category's entries, kept live by the change feed.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use daily_tasks::{Category, EntryList};

use super::backlog::EventBacklog;
use super::feed::ChangeFeed;
use crate::api;

/// Signals behind one category's table
#[derive(Clone, Copy)]
pub struct FormEntries {
    pub entries: RwSignal<EntryList>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

/// Subscribe to `category`, then load its entries.
///
/// Events that arrive before the fetch settles are held back and applied on
/// top of the fetched rows. The subscription is dropped with the owning
/// component.
pub fn use_form_entries(category: Category) -> FormEntries {
    let state = FormEntries {
        entries: create_rw_signal(EntryList::new()),
        loading: create_rw_signal(true),
        error: create_rw_signal(None),
    };
    let settings = api::settings();

    let backlog = Rc::new(RefCell::new(EventBacklog::new()));

    let held = Rc::clone(&backlog);
    let feed = ChangeFeed::connect(&settings, category, move |event| {
        let passed = held.borrow_mut().hold(event);
        if let Some(event) = passed {
            state.entries.update(|list| list.apply(event));
        }
    });

    match feed {
        Ok(feed) => on_cleanup(move || drop(feed)),
        Err(e) => {
            web_sys::console::error_1(&e.clone().into());
            state.error.set(Some(e));
        }
    }

    spawn_local(async move {
        let rows = match api::fetch_entries(&settings, category).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to fetch entries: {}", e).into());
                state.error.set(Some(e));
                None
            }
        };

        state.entries.update(|list| {
            backlog.borrow_mut().settle(list, rows);
        });
        state.loading.set(false);
    });

    state
}
