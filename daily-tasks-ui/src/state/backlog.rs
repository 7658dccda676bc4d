//! Event Backlog
//!
//! Change events that arrive while a category's rows are still being
//! fetched are held here and replayed once the fetch settles.

use daily_tasks::{ChangeEvent, Entry, EntryList};

/// Holds change events until the initial fetch settles
#[derive(Debug)]
pub struct EventBacklog {
    queued: Option<Vec<ChangeEvent>>,
}

impl Default for EventBacklog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBacklog {
    /// Starts out holding; the fetch has not settled yet
    pub fn new() -> Self {
        Self {
            queued: Some(Vec::new()),
        }
    }

    /// Keep `event` while the fetch is in flight.
    ///
    /// Once settled the event is handed back for the caller to apply.
    pub fn hold(&mut self, event: ChangeEvent) -> Option<ChangeEvent> {
        match self.queued.as_mut() {
            Some(queued) => {
                queued.push(event);
                None
            }
            None => Some(event),
        }
    }

    /// Finish the fetch: install `rows` if it produced any, then replay the
    /// held events in delivery order. Returns how many were replayed.
    pub fn settle(&mut self, list: &mut EntryList, rows: Option<Vec<Entry>>) -> usize {
        if let Some(rows) = rows {
            list.replace_all(rows);
        }

        let queued = self.queued.take().unwrap_or_default();
        let replayed = queued.len();
        for event in queued {
            list.apply(event);
        }
        replayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daily_tasks::Category;

    fn entry(n: u32, comment: &str) -> Entry {
        Entry {
            id: Some(uuid_for(n)),
            category: Category::Krishna,
            date: "2024-05-01".parse().unwrap(),
            referral_link: "https://github.com/leptos-rs/leptos".to_string(),
            comment: comment.to_string(),
            created_at: None,
        }
    }

    fn uuid_for(n: u32) -> daily_tasks::EntryId {
        format!("00000000-0000-0000-0000-{:012}", n).parse().unwrap()
    }

    fn comments(list: &EntryList) -> Vec<&str> {
        list.iter().map(|e| e.comment.as_str()).collect()
    }

    #[test]
    fn test_holds_events_until_settled() {
        let mut backlog = EventBacklog::new();
        let mut list = EntryList::new();
        assert!(backlog
            .hold(ChangeEvent::Inserted { entry: entry(3, "early") })
            .is_none());
        assert!(list.is_empty());

        assert_eq!(backlog.settle(&mut list, Some(Vec::new())), 1);
        assert_eq!(comments(&list), vec!["early"]);
    }

    #[test]
    fn test_settle_replays_on_top_of_fetched_rows_in_order() {
        let mut backlog = EventBacklog::new();
        let mut list = EntryList::new();

        backlog.hold(ChangeEvent::Inserted { entry: entry(3, "third") });
        backlog.hold(ChangeEvent::Updated { entry: entry(1, "first, edited") });
        backlog.hold(ChangeEvent::Deleted { id: uuid_for(2) });

        let replayed = backlog.settle(
            &mut list,
            Some(vec![entry(2, "second"), entry(1, "first")]),
        );

        assert_eq!(replayed, 3);
        assert_eq!(comments(&list), vec!["third", "first, edited"]);
    }

    #[test]
    fn test_passes_events_through_after_settling() {
        let mut backlog = EventBacklog::new();
        let mut list = EntryList::new();
        backlog.settle(&mut list, Some(Vec::new()));

        let event = ChangeEvent::Inserted { entry: entry(4, "late") };
        assert_eq!(backlog.hold(event.clone()), Some(event));
        assert_eq!(backlog.settle(&mut list, None), 0);
    }

    #[test]
    fn test_failed_fetch_still_replays_held_events() {
        let mut backlog = EventBacklog::new();
        let mut list = EntryList::new();

        backlog.hold(ChangeEvent::Inserted { entry: entry(5, "arrived anyway") });
        assert_eq!(backlog.settle(&mut list, None), 1);
        assert_eq!(comments(&list), vec!["arrived anyway"]);
    }
}
