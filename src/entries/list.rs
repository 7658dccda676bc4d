//! Displayed entry list
//!
//! The list a panel shows, newest first, and the reducer that applies
//! change-feed events to it. Events are applied in the order they are
//! delivered; nothing here deduplicates against the initial fetch.

use serde::{Deserialize, Serialize};

use super::types::{Entry, EntryId};

/// A change reported by the backend's change feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A row was inserted
    Inserted { entry: Entry },
    /// A row was updated; `entry` holds the new values
    Updated { entry: Entry },
    /// A row was deleted
    Deleted { id: EntryId },
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Inserted { .. } => "insert",
            ChangeEvent::Updated { .. } => "update",
            ChangeEvent::Deleted { .. } => "delete",
        }
    }
}

/// Entries for one category, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list (initial fetch result)
    pub fn replace_all(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    /// Apply one change event.
    ///
    /// Inserts are prepended, updates replace the entry with the same id in
    /// place, deletes remove every entry with that id. Updates and deletes
    /// for unknown ids leave the list untouched.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Inserted { entry } => {
                self.entries.insert(0, entry);
            }
            ChangeEvent::Updated { entry } => {
                let Some(id) = entry.id else {
                    tracing::warn!("Ignoring update without an entry id");
                    return;
                };
                for existing in self.entries.iter_mut().filter(|e| e.has_id(&id)) {
                    *existing = entry.clone();
                }
            }
            ChangeEvent::Deleted { id } => {
                self.entries.retain(|e| !e.has_id(&id));
            }
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.has_id(id))
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::Category;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn entry(n: u128, comment: &str) -> Entry {
        Entry {
            id: Some(Uuid::from_u128(n)),
            category: Category::Vishnu,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            referral_link: "https://github.com".to_string(),
            comment: comment.to_string(),
            created_at: None,
        }
    }

    fn comments(list: &EntryList) -> Vec<&str> {
        list.iter().map(|e| e.comment.as_str()).collect()
    }

    fn seeded() -> EntryList {
        let mut list = EntryList::new();
        list.replace_all(vec![entry(3, "c"), entry(2, "b"), entry(1, "a")]);
        list
    }

    #[test]
    fn test_insert_prepends() {
        let mut list = seeded();
        list.apply(ChangeEvent::Inserted { entry: entry(4, "d") });
        assert_eq!(comments(&list), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut list = seeded();
        list.apply(ChangeEvent::Updated { entry: entry(2, "b2") });
        assert_eq!(comments(&list), vec!["c", "b2", "a"]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut list = seeded();
        list.apply(ChangeEvent::Updated { entry: entry(9, "z") });
        assert_eq!(list, seeded());
    }

    #[test]
    fn test_update_without_id_is_ignored() {
        let mut list = seeded();
        let mut anonymous = entry(2, "b2");
        anonymous.id = None;
        list.apply(ChangeEvent::Updated { entry: anonymous });
        assert_eq!(list, seeded());
    }

    #[test]
    fn test_delete_removes_only_matching() {
        let mut list = seeded();
        list.apply(ChangeEvent::Deleted { id: Uuid::from_u128(2) });
        assert_eq!(comments(&list), vec!["c", "a"]);

        list.apply(ChangeEvent::Deleted { id: Uuid::from_u128(42) });
        assert_eq!(comments(&list), vec!["c", "a"]);
    }

    #[test]
    fn test_duplicate_insert_is_kept() {
        // Events are not reconciled against the fetched rows.
        let mut list = seeded();
        list.apply(ChangeEvent::Inserted { entry: entry(3, "c") });
        assert_eq!(comments(&list), vec!["c", "c", "b", "a"]);

        list.apply(ChangeEvent::Deleted { id: Uuid::from_u128(3) });
        assert_eq!(comments(&list), vec!["b", "a"]);
    }
}
