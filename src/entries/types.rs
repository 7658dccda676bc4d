//! Core data types for entries
//!
//! - `Category`: the two fixed partitions an entry can belong to
//! - `Entry`: a stored row as the backend returns it
//! - `EntryDraft`: what the client submits (no identifier, no timestamp)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Server-assigned entry identifier
pub type EntryId = Uuid;

/// Category an entry is filed under
///
/// Serialized as the lowercase wire tag (`"vishnu"`, `"krishna"`).
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Vishnu,
    Krishna,
}

impl Category {
    /// Both categories, in tab order
    pub fn all() -> &'static [Category] {
        &[Category::Vishnu, Category::Krishna]
    }

    /// Wire tag used in row filters and channel names
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Vishnu => "vishnu",
            Category::Krishna => "krishna",
        }
    }

    /// Display title shown on tabs and form headers
    pub fn title(&self) -> &'static str {
        match self {
            Category::Vishnu => "Vishnu",
            Category::Krishna => "Krishna",
        }
    }

    /// The category on the other tab
    pub fn other(&self) -> Category {
        match self {
            Category::Vishnu => Category::Krishna,
            Category::Krishna => Category::Vishnu,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vishnu" => Ok(Category::Vishnu),
            "krishna" => Ok(Category::Krishna),
            other => Err(CategoryParseError(other.to_string())),
        }
    }
}

/// Returned when a string is not one of the two category tags
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0:?} (expected \"vishnu\" or \"krishna\")")]
pub struct CategoryParseError(pub String);

/// A stored entry
///
/// `id` and `created_at` are assigned by the backend; rows built locally
/// before submission never carry them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub category: Category,
    pub date: NaiveDate,
    pub referral_link: String,
    pub comment: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 as well as the Postgres text form
/// (`2024-03-05 10:15:00.123456+00`) the change feed sometimes emits.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    DateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f%#z")
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}

impl Entry {
    /// Build the stored form of a draft once the backend has assigned
    /// its identifier and creation time.
    pub fn from_draft(draft: EntryDraft, id: EntryId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            category: draft.category,
            date: draft.date,
            referral_link: draft.referral_link,
            comment: draft.comment,
            created_at: Some(created_at),
        }
    }

    /// Whether this entry carries the given identifier
    pub fn has_id(&self, id: &EntryId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// A validated entry ready to be inserted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryDraft {
    pub category: Category,
    pub date: NaiveDate,
    pub referral_link: String,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_tags() {
        assert_eq!(serde_json::to_string(&Category::Vishnu).unwrap(), "\"vishnu\"");
        assert_eq!(
            serde_json::from_str::<Category>("\"krishna\"").unwrap(),
            Category::Krishna
        );
        assert!(serde_json::from_str::<Category>("\"shiva\"").is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Vishnu".parse::<Category>().unwrap(), Category::Vishnu);
        assert_eq!(" krishna ".parse::<Category>().unwrap(), Category::Krishna);

        let err = "a".parse::<Category>().unwrap_err();
        assert_eq!(err, CategoryParseError("a".to_string()));
    }

    #[test]
    fn test_category_other() {
        for category in Category::all() {
            assert_ne!(category.other(), *category);
            assert_eq!(category.other().other(), *category);
        }
    }

    #[test]
    fn test_entry_deserialize_backend_row() {
        let json = r#"{
            "id": "0d9b6c52-8f1e-4a8e-9a53-0c6e8f1d2a11",
            "category": "vishnu",
            "date": "2024-03-05",
            "referral_link": "https://github.com/rust-lang/rust",
            "comment": "Reviewed the release notes",
            "created_at": "2024-03-05T10:15:00.123456+00:00"
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert!(entry.id.is_some());
        assert_eq!(entry.category, Category::Vishnu);
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert!(entry.created_at.is_some());
    }

    #[test]
    fn test_entry_accepts_postgres_timestamp_text() {
        let json = r#"{
            "id": "0d9b6c52-8f1e-4a8e-9a53-0c6e8f1d2a11",
            "category": "krishna",
            "date": "2024-03-05",
            "referral_link": "https://github.com",
            "comment": "x",
            "created_at": "2024-03-05 10:15:00.5+00"
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        let created = entry.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-03-05T10:15:00.500+00:00");
    }

    #[test]
    fn test_draft_serializes_without_server_fields() {
        let draft = EntryDraft {
            category: Category::Krishna,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            referral_link: "https://youtube.com/watch?v=abc".to_string(),
            comment: "Watched".to_string(),
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["category"], "krishna");
        assert_eq!(json["date"], "2024-01-02");
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
    }
}
