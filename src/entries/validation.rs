//! Form validation
//!
//! Turns the raw text of the entry form into an [`EntryDraft`], or into one
//! message per invalid field. Nothing here touches the network.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use url::Url;

use super::types::{Category, EntryDraft};

/// Date format produced by the date picker
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Date,
    ReferralLink,
    Comment,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[Field::Date, Field::ReferralLink, Field::Comment]
    }

    /// Label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::ReferralLink => "Referral Link (YouTube/GitHub)",
            Field::Comment => "Comment",
        }
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Field::Date),
            "link" | "referral_link" => Ok(Field::ReferralLink),
            "comment" => Ok(Field::Comment),
            other => Err(format!("Unknown field: {}", other)),
        }
    }
}

/// Raw draft values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub date: String,
    pub referral_link: String,
    pub comment: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::ReferralLink => &self.referral_link,
            Field::Comment => &self.comment,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Date => self.date = value,
            Field::ReferralLink => self.referral_link = value,
            Field::Comment => self.comment = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate the fields and build a draft for `category`.
    ///
    /// The category always comes from the caller, never from the fields.
    pub fn validate(&self, category: Category) -> Result<EntryDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let date = if self.date.is_empty() {
            errors.insert(Field::Date, "Date is required");
            None
        } else {
            match NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(Field::Date, "Please enter a valid date");
                    None
                }
            }
        };

        if self.referral_link.is_empty() {
            errors.insert(Field::ReferralLink, "Referral link is required");
        } else if Url::parse(&self.referral_link).is_err() {
            errors.insert(Field::ReferralLink, "Please enter a valid URL");
        }

        if self.comment.trim().is_empty() {
            errors.insert(Field::Comment, "Comment is required");
        }

        match date {
            Some(date) if errors.is_empty() => Ok(EntryDraft {
                category,
                date,
                referral_link: self.referral_link.clone(),
                comment: self.comment.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// One error message per invalid field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Drop the message for one field (the user started editing it)
    pub fn clear_field(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.label(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
