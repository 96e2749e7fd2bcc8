//! Context annotation data model.
//!
//! One free-text note the user attached to a moment of their timeline.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timestamp;

/// A single user annotation, persisted in the day file of its creation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub context: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContextEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(context: impl Into<String>, tags: Vec<String>) -> Self {
        Self::at(Utc::now(), context, tags)
    }

    pub fn at(timestamp: DateTime<Utc>, context: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string().to_uppercase(),
            timestamp: timestamp::truncate(timestamp),
            context: context.into(),
            tags,
        }
    }

    /// Calendar date (local timezone) that owns this entry's day file.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
