//! Records consumed from the activity tracker. Read-only to this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Bucket `type` written by the foreground-window watcher.
pub const WINDOW_WATCHER_TYPE: &str = "currentwindow";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub title: String,
}

/// One focus interval reported by the window watcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Seconds.
    pub duration: f64,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub bucket_type: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl Bucket {
    pub fn is_window_watcher(&self) -> bool {
        self.bucket_type == WINDOW_WATCHER_TYPE
    }
}
