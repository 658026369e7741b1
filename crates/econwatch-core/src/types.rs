//! Core data model: calendar events and alert payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the economic calendar, as scraped. Immutable once read.
///
/// There is no unique identifier; identity is derived from
/// `(date, time, title)` by the notifier's key function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Free-text date heading, e.g. "Monday, January 6". The second
    /// comma-delimited segment carries the month and day.
    pub date: String,
    /// Time text in US Eastern, e.g. "8:30 am" or "3:00pm".
    pub time: String,
    /// Report title, e.g. "Consumer price index".
    pub title: String,
    /// Reporting period, e.g. "Dec".
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl CalendarEvent {
    /// Title trimmed and case-folded, for strict grouping.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// A rendered, channel-agnostic alert. The channel turns this into its own
/// wire format (Discord embed, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub title: String,
    pub body: String,
    /// RGB color hint for channels that support it.
    pub color: u32,
}

/// Handle to a delivered message that can be edited in place.
///
/// A sink that could not deliver returns no handle at all; absence of edit
/// capability is this type being absent, never a runtime probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}
