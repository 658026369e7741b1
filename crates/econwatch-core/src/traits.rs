//! Collaborator traits the notifier engine is written against.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AlertPayload, CalendarEvent, MessageRef};

/// Supplies calendar events and owns the durable snapshot.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the live calendar. An empty calendar is `Ok(vec![])`; only
    /// transport/markup failures are errors.
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>>;

    /// Load the persisted snapshot. Empty list when none exists.
    async fn load_stored_events(&self) -> Result<Vec<CalendarEvent>>;

    /// Overwrite the persisted snapshot. Idempotent.
    async fn save_events(&self, events: &[CalendarEvent]) -> Result<()>;
}

/// Delivers alerts to the messaging surface.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send an alert. `Ok(None)` means delivery failed in a way the caller
    /// should tolerate (no editable message exists); hard channel errors
    /// are still non-fatal to scheduling and are logged by the caller.
    async fn send_alert(&self, payload: &AlertPayload) -> Result<Option<MessageRef>>;

    /// Edit a previously delivered alert in place.
    async fn edit_alert(&self, handle: &MessageRef, payload: &AlertPayload) -> Result<()>;
}
