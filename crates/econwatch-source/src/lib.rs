//! # econwatch source
//!
//! The calendar side of the system: an HTTP scraper for the MarketWatch
//! economic calendar and a JSON snapshot store. `CalendarSource` bundles
//! both behind the `EventSource` trait the notifier consumes.

pub mod scrape;
pub mod store;

use async_trait::async_trait;
use econwatch_core::{CalendarEvent, EventSource, Result};

pub use scrape::CalendarScraper;
pub use store::EventStore;

/// Live scraper + durable snapshot, as one `EventSource`.
pub struct CalendarSource {
    scraper: CalendarScraper,
    store: EventStore,
}

impl CalendarSource {
    pub fn new(scraper: CalendarScraper, store: EventStore) -> Self {
        Self { scraper, store }
    }
}

#[async_trait]
impl EventSource for CalendarSource {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>> {
        self.scraper.fetch().await
    }

    async fn load_stored_events(&self) -> Result<Vec<CalendarEvent>> {
        self.store.load()
    }

    async fn save_events(&self, events: &[CalendarEvent]) -> Result<()> {
        self.store.save(events)
    }
}
