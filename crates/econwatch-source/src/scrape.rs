//! MarketWatch calendar scraper.
//!
//! The calendar is one table; date headings are rows whose first cell is
//! bold, and every following row belongs to that heading until the next
//! one. Markup drift shows up here as an empty result, not a panic.

use econwatch_core::config::SourceConfig;
use econwatch_core::{CalendarEvent, EconError, Result};
use rand::seq::SliceRandom;
use scraper::{ElementRef, Html, Selector};

/// HTTP scraper for the economic calendar page.
pub struct CalendarScraper {
    config: SourceConfig,
    client: reqwest::Client,
}

impl CalendarScraper {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn user_agent(&self) -> &str {
        self.config
            .user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("Mozilla/5.0")
    }

    /// Fetch and parse the live calendar.
    pub async fn fetch(&self) -> Result<Vec<CalendarEvent>> {
        let response = self
            .client
            .get(&self.config.url)
            .header("User-Agent", self.user_agent())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Referer", "https://www.marketwatch.com/")
            .send()
            .await
            .map_err(|e| EconError::Source(format!("Calendar request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(EconError::Source(format!(
                "Calendar request returned {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| EconError::Source(format!("Calendar body read failed: {e}")))?;

        let events = parse_calendar(&html);
        tracing::info!("Scraped {} calendar events", events.len());
        Ok(events)
    }
}

/// Parse the calendar table out of a page. Pure, so it is testable without
/// HTTP.
pub fn parse_calendar(html: &str) -> Vec<CalendarEvent> {
    let document = Html::parse_document(html);
    // Selectors are compile-time constants; unwrap is fine.
    let row_sel = Selector::parse("div.element--tableblock table tbody tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();
    let bold_sel = Selector::parse("b").unwrap();

    let mut events = Vec::new();
    let mut current_date = String::new();

    for row in document.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.is_empty() {
            continue;
        }

        // A bold first cell starts a new date heading.
        if let Some(heading) = cells[0].select(&bold_sel).next() {
            current_date = cell_text_of(heading);
            continue;
        }

        let time = cell_text(&cells, 0);
        let title = cell_text(&cells, 1);
        if title.to_lowercase().contains("none scheduled") {
            continue;
        }

        events.push(CalendarEvent {
            date: current_date.clone(),
            time,
            title,
            period: cell_text(&cells, 2),
            actual: opt_cell_text(&cells, 3),
            forecast: opt_cell_text(&cells, 4),
            previous: opt_cell_text(&cells, 5),
        });
    }

    events
}

fn cell_text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn cell_text(cells: &[ElementRef], idx: usize) -> String {
    cells.get(idx).map(|c| cell_text_of(*c)).unwrap_or_default()
}

fn opt_cell_text(cells: &[ElementRef], idx: usize) -> Option<String> {
    let text = cell_text(cells, idx);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
