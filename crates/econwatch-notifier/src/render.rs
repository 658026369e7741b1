//! Alert payload rendering.
//!
//! Channel-agnostic: the engine builds an [`AlertPayload`] here and the
//! sink decides how that becomes an embed or a plain message.

use econwatch_core::{AlertPayload, CalendarEvent};

const COLOR_PRE_EVENT: u32 = 0xf1c40f; // amber
const COLOR_FINAL_WARNING: u32 = 0xff8c00; // orange
const COLOR_NEUTRAL: u32 = 0x7289da;
const COLOR_BEAT: u32 = 0x2ecc71;
const COLOR_MISS: u32 = 0xe74c3c;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Beat,
    Miss,
    Neutral,
}

/// Compare actual against forecast numerically. Non-numeric values (or a
/// missing side) are neutral.
fn predict_outcome(actual: Option<&str>, forecast: Option<&str>) -> Outcome {
    let parse = |s: Option<&str>| -> Option<f64> {
        let cleaned: String = s?
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        cleaned.parse().ok()
    };
    match (parse(actual), parse(forecast)) {
        (Some(a), Some(f)) if a > f => Outcome::Beat,
        (Some(a), Some(f)) if a < f => Outcome::Miss,
        (Some(_), Some(_)) => Outcome::Neutral,
        _ => Outcome::Neutral,
    }
}

fn outcome_indicator(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Beat => "↑ Higher",
        Outcome::Miss => "↓ Lower",
        Outcome::Neutral => "– Expected",
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Render the pre-event alert for a group, labelled with its offset.
pub fn pre_event_alert(offset_minutes: i64, events: &[CalendarEvent]) -> AlertPayload {
    let window = match offset_minutes {
        30 => "30-Minutes".to_string(),
        1 => "1-Minute".to_string(),
        n => format!("{n}-Minute"),
    };
    let label = if events.len() == 1 { "Event" } else { "Events" };
    let color = if offset_minutes == 1 {
        COLOR_FINAL_WARNING
    } else {
        COLOR_PRE_EVENT
    };

    let lines: Vec<String> = events
        .iter()
        .map(|evt| {
            let mut details = Vec::new();
            if let Some(forecast) = non_empty(&evt.forecast) {
                details.push(format!("Forecast: {forecast}"));
            }
            if let Some(previous) = non_empty(&evt.previous) {
                details.push(format!("Prev: {previous}"));
            }
            if details.is_empty() {
                format!("• **{}**", evt.title)
            } else {
                format!("• **{}**\n{}", evt.title, details.join(" | "))
            }
        })
        .collect();

    AlertPayload {
        title: format!("{label} — {window} Alert"),
        body: if lines.is_empty() {
            "No data available".to_string()
        } else {
            lines.join("\n\n")
        },
        color,
    }
}

/// Render the post-event results message for a group.
pub fn results_alert(events: &[CalendarEvent]) -> AlertPayload {
    // Single-event groups get an outcome color; mixed groups stay neutral.
    let color = match events {
        [only] => match predict_outcome(only.actual.as_deref(), only.forecast.as_deref()) {
            Outcome::Beat => COLOR_BEAT,
            Outcome::Miss => COLOR_MISS,
            Outcome::Neutral => COLOR_NEUTRAL,
        },
        _ => COLOR_NEUTRAL,
    };

    let lines: Vec<String> = events
        .iter()
        .map(|evt| {
            let mut details = Vec::new();
            if let Some(actual) = non_empty(&evt.actual) {
                let outcome = predict_outcome(Some(actual), evt.forecast.as_deref());
                details.push(format!("Actual: {actual} {}", outcome_indicator(outcome)));
            }
            if let Some(forecast) = non_empty(&evt.forecast) {
                details.push(format!("Forecast: {forecast}"));
            }
            if let Some(previous) = non_empty(&evt.previous) {
                details.push(format!("Prev: {previous}"));
            }
            if details.is_empty() {
                format!("• **{}**", evt.title)
            } else {
                format!("• **{}**\n{}", evt.title, details.join("\n"))
            }
        })
        .collect();

    AlertPayload {
        title: "Event Results".to_string(),
        body: if lines.is_empty() {
            "No updated data available".to_string()
        } else {
            lines.join("\n\n")
        },
        color,
    }
}
