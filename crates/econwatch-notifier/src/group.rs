//! Event grouping — simultaneous events become one alert.
//!
//! The group key is a pure function of event fields, so re-deriving it for
//! the same logical event after a re-fetch yields the same key and results
//! can be matched back to their originating alert even when forecast or
//! actual values changed in between.

use chrono::{DateTime, Datelike, Timelike, Utc};
use econwatch_core::CalendarEvent;
use std::collections::HashMap;

use crate::normalize::{normalize, REFERENCE_ZONE};

/// Key strictness. `Instant` merges everything at the same minute;
/// `InstantTitle` additionally requires the normalized title to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    Instant,
    InstantTitle,
}

/// Events sharing one schedule key, in source order.
#[derive(Debug)]
pub struct EventGroup {
    pub key: String,
    pub instant: DateTime<Utc>,
    pub events: Vec<CalendarEvent>,
}

/// Current year in the reference zone, used to disambiguate year-less
/// headings.
pub fn assumed_year(now: DateTime<Utc>) -> i32 {
    now.with_timezone(&REFERENCE_ZONE).year()
}

/// Derive the schedule key for an event, `None` when it cannot be
/// normalized. The instant is truncated to whole minutes first.
pub fn group_key(event: &CalendarEvent, year: i32, policy: KeyPolicy) -> Option<String> {
    let instant = normalize(event, year)?;
    let truncated = instant.with_second(0)?.with_nanosecond(0)?;
    let key = truncated.to_rfc3339();
    match policy {
        KeyPolicy::Instant => Some(key),
        KeyPolicy::InstantTitle => Some(format!("{key}|{}", event.normalized_title())),
    }
}

/// Bucket strictly-future events by key. Unparseable events are dropped,
/// source order is preserved within a group, and groups come back sorted
/// ascending by instant so scheduling runs are deterministic to read.
pub fn group_events(
    events: &[CalendarEvent],
    now: DateTime<Utc>,
    policy: KeyPolicy,
) -> Vec<EventGroup> {
    let year = assumed_year(now);
    let mut buckets: HashMap<String, EventGroup> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for event in events {
        let Some(instant) = normalize(event, year) else {
            tracing::debug!("Skipping unparseable event '{}'", event.title);
            continue;
        };
        if instant <= now {
            tracing::debug!("Skipping past event '{}' at {}", event.title, instant);
            continue;
        }
        // normalize() succeeded, so group_key() does too.
        let Some(key) = group_key(event, year, policy) else {
            continue;
        };
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                EventGroup {
                    key,
                    instant,
                    events: Vec::new(),
                }
            })
            .events
            .push(event.clone());
    }

    let mut groups: Vec<EventGroup> = order
        .into_iter()
        .filter_map(|key| buckets.remove(&key))
        .collect();
    groups.sort_by(|a, b| a.instant.cmp(&b.instant).then_with(|| a.key.cmp(&b.key)));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(date: &str, time: &str, title: &str) -> CalendarEvent {
        CalendarEvent {
            date: date.into(),
            time: time.into(),
            title: title.into(),
            period: "Dec".into(),
            actual: None,
            forecast: None,
            previous: None,
        }
    }

    // Midnight UTC on Jan 1 keeps every January instant in the future.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn same_instant_merges_into_one_group() {
        let events = vec![
            event("Monday, January 6", "8:30 am", "CPI"),
            event("Monday, January 6", "8:30am", "Jobless claims"),
        ];
        let groups = group_events(&events, now(), KeyPolicy::Instant);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events.len(), 2);
        // source order preserved
        assert_eq!(groups[0].events[0].title, "CPI");
        assert_eq!(groups[0].events[1].title, "Jobless claims");
    }

    #[test]
    fn strict_policy_splits_by_title() {
        let events = vec![
            event("Monday, January 6", "8:30 am", "CPI"),
            event("Monday, January 6", "8:30 am", "Jobless claims"),
        ];
        let groups = group_events(&events, now(), KeyPolicy::InstantTitle);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn key_is_deterministic_across_field_changes() {
        let year = 2025;
        let mut a = event("Monday, January 6", "8:30 am", "CPI");
        let mut b = a.clone();
        b.actual = Some("0.4%".into());
        b.forecast = Some("0.3%".into());
        for policy in [KeyPolicy::Instant, KeyPolicy::InstantTitle] {
            assert_eq!(group_key(&a, year, policy), group_key(&b, year, policy));
            assert!(group_key(&a, year, policy).is_some());
        }
        // strict mode folds title case and whitespace
        a.title = "  cpi ".into();
        b.title = "CPI".into();
        assert_eq!(
            group_key(&a, year, KeyPolicy::InstantTitle),
            group_key(&b, year, KeyPolicy::InstantTitle)
        );
    }

    #[test]
    fn past_and_unparseable_events_are_dropped() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let events = vec![
            event("Monday, January 6", "8:30 am", "Long gone"),
            event("no comma segment", "8:30 am", "Broken heading"),
            event("Tuesday, July 15", "3:00pm", "Still ahead"),
        ];
        let groups = group_events(&events, now, KeyPolicy::Instant);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events[0].title, "Still ahead");
    }

    #[test]
    fn groups_sort_ascending_by_instant() {
        let events = vec![
            event("Tuesday, January 7", "10:00 am", "Later"),
            event("Monday, January 6", "8:30 am", "Earlier"),
        ];
        let groups = group_events(&events, now(), KeyPolicy::Instant);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].instant < groups[1].instant);
        assert_eq!(groups[0].events[0].title, "Earlier");
    }
}
