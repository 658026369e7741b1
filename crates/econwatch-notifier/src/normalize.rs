//! Time normalization — heterogeneous calendar date/time strings to UTC
//! instants.
//!
//! Event times are published in US Eastern regardless of where the process
//! runs. A heading like "Monday, January 6" plus "8:30 am" plus the
//! current year resolves to one absolute instant. The Eastern offset
//! changes across daylight-saving transitions, so the offset has to be
//! looked up at the candidate date itself: first parse the date and time
//! with no offset, then resolve that naive local time in the reference
//! zone.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use econwatch_core::CalendarEvent;
use regex::Regex;
use std::sync::OnceLock;

/// The fixed timezone all event times are interpreted in.
pub const REFERENCE_ZONE: Tz = New_York;

const DATE_TIME_FORMAT: &str = "%B %d %Y %I:%M %p";

fn bare_meridiem() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d{1,2}:\d{2})(am|pm)$").unwrap())
}

/// Insert the missing space before a trailing meridiem marker
/// ("3:00pm" -> "3:00 pm"). Anything else passes through untouched.
pub fn fix_time_text(time: &str) -> String {
    let trimmed = time.trim();
    match bare_meridiem().captures(trimmed) {
        Some(caps) => format!("{} {}", &caps[1], &caps[2]),
        None => trimmed.to_string(),
    }
}

/// Resolve an event to an absolute UTC instant.
///
/// `year` disambiguates the year-less heading and is derived from the
/// clock by callers. Returns `None` when the heading has no second
/// comma-segment or either parse stage fails; callers skip such events
/// rather than aborting the batch. Headings that resolve into the past
/// are NOT rolled into the next year.
pub fn normalize(event: &CalendarEvent, year: i32) -> Option<DateTime<Utc>> {
    let day_month = event.date.split(',').nth(1)?.trim();
    if day_month.is_empty() {
        return None;
    }

    let candidate = format!("{day_month} {year} {}", fix_time_text(&event.time));
    let naive = NaiveDateTime::parse_from_str(&candidate, DATE_TIME_FORMAT).ok()?;

    // Second pass: pin the naive local time to the Eastern offset in
    // effect on that date. The fall-back hour maps to its earlier
    // occurrence; the spring-forward gap does not exist on the wall clock
    // and is treated as not parseable.
    match REFERENCE_ZONE.from_local_datetime(&naive) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(date: &str, time: &str) -> CalendarEvent {
        CalendarEvent {
            date: date.into(),
            time: time.into(),
            title: "Consumer price index".into(),
            period: "Dec".into(),
            actual: None,
            forecast: None,
            previous: None,
        }
    }

    #[test]
    fn fixes_missing_meridiem_space() {
        assert_eq!(fix_time_text("3:00pm"), "3:00 pm");
        assert_eq!(fix_time_text("11:45AM"), "11:45 AM");
        assert_eq!(fix_time_text("8:30 am"), "8:30 am");
        assert_eq!(fix_time_text("noonish"), "noonish");
    }

    #[test]
    fn winter_date_resolves_in_est() {
        // January 6 is EST (UTC-5): 8:30 am Eastern = 13:30 UTC.
        let instant = normalize(&event("Monday, January 6", "8:30 am"), 2025).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 1, 6, 13, 30, 0).unwrap());
    }

    #[test]
    fn summer_date_resolves_in_edt() {
        // July 15 is EDT (UTC-4): 3:00 pm Eastern = 19:00 UTC.
        let instant = normalize(&event("Tuesday, July 15", "3:00pm"), 2025).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 7, 15, 19, 0, 0).unwrap());
    }

    #[test]
    fn same_fields_normalize_identically() {
        let a = normalize(&event("Monday, January 6", "8:30 am"), 2025);
        let b = normalize(&event("Monday, January 6", "8:30 am"), 2025);
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn heading_without_second_segment_is_not_parseable() {
        assert_eq!(normalize(&event("January 6", "8:30 am"), 2025), None);
        assert_eq!(normalize(&event("", "8:30 am"), 2025), None);
        assert_eq!(normalize(&event("Monday,", "8:30 am"), 2025), None);
    }

    #[test]
    fn garbage_time_is_not_parseable() {
        assert_eq!(normalize(&event("Monday, January 6", "whenever"), 2025), None);
        assert_eq!(normalize(&event("Monday, January 6", ""), 2025), None);
    }

    #[test]
    fn spring_forward_gap_is_not_parseable() {
        // 2:30 am on 2025-03-09 does not exist on the Eastern wall clock.
        assert_eq!(normalize(&event("Sunday, March 9", "2:30 am"), 2025), None);
    }

    #[test]
    fn fall_back_hour_takes_earliest_mapping() {
        // 1:30 am on 2025-11-02 occurs twice; the EDT occurrence wins.
        let instant = normalize(&event("Sunday, November 2", "1:30 am"), 2025).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap());
    }
}
