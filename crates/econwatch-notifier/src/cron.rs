//! Minimal 5-field cron, enough for the daily re-scrape trigger.
//!
//! Field syntax: `*`, `*/N`, a single value, or a comma list. Day-of-month,
//! month, and day-of-week must be `*`; the trigger is a time-of-day
//! schedule, nothing more.

use chrono::{DateTime, Duration, Timelike, Utc};

/// A parsed "MIN HOUR * * *" schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: Vec<u32>,
    hours: Vec<u32>,
}

impl CronSchedule {
    /// Parse a 5-field expression, `None` when it does not fit the
    /// supported subset.
    pub fn parse(expression: &str) -> Option<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            tracing::warn!(
                "Invalid cron expression '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
            );
            return None;
        }
        Some(Self {
            minutes: parse_field(fields[0], 0, 59)?,
            hours: parse_field(fields[1], 0, 23)?,
        })
    }

    /// Next matching instant strictly after `after`, scanning up to 48
    /// hours ahead.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = (after + Duration::minutes(1))
            .with_second(0)?
            .with_nanosecond(0)?;
        for _ in 0..(48 * 60) {
            if self.minutes.contains(&candidate.minute()) && self.hours.contains(&candidate.hour())
            {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }
    let values: Vec<u32> = field
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<Vec<u32>>>()?;
    if values.iter().all(|v| (min..=max).contains(v)) {
        Some(values)
    } else {
        None
    }
}
