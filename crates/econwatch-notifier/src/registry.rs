//! Timer registry — the one piece of shared mutable state.
//!
//! Maps each group key to the delayed-action handles created for it by the
//! last completed scheduling run. Runs replace the registry wholesale;
//! nothing is ever merged, so no timer from a prior run can survive a new
//! run's `clear_all`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// One pending delayed action. Owned exclusively by the registry; aborted
/// on `clear_all`, a no-op once the task has already finished.
#[derive(Debug)]
pub struct ScheduledTimer {
    pub group_key: String,
    pub offset_minutes: i64,
    pub fire_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

impl ScheduledTimer {
    pub fn new(
        group_key: String,
        offset_minutes: i64,
        fire_at: DateTime<Utc>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            group_key,
            offset_minutes,
            fire_at,
            handle,
        }
    }

    fn cancel(&self) {
        self.handle.abort();
    }
}

/// Process-wide table of pending alert timers, explicitly owned by the
/// engine (no globals). The mutex serializes `clear_all` against `set`;
/// neither holds the lock across an await.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    inner: Mutex<HashMap<String, Vec<ScheduledTimer>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every outstanding timer and empty the table. Idempotent and
    /// safe with zero timers pending; timers that already fired are
    /// cancelled as no-ops.
    pub fn clear_all(&self) {
        let mut inner = self.inner.lock().expect("timer registry poisoned");
        let cancelled: usize = inner.values().map(Vec::len).sum();
        for timers in inner.values() {
            for timer in timers {
                timer.cancel();
            }
        }
        inner.clear();
        if cancelled > 0 {
            tracing::debug!("Cancelled {cancelled} pending alert timers");
        }
    }

    /// Replace (never merge) the timer list for one group key.
    pub fn set(&self, key: String, timers: Vec<ScheduledTimer>) {
        let mut inner = self.inner.lock().expect("timer registry poisoned");
        if let Some(old) = inner.insert(key, timers) {
            for timer in &old {
                timer.cancel();
            }
        }
    }

    /// Number of group keys with registered timers.
    pub fn group_count(&self) -> usize {
        self.inner.lock().expect("timer registry poisoned").len()
    }

    /// Total pending timers across all groups.
    pub fn timer_count(&self) -> usize {
        self.inner
            .lock()
            .expect("timer registry poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Deadlines registered for a key, as `(offset_minutes, fire_at)`.
    pub fn deadlines_for(&self, key: &str) -> Vec<(i64, DateTime<Utc>)> {
        self.inner
            .lock()
            .expect("timer registry poisoned")
            .get(key)
            .map(|timers| {
                timers
                    .iter()
                    .map(|t| (t.offset_minutes, t.fire_at))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_timer(key: &str, offset: i64) -> ScheduledTimer {
        let handle = tokio::spawn(async {
            futures::future::pending::<()>().await;
        });
        ScheduledTimer::new(key.to_string(), offset, Utc::now(), handle)
    }

    #[tokio::test]
    async fn clear_all_is_idempotent() {
        let registry = TimerRegistry::new();
        registry.clear_all(); // empty: still fine
        registry.set("k".into(), vec![pending_timer("k", 30), pending_timer("k", 1)]);
        assert_eq!(registry.timer_count(), 2);
        registry.clear_all();
        registry.clear_all();
        assert_eq!(registry.timer_count(), 0);
        assert_eq!(registry.group_count(), 0);
    }

    #[tokio::test]
    async fn set_replaces_instead_of_merging() {
        let registry = TimerRegistry::new();
        registry.set("k".into(), vec![pending_timer("k", 30)]);
        registry.set("k".into(), vec![pending_timer("k", 1)]);
        assert_eq!(registry.timer_count(), 1);
        assert_eq!(registry.deadlines_for("k")[0].0, 1);
        registry.clear_all();
    }

    #[tokio::test]
    async fn cancelling_a_finished_timer_is_a_noop() {
        let registry = TimerRegistry::new();
        let done = tokio::spawn(async {});
        tokio::task::yield_now().await; // let it finish
        registry.set(
            "k".into(),
            vec![ScheduledTimer::new("k".into(), 1, Utc::now(), done)],
        );
        registry.clear_all(); // must not panic on the completed handle
        assert_eq!(registry.timer_count(), 0);
    }
}
