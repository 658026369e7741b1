//! The scheduling engine and refresh cycle.
//!
//! One `Notifier` instance owns all scheduling state. `run_scheduling` is
//! the single re-entrant entry point: it is called at startup, after every
//! daily scrape, and from inside the refresh cycle. Each run cancels every
//! timer from the previous run before creating new ones, so repeated runs
//! can never produce duplicate alerts.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use econwatch_core::config::NotifierConfig;
use econwatch_core::{CalendarEvent, EventSource, MessageRef, MessageSink};
use futures::future::{BoxFuture, FutureExt};
use tokio::time::Duration;

use crate::group::{assumed_year, group_events, group_key, EventGroup, KeyPolicy};
use crate::registry::{ScheduledTimer, TimerRegistry};
use crate::render;

/// The notification scheduling engine.
pub struct Notifier {
    config: NotifierConfig,
    source: Arc<dyn EventSource>,
    sink: Arc<dyn MessageSink>,
    registry: TimerRegistry,
}

impl Notifier {
    /// Single construction point. Wrap in an `Arc`; the engine hands
    /// clones of itself to every timer task it spawns.
    pub fn new(
        config: NotifierConfig,
        source: Arc<dyn EventSource>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            registry: TimerRegistry::new(),
        }
    }

    pub fn registry(&self) -> &TimerRegistry {
        &self.registry
    }

    fn key_policy(&self) -> KeyPolicy {
        if self.config.strict_grouping {
            KeyPolicy::InstantTitle
        } else {
            KeyPolicy::Instant
        }
    }

    /// Cancel all pending timers. The engine can be dropped or re-run
    /// afterwards.
    pub fn shutdown(&self) {
        self.registry.clear_all();
        tracing::info!("Notifier shut down, all pending alerts cancelled");
    }

    /// Rebuild all alert timers from the stored snapshot.
    ///
    /// The run is all-or-nothing with respect to registry state: it starts
    /// by cancelling every previously registered timer, then registers the
    /// full timer set for each future event group. A snapshot that cannot
    /// be loaded terminates the run with nothing scheduled.
    pub async fn run_scheduling(self: &Arc<Self>) {
        self.registry.clear_all();

        let events = match self.source.load_stored_events().await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Scheduling run aborted, snapshot unavailable: {e}");
                return;
            }
        };
        if events.is_empty() {
            tracing::info!("No stored events, nothing to schedule");
            return;
        }

        let now = Utc::now();
        let groups = group_events(&events, now, self.key_policy());
        tracing::info!(
            "Scheduling alerts for {} group(s) out of {} stored events",
            groups.len(),
            events.len()
        );

        for group in groups {
            self.schedule_group(group, now);
        }
    }

    /// Register the offset timers for one group. Deadlines already in the
    /// past are skipped silently: a stale alert window is not worth a
    /// catch-up alert.
    fn schedule_group(self: &Arc<Self>, group: EventGroup, now: DateTime<Utc>) {
        let offsets = &self.config.offsets_minutes;
        let mut timers = Vec::new();

        for (i, &offset) in offsets.iter().enumerate() {
            let fire_at = group.instant - ChronoDuration::minutes(offset);
            let Ok(delay) = (fire_at - now).to_std() else {
                continue; // negative delay: window already passed
            };
            if delay.is_zero() {
                continue;
            }

            let chains_refresh = i == offsets.len() - 1;
            let engine = Arc::clone(self);
            let events = group.events.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                engine.fire_alert(offset, chains_refresh, events).await;
            });

            tracing::info!(
                "Scheduled {offset}-minute alert for {} in {:.1}s",
                fire_at,
                delay.as_secs_f64()
            );
            timers.push(ScheduledTimer::new(group.key.clone(), offset, fire_at, handle));
        }

        self.registry.set(group.key, timers);
    }

    /// A pre-event timer has elapsed. Dispatch failures are logged and do
    /// not touch sibling timers. The final offset chains the results
    /// refresh as an explicit follow-up task; that task is deliberately
    /// not registered, so a rescheduling pass cannot cancel a results
    /// update already in flight.
    async fn fire_alert(
        self: Arc<Self>,
        offset_minutes: i64,
        chains_refresh: bool,
        events: Vec<CalendarEvent>,
    ) {
        tracing::info!("{offset_minutes}-minute alert firing for {} event(s)", events.len());
        let payload = render::pre_event_alert(offset_minutes, &events);
        let handle = match self.sink.send_alert(&payload).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Alert dispatch failed: {e}");
                None
            }
        };

        if chains_refresh {
            let delay = Duration::from_secs(self.config.result_delay_secs);
            let engine = Arc::clone(&self);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                engine.refresh(handle, events).await;
            });
        }
    }

    /// The refresh cycle: re-fetch the calendar, re-match the original
    /// group by its derived key, swap the alert message for a results
    /// message, and when the fetch produced usable data, persist it and
    /// rebuild all timers from scratch.
    pub async fn refresh(
        self: &Arc<Self>,
        handle: Option<MessageRef>,
        original_group: Vec<CalendarEvent>,
    ) {
        let Some(first) = original_group.first() else {
            return;
        };

        let fetched = match self.source.fetch_events().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Results refresh aborted, fetch failed: {e}");
                return;
            }
        };
        if fetched.is_empty() {
            tracing::info!("Results refresh fetched an empty calendar, leaving alert as-is");
            return;
        }

        let year = assumed_year(Utc::now());
        let policy = self.key_policy();
        let Some(key) = group_key(first, year, policy) else {
            tracing::warn!("Original group no longer derives a key, dropping results update");
            return;
        };
        let updated: Vec<CalendarEvent> = fetched
            .iter()
            .filter(|event| group_key(event, year, policy).as_deref() == Some(key.as_str()))
            .cloned()
            .collect();

        let display = if updated.is_empty() {
            &original_group
        } else {
            &updated
        };
        let payload = render::results_alert(display);

        match &handle {
            Some(message) => {
                if let Err(e) = self.sink.edit_alert(message, &payload).await {
                    tracing::warn!("Results edit failed: {e}");
                }
            }
            // No editable message was ever delivered; results have nowhere
            // to go and a fresh message would be noise.
            None => tracing::debug!("No alert message to update for group {key}"),
        }

        if updated.is_empty() {
            tracing::info!("Fetched calendar had no updated events for group {key}");
            return;
        }
        if let Err(e) = self.source.save_events(&fetched).await {
            tracing::warn!("Failed to persist refreshed snapshot: {e}");
            return;
        }
        tracing::info!("Snapshot refreshed, rebuilding alert timers");
        self.reschedule().await;
    }

    /// Boxed hop into `run_scheduling`, breaking the refresh -> re-run ->
    /// timer -> refresh type cycle.
    fn reschedule(self: &Arc<Self>) -> BoxFuture<'static, ()> {
        let engine = Arc::clone(self);
        async move { engine.run_scheduling().await }.boxed()
    }
}
