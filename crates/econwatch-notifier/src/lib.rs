//! # econwatch notifier
//!
//! The notification scheduling engine. Turns the stored calendar snapshot
//! into a set of cancellable, time-precise delayed alerts and rebuilds
//! that state from scratch whenever the snapshot is refreshed.
//!
//! ## Architecture
//! ```text
//! EventSource ──> normalize ──> group ──> Notifier::run_scheduling
//!                                            │ (per group, per offset)
//!                                            ├── T-30min timer ──> pre-event alert
//!                                            └── T-1min timer ───> pre-event alert
//!                                                                    │ (+result delay)
//!                                                                    └── refresh:
//!                                                                        re-fetch, re-match,
//!                                                                        edit alert in place,
//!                                                                        persist, re-run
//! ```
//!
//! All timer handles live in the [`registry::TimerRegistry`]; every
//! scheduling run replaces the registry wholesale, so stale timers from a
//! previous run can never double-fire.

pub mod cron;
pub mod engine;
pub mod group;
pub mod normalize;
pub mod registry;
pub mod render;

pub use engine::Notifier;
pub use group::{group_events, group_key, EventGroup, KeyPolicy};
pub use normalize::{normalize, REFERENCE_ZONE};
pub use registry::{ScheduledTimer, TimerRegistry};
