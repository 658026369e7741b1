//! # econwatch core
//!
//! Shared building blocks for the econwatch workspace: the calendar event
//! data model, the error taxonomy, configuration, and the collaborator
//! traits (`EventSource`, `MessageSink`) that the notifier engine is
//! written against.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::EconConfig;
pub use error::{EconError, Result};
pub use traits::{EventSource, MessageSink};
pub use types::{AlertPayload, CalendarEvent, MessageRef};
