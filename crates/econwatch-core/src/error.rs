//! Error taxonomy for econwatch.
//!
//! Per-event parse failures are not errors: the normalizer returns `None`
//! and callers skip the event. Everything that crosses a crate boundary
//! lands in `EconError`.

use thiserror::Error;

/// Type alias for Result using our error type.
pub type Result<T> = std::result::Result<T, EconError>;

/// Root error type for econwatch.
#[derive(Error, Debug)]
pub enum EconError {
    /// Calendar fetch failed (transport or markup). Transient; callers that
    /// needed the data abort only their own step.
    #[error("Calendar source error: {0}")]
    Source(String),

    /// Message delivery/edit failed. Non-fatal to scheduling.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Snapshot store read/write failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
