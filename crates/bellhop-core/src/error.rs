//! Error taxonomy for the reminder subsystem.
//!
//! Store and resolver failures propagate synchronously to the caller;
//! timer-side failures are logged by the engine and dropped (there is no
//! caller to receive them at fire time).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BellhopError>;

#[derive(Debug, Error)]
pub enum BellhopError {
    /// A time expression that could not be resolved. The caller re-prompts;
    /// nothing is persisted.
    #[error("unrecognized time expression: {0}")]
    Parse(String),

    /// I/O or constraint failure in the reminder store.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal arm/cancel inconsistency. Non-fatal: the job is fired
    /// immediately or dropped, never left stuck.
    #[error("scheduler fault: {0}")]
    Scheduler(String),

    /// Rejected input, e.g. an empty reminder text.
    #[error("invalid reminder: {0}")]
    Invalid(String),

    /// Configuration load/parse failure.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
