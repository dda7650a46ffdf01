//! # Bellhop Core
//!
//! Shared plumbing for the Bellhop reminder scheduler: the error taxonomy,
//! the injectable clock, and TOML configuration.

pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BellhopConfig;
pub use error::{BellhopError, Result};
