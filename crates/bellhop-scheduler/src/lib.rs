//! # Bellhop Scheduler
//!
//! Durable one-off reminder scheduling. Reminders survive restarts, fire at
//! most once, and stay safely mutable (create/list/delete) while the timer
//! runs.
//!
//! ## Design Principles
//! - SQLite persistence — a reminder is durable before it is armed
//! - Tokio timers only — the engine sleeps until the earliest due instant,
//!   waking early when the pending set changes
//! - At-most-once delivery — a due job leaves the pending set before its
//!   callback runs
//! - Store is the source of truth — the armed job is a transient reference
//!
//! ## Architecture
//! ```text
//! ReminderManager
//!   ├── TimeResolver: "10 minutes" / "5:30 pm" → future DateTime<Utc>
//!   ├── ReminderStore (SQLite): create → list → delete
//!   ├── TimerEngine (tokio task): arm(id, when) → sleep → fire
//!   └── on fire → Notifier::alert(text)
//!
//! Startup recovery
//!   ├── load_all() rows from the store
//!   ├── when_utc > now → re-arm
//!   └── when_utc <= now → skipped (still listable, never fires)
//! ```

pub mod manager;
pub mod notify;
pub mod reminder;
pub mod resolve;
pub mod store;
pub mod timer;

pub use manager::ReminderManager;
pub use notify::{ConsoleNotifier, Notifier};
pub use reminder::Reminder;
pub use resolve::TimeResolver;
pub use store::ReminderStore;
pub use timer::TimerEngine;
