//! Reminder — the core data model for a one-off scheduled task.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A one-off task bound to an absolute future instant.
///
/// `id` is assigned by the store, unique and never reused. `when_utc` is
/// immutable once set: there is no update operation, only create and delete.
/// A reminder that has fired stays listable until the caller deletes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    /// Store-assigned, monotonically increasing ID.
    pub id: i64,
    /// What to say when the reminder fires. Opaque to the scheduler.
    pub text: String,
    /// Absolute instant at which the reminder fires.
    pub when_utc: DateTime<Utc>,
    /// When the reminder was created. Informational only.
    pub created_utc: DateTime<Utc>,
}

impl Reminder {
    /// The fire instant rendered in a display timezone.
    pub fn when_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        self.when_utc.with_timezone(tz)
    }
}
