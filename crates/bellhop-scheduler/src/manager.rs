//! ReminderManager — the one component external callers touch.
//!
//! Orchestrates resolver, store, and timer with a write-ahead discipline:
//! a reminder is persisted before it is armed, so a crash between the two
//! risks only a missed fire (recovered on restart), never data loss.
//! Construction runs recovery: rows still in the future are re-armed, rows
//! already past due are skipped — they stay listable and deletable but will
//! never fire. The skip is deliberate, inherited behavior; see the recovery
//! test below before changing it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bellhop_core::clock::Clock;
use bellhop_core::error::{BellhopError, Result};

use crate::notify::Notifier;
use crate::reminder::Reminder;
use crate::resolve::TimeResolver;
use crate::store::ReminderStore;
use crate::timer::TimerEngine;

pub struct ReminderManager {
    store: Arc<ReminderStore>,
    timer: TimerEngine,
    resolver: TimeResolver,
    clock: Arc<dyn Clock>,
}

impl ReminderManager {
    /// Build the manager, start its timer engine, and run recovery.
    /// Must be called within a tokio runtime.
    pub fn new(
        store: Arc<ReminderStore>,
        resolver: TimeResolver,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let timer = TimerEngine::start(move |id, text| {
            tracing::info!("📣 delivering reminder {id}");
            notifier.alert(text)
        });
        let manager = Self {
            store,
            timer,
            resolver,
            clock,
        };
        manager.recover()?;
        Ok(manager)
    }

    /// Resolve a time expression, persist the reminder, then arm it.
    /// A parse failure persists nothing; a storage failure arms nothing.
    pub fn add(&self, text: &str, when_expr: &str) -> Result<Reminder> {
        let when_utc = self.resolver.resolve(when_expr, self.clock.now())?;
        self.add_at(text, when_utc)
    }

    /// Persist and arm a reminder whose instant is already resolved.
    pub fn add_at(&self, text: &str, when_utc: DateTime<Utc>) -> Result<Reminder> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BellhopError::Invalid("reminder text is empty".into()));
        }

        // Durable before armed
        let created_utc = self.clock.now();
        let id = self.store.create(text, when_utc, created_utc)?;
        self.timer.arm(id, when_utc, text);

        tracing::info!("📅 reminder {id} set for {when_utc}");
        Ok(Reminder {
            id,
            text: text.to_string(),
            when_utc,
            created_utc,
        })
    }

    /// All reminders, ascending by fire time. Fired-but-undeleted rows are
    /// included; use [`Reminder::when_in`] to render in a display timezone.
    pub fn list(&self) -> Result<Vec<Reminder>> {
        self.store.list()
    }

    /// Delete a reminder row, then best-effort cancel its armed job.
    /// Returns the store's result: false when the ID did not exist. A job
    /// already mid-delivery may still notify after this returns.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            self.timer.cancel(id);
            tracing::info!("🗑 reminder {id} deleted");
        }
        Ok(removed)
    }

    /// The timezone used for resolving and rendering times.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.resolver.tz()
    }

    /// Stop the timer engine. Storage is untouched; everything durable is
    /// re-armed on the next startup.
    pub fn shutdown(&self) {
        self.timer.shutdown();
    }

    /// Re-arm every stored reminder still in the future. Past-due rows are
    /// not armed and will never fire; they remain listable until deleted.
    fn recover(&self) -> Result<()> {
        let now = self.clock.now();
        let mut armed = 0usize;
        let mut skipped = 0usize;

        for reminder in self.store.load_all()? {
            if reminder.when_utc > now {
                self.timer.arm(reminder.id, reminder.when_utc, &reminder.text);
                armed += 1;
            } else {
                skipped += 1;
            }
        }

        if armed > 0 || skipped > 0 {
            tracing::info!("⏰ recovery: re-armed {armed}, skipped {skipped} past due");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::RecordingNotifier;
    use bellhop_core::clock::{ManualClock, SystemClock};
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn manager_with(
        store: Arc<ReminderStore>,
        clock: Arc<dyn Clock>,
    ) -> (ReminderManager, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = ReminderManager::new(
            store,
            TimeResolver::new(chrono_tz::UTC),
            notifier.clone(),
            clock,
        )
        .unwrap();
        (manager, notifier)
    }

    #[tokio::test]
    async fn add_round_trips_through_list() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new("2026-08-26T10:00:00Z".parse().unwrap()));
        let (manager, _) = manager_with(store, clock);

        let created = manager.add("drink water", "10 minutes").unwrap();
        assert!(created.id > 0);

        let listed = manager.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "drink water");
        assert_eq!(
            listed[0].when_utc,
            "2026-08-26T10:10:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[tokio::test]
    async fn parse_failure_persists_nothing() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new("2026-08-26T10:00:00Z".parse().unwrap()));
        let (manager, _) = manager_with(store.clone(), clock);

        assert!(matches!(
            manager.add("stretch", "whenever"),
            Err(BellhopError::Parse(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new("2026-08-26T10:00:00Z".parse().unwrap()));
        let (manager, _) = manager_with(store.clone(), clock);

        assert!(matches!(
            manager.add("   ", "10 minutes"),
            Err(BellhopError::Invalid(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new("2026-08-26T10:00:00Z".parse().unwrap()));
        let (manager, _) = manager_with(store, clock);

        let r = manager.add("call mom", "2 hours").unwrap();
        assert!(manager.delete(r.id).unwrap());
        assert!(manager.list().unwrap().is_empty());
        assert!(!manager.delete(r.id).unwrap());
    }

    #[tokio::test]
    async fn recovery_arms_future_and_skips_past() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let now = Utc::now();

        // Persist directly, bypassing add: one future, one long past
        store
            .create("future", now + Duration::milliseconds(80), now)
            .unwrap();
        store.create("stale", now - Duration::hours(1), now).unwrap();

        // Fresh manager against that store, with the recovery decision
        // pinned to a fixed clock: only the future row may ever fire
        let clock = Arc::new(ManualClock::new(now));
        let (manager, notifier) = manager_with(store, clock);

        tokio::time::sleep(StdDuration::from_millis(400)).await;
        let alerts = notifier.alerts.lock().unwrap().clone();
        assert_eq!(alerts, ["future"]);

        // The skipped row is still listable
        let texts: Vec<_> = manager.list().unwrap().into_iter().map(|r| r.text).collect();
        assert!(texts.contains(&"stale".to_string()));
    }

    #[tokio::test]
    async fn fires_at_most_once_around_concurrent_calls() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let (manager, notifier) = manager_with(store, Arc::new(SystemClock));

        let due = manager
            .add_at("take a break", Utc::now() + Duration::milliseconds(60))
            .unwrap();
        // Churn list/delete around the due instant
        for _ in 0..20 {
            manager.list().unwrap();
            manager.delete(9999).unwrap();
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }

        let alerts = notifier.alerts.lock().unwrap().clone();
        assert_eq!(alerts, ["take a break"]);

        // Firing does not delete: the row is still there until removed
        assert!(manager.delete(due.id).unwrap());
    }

    #[tokio::test]
    async fn fired_reminder_stays_listable() {
        let store = Arc::new(ReminderStore::open_in_memory().unwrap());
        let (manager, notifier) = manager_with(store, Arc::new(SystemClock));

        manager
            .add_at("standup", Utc::now() + Duration::milliseconds(50))
            .unwrap();
        tokio::time::sleep(StdDuration::from_millis(300)).await;

        assert_eq!(notifier.alerts.lock().unwrap().len(), 1);
        assert_eq!(manager.list().unwrap().len(), 1);
    }
}
