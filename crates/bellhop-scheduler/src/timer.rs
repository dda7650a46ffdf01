//! Timer engine — fires a callback at an absolute instant, at most once
//! per armed job, with best-effort cancellation.
//!
//! A single background tokio task owns the wait loop for the engine's
//! lifetime. It sleeps until the earliest pending due instant and is woken
//! early whenever `arm` or `cancel` mutates the pending set, so a newly
//! armed job with an earlier deadline takes effect immediately. A due job
//! is removed from the pending set before its callback runs; callback
//! errors are logged and discarded, never retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use bellhop_core::error::Result;

/// Re-check at least daily so far-future deadlines never overflow the
/// sleep timer.
const MAX_WAIT: StdDuration = StdDuration::from_secs(24 * 60 * 60);

type OnFire = Arc<dyn Fn(i64, &str) -> Result<()> + Send + Sync>;

struct ArmedJob {
    due: DateTime<Utc>,
    payload: String,
}

struct EngineInner {
    pending: Mutex<HashMap<i64, ArmedJob>>,
    wake: Notify,
    on_fire: OnFire,
}

/// In-memory timer over the pending-job set.
///
/// Not authoritative: the store owns the durable records, the engine holds
/// at most one transient armed job per live reminder.
pub struct TimerEngine {
    inner: Arc<EngineInner>,
    handle: JoinHandle<()>,
}

impl TimerEngine {
    /// Start the engine and its background wait loop. The loop runs until
    /// `shutdown` or drop; stopping it has no side effects on storage.
    pub fn start<F>(on_fire: F) -> Self
    where
        F: Fn(i64, &str) -> Result<()> + Send + Sync + 'static,
    {
        let inner = Arc::new(EngineInner {
            pending: Mutex::new(HashMap::new()),
            wake: Notify::new(),
            on_fire: Arc::new(on_fire),
        });
        let handle = tokio::spawn(run(inner.clone()));
        Self { inner, handle }
    }

    /// Register a job. Re-arming an already-armed ID replaces the old job
    /// rather than duplicating it.
    pub fn arm(&self, id: i64, when_utc: DateTime<Utc>, payload: &str) {
        if when_utc <= Utc::now() {
            // Race with the clock, not fatal: the job fires on the next
            // loop turn instead of sticking.
            tracing::warn!("scheduler fault: job {id} armed past due, firing immediately");
        }
        let mut pending = lock_pending(&self.inner);
        if pending
            .insert(
                id,
                ArmedJob {
                    due: when_utc,
                    payload: payload.to_string(),
                },
            )
            .is_some()
        {
            tracing::debug!("re-armed job {id}, previous registration replaced");
        }
        drop(pending);
        self.inner.wake.notify_one();
    }

    /// Best-effort removal of a pending job. A job that has already begun
    /// firing may still deliver its notification; callers must not assume
    /// cancellation beats an in-flight delivery.
    pub fn cancel(&self, id: i64) -> bool {
        let removed = lock_pending(&self.inner).remove(&id).is_some();
        if removed {
            self.inner.wake.notify_one();
        }
        removed
    }

    /// Number of armed jobs.
    pub fn armed_count(&self) -> usize {
        lock_pending(&self.inner).len()
    }

    /// Stop the background loop. Pending jobs are simply dropped; the store
    /// still holds their rows.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(inner: Arc<EngineInner>) {
    loop {
        let next_due = lock_pending(&inner).values().map(|j| j.due).min();

        match next_due {
            None => inner.wake.notified().await,
            Some(due) => {
                let wait = (due - Utc::now())
                    .to_std()
                    .unwrap_or(StdDuration::ZERO)
                    .min(MAX_WAIT);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => fire_due(&inner),
                    _ = inner.wake.notified() => {} // pending set changed, recompute
                }
            }
        }
    }
}

fn fire_due(inner: &Arc<EngineInner>) {
    let now = Utc::now();
    let mut due_jobs: Vec<(i64, ArmedJob)> = {
        let mut pending = lock_pending(inner);
        let ids: Vec<i64> = pending
            .iter()
            .filter(|(_, job)| job.due <= now)
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| pending.remove(&id).map(|job| (id, job)))
            .collect()
    };
    due_jobs.sort_by_key(|(_, job)| job.due);

    for (id, job) in due_jobs {
        tracing::info!("🔔 job {id} due, firing");
        if let Err(e) = (inner.on_fire.as_ref())(id, &job.payload) {
            // No retry: log and discard
            tracing::warn!("⚠️ fire callback failed for job {id}: {e}");
        }
    }
}

fn lock_pending(inner: &Arc<EngineInner>) -> std::sync::MutexGuard<'_, HashMap<i64, ArmedJob>> {
    // The lock is only held for map mutation, never across an await or
    // a callback, so poisoning means a panic already took the process down.
    inner
        .pending
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
