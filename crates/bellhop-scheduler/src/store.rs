//! SQLite-backed persistence for reminders.
//!
//! The store exclusively owns the durable records; armed timer jobs are
//! transient references to them. A single connection behind a mutex
//! serializes access from the caller's context and the timer-firing context,
//! so create/delete interleavings cannot corrupt the row set or the ID
//! sequence. AUTOINCREMENT keeps IDs monotonically increasing and never
//! reused, even after deletes.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use bellhop_core::error::{BellhopError, Result};

use crate::reminder::Reminder;

/// Durable CRUD for reminder rows.
pub struct ReminderStore {
    conn: Mutex<Connection>,
}

impl ReminderStore {
    /// Open or create the reminders database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BellhopError::Storage(format!("create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory database, used in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.lock()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS reminders (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    when_utc TEXT NOT NULL,
                    created_utc TEXT NOT NULL
                );",
            )
            .map_err(storage)
    }

    /// Insert a new reminder row and return the assigned ID.
    pub fn create(
        &self,
        text: &str,
        when_utc: DateTime<Utc>,
        created_utc: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reminders (text, when_utc, created_utc) VALUES (?1, ?2, ?3)",
            rusqlite::params![text, when_utc.to_rfc3339(), created_utc.to_rfc3339()],
        )
        .map_err(storage)?;
        Ok(conn.last_insert_rowid())
    }

    /// All reminders, ascending by fire time regardless of insertion order.
    pub fn list(&self) -> Result<Vec<Reminder>> {
        self.select("SELECT id, text, when_utc, created_utc FROM reminders ORDER BY when_utc ASC")
    }

    /// All reminders in storage order. Used only during startup recovery,
    /// where ordering is irrelevant.
    pub fn load_all(&self) -> Result<Vec<Reminder>> {
        self.select("SELECT id, text, when_utc, created_utc FROM reminders")
    }

    /// Remove a row. Returns false (not an error) when the ID does not exist.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self
            .lock()?
            .execute("DELETE FROM reminders WHERE id = ?1", [id])
            .map_err(storage)?;
        Ok(removed > 0)
    }

    fn select(&self, sql: &str) -> Result<Vec<Reminder>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(storage)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(storage)?;

        let mut reminders = Vec::new();
        for row in rows {
            let (id, text, when_iso, created_iso) = row.map_err(storage)?;
            reminders.push(Reminder {
                id,
                text,
                when_utc: parse_instant(&when_iso)?,
                created_utc: parse_instant(&created_iso)?,
            });
        }
        Ok(reminders)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| BellhopError::Storage(format!("store lock poisoned: {e}")))
    }
}

fn parse_instant(iso: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(iso)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| BellhopError::Storage(format!("bad timestamp '{iso}': {e}")))
}

fn storage(e: rusqlite::Error) -> BellhopError {
    BellhopError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn create_then_list_round_trips() {
        let store = ReminderStore::open_in_memory().unwrap();
        let when = instant("2026-09-01T17:30:00Z");
        let created = instant("2026-08-26T10:00:00Z");

        let id = store.create("call mom", when, created).unwrap();
        assert!(id > 0);

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].text, "call mom");
        assert_eq!(listed[0].when_utc, when);
        assert_eq!(listed[0].created_utc, created);
    }

    #[test]
    fn list_orders_by_fire_time_not_insertion() {
        let store = ReminderStore::open_in_memory().unwrap();
        let base = instant("2026-09-01T12:00:00Z");
        let created = instant("2026-08-26T10:00:00Z");

        store.create("third", base + Duration::hours(3), created).unwrap();
        store.create("first", base + Duration::hours(1), created).unwrap();
        store.create("second", base + Duration::hours(2), created).unwrap();

        let texts: Vec<_> = store.list().unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn delete_reports_hit_and_miss() {
        let store = ReminderStore::open_in_memory().unwrap();
        let when = instant("2026-09-01T17:30:00Z");
        let id = store.create("stretch", when, when).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(store.list().unwrap().is_empty());

        // Missing ID is a false, not an error
        assert!(!store.delete(id).unwrap());
        assert!(!store.delete(9999).unwrap());
    }

    #[test]
    fn open_surfaces_unusable_path_as_storage_error() {
        let dir = std::env::temp_dir().join("bellhop-store-bad-parent");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        // Parent of the db path is a regular file
        let res = ReminderStore::open(&blocker.join("reminders.db"));
        assert!(matches!(res, Err(BellhopError::Storage(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let store = ReminderStore::open_in_memory().unwrap();
        let when = instant("2026-09-01T17:30:00Z");

        let a = store.create("a", when, when).unwrap();
        let b = store.create("b", when, when).unwrap();
        assert!(b > a);

        store.delete(b).unwrap();
        let c = store.create("c", when, when).unwrap();
        // AUTOINCREMENT: a deleted ID does not come back
        assert!(c > b);
    }

    #[test]
    fn load_all_returns_every_row() {
        let store = ReminderStore::open_in_memory().unwrap();
        let when = instant("2026-09-01T17:30:00Z");
        store.create("a", when, when).unwrap();
        store.create("b", when - Duration::days(2), when).unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
    }
}
