//! Save storage — where encoded snapshots live between sessions.
//!
//! RULE: Only store.rs talks to the storage medium.
//! A slot holds exactly one encoded snapshot; saving overwrites it.
//! A slot that was never written reads back as `None`, not an error.

use crate::error::{GameError, GameResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

/// A key/value medium holding encoded save text.
pub trait SaveMedium: Send {
    /// Read the slot under `key`, if it was ever written.
    fn load(&self, key: &str) -> GameResult<Option<String>>;

    /// Overwrite the slot under `key`.
    fn save(&self, key: &str, payload: &str) -> GameResult<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_save_slot.sql"))?;
        Ok(())
    }

    /// Epoch millis of the last write to `key`.
    pub fn saved_at(&self, key: &str) -> GameResult<Option<i64>> {
        let at = self
            .conn
            .query_row(
                "SELECT saved_at FROM save_slot WHERE slot_key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(at)
    }

    /// Number of slots in the database.
    pub fn slot_count(&self) -> GameResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM save_slot", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl SaveMedium for SqliteStore {
    fn load(&self, key: &str) -> GameResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM save_slot WHERE slot_key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save(&self, key: &str, payload: &str) -> GameResult<()> {
        let saved_at = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO save_slot (slot_key, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot_key) DO UPDATE SET payload = excluded.payload,
                                                 saved_at = excluded.saved_at",
            params![key, payload, saved_at],
        )?;
        Ok(())
    }
}

/// In-process medium. Clones share the same slots, so a test can keep a
/// handle after giving one to the scheduler.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots:       Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    writes:      Arc<Mutex<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot, as if a previous session had saved it.
    pub fn with_slot(self, key: &str, payload: &str) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.to_string(), payload.to_string());
        }
        self
    }

    /// Make every subsequent write fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes.lock().map(|n| *n).unwrap_or(0)
    }

    /// Current contents of a slot.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.slots.lock().ok().and_then(|slots| slots.get(key).cloned())
    }
}

impl SaveMedium for MemoryStore {
    fn load(&self, key: &str) -> GameResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| GameError::Other(anyhow::anyhow!("save slots lock poisoned")))?;
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, payload: &str) -> GameResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GameError::Other(anyhow::anyhow!("storage unavailable")));
        }
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| GameError::Other(anyhow::anyhow!("save slots lock poisoned")))?;
        slots.insert(key.to_string(), payload.to_string());
        if let Ok(mut n) = self.writes.lock() {
            *n += 1;
        }
        Ok(())
    }
}
