//! Durable key/value storage for the orchestration agent's snapshot.
//!
//! # Table design
//!
//! A single `AGENT_STATE` table keyed by a short string. The snapshot lives
//! under [`STATE_KEY`] as JSON bytes; every write replaces the whole value
//! inside one redb write transaction, so a reader sees either the previous
//! snapshot or the new one, never a mix.

use std::path::Path;
use std::sync::Mutex;

use redb::{Database, TableDefinition};

use crate::error::{GtmError, Result};
use crate::state::Snapshot;

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

/// Key: logical record name. Value: JSON-encoded record.
const AGENT_STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("agent_state");

pub const STATE_KEY: &str = "state";

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Get/put persistence for the aggregate.
///
/// Implementations are synchronous; async callers run them on a blocking
/// thread.
pub trait StateStore: Send + Sync {
    /// `Ok(None)` means no state was ever written.
    fn load(&self) -> Result<Option<Snapshot>>;

    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

// ---------------------------------------------------------------------------
// RedbStore
// ---------------------------------------------------------------------------

/// File-backed store using redb.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the redb database at `path`.
    ///
    /// Creates the parent directory and the `AGENT_STATE` table if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        // Ensure the table exists before any reads
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(AGENT_STATE).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(AGENT_STATE).map_err(store_err)?;
        let value = table.get(key).map_err(store_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn put_raw(&self, key: &str, value: &[u8]) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(AGENT_STATE).map_err(store_err)?;
            table.insert(key, value).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }
}

impl StateStore for RedbStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        match self.get_raw(STATE_KEY)? {
            Some(bytes) => Snapshot::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = snapshot.to_bytes()?;
        self.put_raw(STATE_KEY, &bytes)
    }
}

fn store_err(e: impl std::fmt::Display) -> GtmError {
    GtmError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store for tests and throwaway runs.
///
/// Holds the encoded bytes rather than the value so it exercises the same
/// encode/decode path as the file store. `fail_writes` simulates a storage
/// outage.
#[derive(Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
    fail_writes: std::sync::atomic::AtomicBool,
    writes: std::sync::atomic::AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw bytes already "on disk".
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> u64 {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let guard = self
            .bytes
            .lock()
            .map_err(|_| GtmError::Store("memory store poisoned".into()))?;
        match guard.as_deref() {
            Some(bytes) => Snapshot::from_bytes(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(GtmError::Store("simulated write failure".into()));
        }
        let bytes = snapshot.to_bytes()?;
        let mut guard = self
            .bytes
            .lock()
            .map_err(|_| GtmError::Store("memory store poisoned".into()))?;
        *guard = Some(bytes);
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EscalationAction;
    use chrono::Utc;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RedbStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(&dir.path().join("state.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_store_loads_none() {
        let (_dir, store) = open_tmp();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let (_dir, store) = open_tmp();
        let mut snapshot = Snapshot::baseline(Utc::now());
        snapshot
            .resolve_escalation("ESC-001", EscalationAction::Approve, Utc::now())
            .unwrap();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn save_overwrites_previous_value() {
        let (_dir, store) = open_tmp();
        let first = Snapshot::baseline(Utc::now());
        store.save(&first).unwrap();
        let mut second = first.clone();
        second.state.metrics.clear();
        store.save(&second).unwrap();
        assert!(store.load().unwrap().unwrap().state.metrics.is_empty());
    }

    #[test]
    fn reopen_sees_committed_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.redb");
        let snapshot = Snapshot::baseline(Utc::now());
        {
            let store = RedbStore::open(&path).unwrap();
            store.save(&snapshot).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn corrupt_value_is_reported_not_reseeded() {
        let (_dir, store) = open_tmp();
        store.put_raw(STATE_KEY, b"\x00garbage").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, GtmError::CorruptState(_)));
    }

    #[test]
    fn memory_store_failure_switch() {
        let store = MemoryStore::new();
        let snapshot = Snapshot::baseline(Utc::now());
        store.set_fail_writes(true);
        assert!(matches!(store.save(&snapshot), Err(GtmError::Store(_))));
        assert!(store.load().unwrap().is_none());
        store.set_fail_writes(false);
        store.save(&snapshot).unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }
}
