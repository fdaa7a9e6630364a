// src/storage.rs

use crate::config::{ENTRIES_KEY, HISTORY_KEY};
use crate::entry::{check_weight, Entry, EntryStore};
use crate::error::PersistenceError;
use crate::history_manager::{HistoryLedger, HistoryRecord};
use std::collections::{HashMap, HashSet};
use std::io;

/// A key-value byte store holding the persisted collections.
pub trait KeyValueStore: Send {
    /// Returns the bytes stored under `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Overwrites the value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()>;
}

/// Volatile store, for tests and sessions that should not touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Reads and writes the entry pool and the history ledger as JSON arrays.
/// Every write replaces the whole collection.
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        PersistenceGateway {
            store: Box::new(store),
        }
    }

    /// Loads the entry pool. A missing key yields an empty store.
    ///
    /// # Errors
    ///
    /// I/O and JSON failures, plus schema violations: blank or duplicate
    /// names, duplicate ids, or weights that are not positive finite numbers.
    pub fn load_entries(&self) -> Result<EntryStore, PersistenceError> {
        let entries: Vec<Entry> = match self.read_json(ENTRIES_KEY)? {
            Some(entries) => entries,
            None => return Ok(EntryStore::new()),
        };

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(schema(ENTRIES_KEY, format!("entry {} has an empty name", entry.id)));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(schema(ENTRIES_KEY, format!("duplicate name '{}'", entry.name)));
            }
            if !ids.insert(entry.id) {
                return Err(schema(ENTRIES_KEY, format!("duplicate id {}", entry.id)));
            }
            if let Err(e) = check_weight(entry.weight) {
                return Err(schema(ENTRIES_KEY, format!("entry '{}': {}", entry.name, e)));
            }
        }
        if !entries.iter().map(|e| e.weight).sum::<f64>().is_finite() {
            return Err(schema(ENTRIES_KEY, "total weight is not finite".to_string()));
        }

        Ok(EntryStore::from_entries(entries))
    }

    /// Loads the history ledger, newest first. A missing key yields an empty
    /// ledger; anything beyond the capacity is dropped.
    ///
    /// # Errors
    ///
    /// I/O and JSON failures (including unparsable probabilities), duplicate
    /// ids, and winner weights that are not positive finite numbers.
    pub fn load_history(&self) -> Result<HistoryLedger, PersistenceError> {
        let records: Vec<HistoryRecord> = match self.read_json(HISTORY_KEY)? {
            Some(records) => records,
            None => return Ok(HistoryLedger::new()),
        };

        let mut ids = HashSet::new();
        for record in &records {
            if !ids.insert(record.id) {
                return Err(schema(HISTORY_KEY, format!("duplicate id {}", record.id)));
            }
            if let Err(e) = check_weight(record.winner_weight) {
                return Err(schema(HISTORY_KEY, format!("record {}: {}", record.id, e)));
            }
        }

        Ok(HistoryLedger::from_records(records))
    }

    pub fn save_entries(&mut self, entries: &EntryStore) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(entries.list())?;
        self.store.set(ENTRIES_KEY, &bytes)?;
        Ok(())
    }

    pub fn save_history(&mut self, ledger: &HistoryLedger) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(ledger.records())?;
        self.store.set(HISTORY_KEY, &bytes)?;
        Ok(())
    }

    /// Writes both collections. Both writes are attempted even if the first
    /// fails; the first error is returned.
    pub fn flush(&mut self, entries: &EntryStore, ledger: &HistoryLedger) -> Result<(), PersistenceError> {
        let entries_result = self.save_entries(entries);
        let history_result = self.save_history(ledger);
        entries_result.and(history_result)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn schema(key: &str, reason: String) -> PersistenceError {
    PersistenceError::Schema {
        key: key.to_string(),
        reason,
    }
}
