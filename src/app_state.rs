// src/app_state.rs

use crate::config::{DEFAULT_WEIGHT, SAMPLE_ENTRIES};
use crate::entry::{Entry, EntryId, EntryStore};
use crate::error::{PersistenceError, ValidationError};
use crate::history_manager::{HistoryLedger, HistoryRecord};
use crate::storage::PersistenceGateway;
use chrono::{DateTime, Utc};

/// The entry pool and the draw history, together with the gateway that
/// persists them.
///
/// Every successful mutation flushes both collections. Flush failures are
/// logged and swallowed; memory stays authoritative and the next mutation
/// retries the full write.
pub struct AppState {
    entries: EntryStore,
    history: HistoryLedger,
    gateway: PersistenceGateway,
}

impl AppState {
    /// Loads both collections through `gateway`. A collection that is
    /// missing starts empty; one that cannot be read is logged and starts empty.
    pub fn load(gateway: PersistenceGateway) -> Self {
        let entries = gateway.load_entries().unwrap_or_else(|e| {
            log::warn!("Could not load entries ({}). Starting with an empty pool.", e);
            EntryStore::new()
        });
        let history = gateway.load_history().unwrap_or_else(|e| {
            log::warn!("Could not load history ({}). Starting with empty history.", e);
            HistoryLedger::new()
        });
        log::debug!(
            "Loaded {} entries and {} history records",
            entries.len(),
            history.len()
        );

        AppState {
            entries,
            history,
            gateway,
        }
    }

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn add_entry(&mut self, name: &str, weight: f64) -> Result<Entry, ValidationError> {
        let entry = self.entries.add(name, weight)?.clone();
        self.persist();
        Ok(entry)
    }

    /// Removes an entry. History is untouched.
    pub fn remove_entry(&mut self, id: EntryId) -> Option<Entry> {
        let removed = self.entries.remove(id)?;
        self.persist();
        Some(removed)
    }

    pub fn set_weight(&mut self, id: EntryId, weight: f64) -> Result<(), ValidationError> {
        self.entries.set_weight(id, weight)?;
        self.persist();
        Ok(())
    }

    /// Applies several weight edits, skipping invalid ones. Persists only if
    /// something changed.
    pub fn apply_weights(&mut self, edits: &[(EntryId, f64)]) -> usize {
        let changed = self.entries.apply_weights(edits);
        if changed > 0 {
            self.persist();
        }
        changed
    }

    pub fn reset_all_weights(&mut self) {
        self.entries.reset_all_weights();
        self.persist();
    }

    /// Empties the ledger. Safe on an empty ledger.
    pub fn clear_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.history.clear();
        self.persist();
    }

    /// Clears both collections. Returns `false` if there was nothing to clear.
    pub fn reset_all(&mut self) -> bool {
        if self.entries.is_empty() && self.history.is_empty() {
            return false;
        }
        self.entries.clear();
        self.history.clear();
        self.persist();
        true
    }

    /// Seeds the sample entries when the pool is empty. Returns how many were added.
    pub fn add_sample_entries(&mut self) -> usize {
        if !self.entries.is_empty() {
            return 0;
        }
        let mut added = 0;
        for name in SAMPLE_ENTRIES {
            if self.entries.add(name, DEFAULT_WEIGHT).is_ok() {
                added += 1;
            }
        }
        self.persist();
        added
    }

    /// Appends a draw outcome to the ledger and persists.
    pub(crate) fn record_draw(
        &mut self,
        winner: &Entry,
        probability_percent: f64,
        timestamp: DateTime<Utc>,
    ) -> HistoryRecord {
        let record = self
            .history
            .record(&winner.name, winner.weight, probability_percent, timestamp)
            .clone();
        self.persist();
        record
    }

    /// Writes both collections, reporting failure to the caller.
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        self.gateway.flush(&self.entries, &self.history)
    }

    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to save lottery data: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Memory store shared with the test so writes can be inspected.
    #[derive(Clone, Default)]
    struct SharedStore {
        inner: Arc<Mutex<MemoryStore>>,
        fail_writes: bool,
    }

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
            self.inner.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.inner.lock().unwrap().set(key, value)
        }
    }

    fn reload(store: &SharedStore) -> AppState {
        AppState::load(PersistenceGateway::new(store.clone()))
    }

    #[test]
    fn test_mutations_are_persisted() {
        let store = SharedStore::default();
        let mut state = reload(&store);

        let a = state.add_entry("A", 1.0).unwrap();
        state.add_entry("B", 2.0).unwrap();
        state.set_weight(a.id, 4.0).unwrap();

        let reloaded = reload(&store);
        assert_eq!(reloaded.entries().list(), state.entries().list());
        assert_eq!(reloaded.entries().get(a.id).unwrap().weight, 4.0);
    }

    #[test]
    fn test_failed_validation_changes_nothing() {
        let store = SharedStore::default();
        let mut state = reload(&store);
        state.add_entry("A", 1.0).unwrap();

        assert_eq!(
            state.add_entry("A", 3.0).unwrap_err(),
            ValidationError::DuplicateName("A".into())
        );
        assert_eq!(state.entries().len(), 1);
        assert_eq!(reload(&store).entries().len(), 1);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let store = SharedStore::default();
        store.inner.lock().unwrap().set("entries", b"{oops").unwrap();
        store.inner.lock().unwrap().set("history", b"42").unwrap();

        let state = reload(&store);
        assert!(state.entries().is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let store = SharedStore {
            fail_writes: true,
            ..SharedStore::default()
        };
        let mut state = reload(&store);

        let a = state.add_entry("A", 1.0).unwrap();
        assert_eq!(state.entries().len(), 1);
        assert!(state.flush().is_err());
        assert!(state.remove_entry(a.id).is_some());
        assert!(state.entries().is_empty());
    }

    #[test]
    fn test_remove_does_not_touch_history() {
        let store = SharedStore::default();
        let mut state = reload(&store);
        let a = state.add_entry("A", 1.0).unwrap();
        state.record_draw(&a, 100.0, Utc::now());

        state.remove_entry(a.id).unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history().records()[0].winner_name, "A");
        assert_eq!(reload(&store).history().len(), 1);
    }

    #[test]
    fn test_clear_history_and_reset_all() {
        let store = SharedStore::default();
        let mut state = reload(&store);
        state.clear_history();
        assert!(state.history().is_empty());
        assert!(!state.reset_all());

        let a = state.add_entry("A", 1.0).unwrap();
        state.record_draw(&a, 100.0, Utc::now());
        state.clear_history();
        assert!(state.history().is_empty());
        assert_eq!(state.entries().len(), 1);

        assert!(state.reset_all());
        assert!(state.entries().is_empty());
        let reloaded = reload(&store);
        assert!(reloaded.entries().is_empty());
        assert!(reloaded.history().is_empty());
    }

    #[test]
    fn test_sample_entries_only_seed_empty_pool() {
        let store = SharedStore::default();
        let mut state = reload(&store);

        assert_eq!(state.add_sample_entries(), SAMPLE_ENTRIES.len());
        assert_eq!(state.add_sample_entries(), 0);
        assert!(state.entries().list().iter().all(|e| e.weight == 1.0));
        assert_eq!(reload(&store).entries().len(), SAMPLE_ENTRIES.len());
    }

    #[test]
    fn test_apply_weights_and_reset() {
        let store = SharedStore::default();
        let mut state = reload(&store);
        let a = state.add_entry("A", 1.0).unwrap();

        assert_eq!(state.apply_weights(&[(a.id, 0.0)]), 0);
        assert_eq!(state.apply_weights(&[(a.id, 2.5)]), 1);
        assert_eq!(reload(&store).entries().get(a.id).unwrap().weight, 2.5);

        state.reset_all_weights();
        assert_eq!(reload(&store).entries().get(a.id).unwrap().weight, 1.0);
    }
}
