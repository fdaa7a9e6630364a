// src/entry.rs

use crate::config::DEFAULT_WEIGHT;
use crate::error::ValidationError;
use crate::selector::percent_of;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier of an entry or history record. Unique within its collection.
pub type EntryId = u64;

/// Returns a fresh id, based on the current time in milliseconds so ids stay
/// readable as creation moments.
///
/// # Arguments
///
/// * `last` - The highest id issued so far in the collection.
/// * `taken` - Reports whether an id is currently in use.
///
/// Ids are normally greater than `last`. Once `last` reaches `u64::MAX` the
/// lowest id not in use is returned instead.
pub(crate) fn next_id(last: EntryId, taken: impl Fn(EntryId) -> bool) -> EntryId {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    match last.checked_add(1) {
        Some(next) => now.max(next),
        // Collections are far smaller than the id space, so a free id always exists.
        None => (1..=EntryId::MAX).find(|id| !taken(*id)).unwrap_or(0),
    }
}

/// Checks that `weight` is a usable selection weight (positive and finite).
pub fn check_weight(weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveWeight(weight))
    }
}

/// A named candidate in the draw pool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub weight: f64,
}

/// Ordered pool of entries. Insertion order is preserved and drives both
/// display order and the selection walk.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
    last_id: EntryId,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from entries that were already validated (e.g. by the
    /// persistence layer).
    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        EntryStore { entries, last_id }
    }

    /// Adds a new entry at the end of the pool.
    ///
    /// The name is trimmed before use.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is blank, the weight is not a
    /// positive finite number, or another entry already has this name.
    pub fn add(&mut self, name: &str, weight: f64) -> Result<&Entry, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check_weight(weight)?;
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ValidationError::DuplicateName(name.to_string()));
        }
        if !(self.total_weight() + weight).is_finite() {
            return Err(ValidationError::TotalWeightOverflow);
        }

        let entries = &self.entries;
        let id = next_id(self.last_id, |id| entries.iter().any(|e| e.id == id));
        self.last_id = self.last_id.max(id);
        self.entries.push(Entry {
            id,
            name: name.to_string(),
            weight,
        });
        log::debug!("Added entry '{}' (id {}, weight {})", name, id, weight);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Removes the entry with `id`, returning it. `None` if no such entry exists.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Replaces the weight of one entry in place.
    ///
    /// # Errors
    ///
    /// `NonPositiveWeight` for zero, negative, NaN or infinite weights;
    /// `UnknownEntry` if `id` is not in the pool; `TotalWeightOverflow` if the
    /// pool total would no longer be finite. The prior weight is kept on error.
    pub fn set_weight(&mut self, id: EntryId, weight: f64) -> Result<(), ValidationError> {
        check_weight(weight)?;
        let current = self
            .get(id)
            .map(|e| e.weight)
            .ok_or(ValidationError::UnknownEntry(id))?;
        if !(self.total_weight() - current + weight).is_finite() {
            return Err(ValidationError::TotalWeightOverflow);
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.weight = weight;
        }
        Ok(())
    }

    /// Applies several weight edits at once, in order. Invalid weights, unknown
    /// ids, unchanged values and edits that would overflow the total are
    /// skipped. Returns how many entries changed.
    pub fn apply_weights(&mut self, edits: &[(EntryId, f64)]) -> usize {
        let mut changed = 0;
        for &(id, weight) in edits {
            if self.get(id).map_or(true, |e| e.weight == weight) {
                continue;
            }
            if self.set_weight(id, weight).is_ok() {
                changed += 1;
            }
        }
        changed
    }

    /// Sets every entry's weight back to 1.
    pub fn reset_all_weights(&mut self) {
        for entry in &mut self.entries {
            entry.weight = DEFAULT_WEIGHT;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights; `0.0` for an empty pool.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Each entry paired with its current chance of winning, in percent
    /// rounded to one decimal.
    pub fn probabilities(&self) -> Vec<(&Entry, f64)> {
        let total = self.total_weight();
        self.entries
            .iter()
            .map(|e| (e, percent_of(e.weight, total)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(store: &EntryStore) -> Vec<&str> {
        store.list().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_add_preserves_insertion_order_and_unique_ids() {
        let mut store = EntryStore::new();
        let a = store.add("A", 1.0).unwrap().id;
        let b = store.add("B", 3.0).unwrap().id;
        let c = store.add("  C  ", 0.5).unwrap().id;

        assert_eq!(names(&store), vec!["A", "B", "C"]);
        assert!(a < b && b < c);
        assert!((store.total_weight() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut store = EntryStore::new();
        assert_eq!(store.add("   ", 1.0).unwrap_err(), ValidationError::EmptyName);
        assert_eq!(
            store.add("A", 0.0).unwrap_err(),
            ValidationError::NonPositiveWeight(0.0)
        );
        assert_eq!(
            store.add("A", -2.0).unwrap_err(),
            ValidationError::NonPositiveWeight(-2.0)
        );
        assert!(store.add("A", f64::NAN).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_total_weight_must_stay_finite() {
        let mut store = EntryStore::new();
        let a = store.add("A", 1e308).unwrap().id;
        assert_eq!(
            store.add("B", 1e308).unwrap_err(),
            ValidationError::TotalWeightOverflow
        );
        assert_eq!(store.len(), 1);

        let b = store.add("B", 1.0).unwrap().id;
        assert_eq!(
            store.set_weight(b, 1e308).unwrap_err(),
            ValidationError::TotalWeightOverflow
        );
        assert_eq!(store.get(b).unwrap().weight, 1.0);
        assert_eq!(store.apply_weights(&[(b, 1e308)]), 0);

        // Lowering the heavy entry first makes room for the second one.
        assert_eq!(store.apply_weights(&[(a, 5e307), (b, 5e307)]), 2);
        assert!(store.total_weight().is_finite());
        let probs: Vec<f64> = store.probabilities().iter().map(|(_, p)| *p).collect();
        assert_eq!(probs, vec![50.0, 50.0]);
    }

    #[test]
    fn test_duplicate_name_is_rejected_once_added() {
        let mut store = EntryStore::new();
        store.add("A", 1.0).unwrap();
        assert_eq!(
            store.add("A", 2.0).unwrap_err(),
            ValidationError::DuplicateName("A".into())
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].weight, 1.0);

        // Names are compared case-sensitively.
        store.add("a", 1.0).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut store = EntryStore::new();
        let a = store.add("A", 1.0).unwrap().id;
        store.add("B", 1.0).unwrap();

        let removed = store.remove(a).unwrap();
        assert_eq!(removed.name, "A");
        assert_eq!(names(&store), vec!["B"]);
        assert!(store.remove(a).is_none());
    }

    #[test]
    fn test_set_weight_rejects_bad_values_and_keeps_prior() {
        let mut store = EntryStore::new();
        let id = store.add("A", 2.0).unwrap().id;

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(store.set_weight(id, bad).is_err());
            assert_eq!(store.get(id).unwrap().weight, 2.0);
        }

        store.set_weight(id, 5.5).unwrap();
        assert_eq!(store.get(id).unwrap().weight, 5.5);
        assert_eq!(
            store.set_weight(id + 1, 1.0).unwrap_err(),
            ValidationError::UnknownEntry(id + 1)
        );
    }

    #[test]
    fn test_set_weight_keeps_position() {
        let mut store = EntryStore::new();
        store.add("A", 1.0).unwrap();
        let b = store.add("B", 1.0).unwrap().id;
        store.add("C", 1.0).unwrap();

        store.set_weight(b, 9.0).unwrap();
        assert_eq!(names(&store), vec!["A", "B", "C"]);
        assert_eq!(store.list()[1].weight, 9.0);
    }

    #[test]
    fn test_apply_weights_skips_invalid_and_unchanged() {
        let mut store = EntryStore::new();
        let a = store.add("A", 1.0).unwrap().id;
        let b = store.add("B", 2.0).unwrap().id;

        let changed = store.apply_weights(&[(a, 4.0), (b, 2.0), (b, -1.0), (999, 3.0)]);
        assert_eq!(changed, 1);
        assert_eq!(store.get(a).unwrap().weight, 4.0);
        assert_eq!(store.get(b).unwrap().weight, 2.0);
    }

    #[test]
    fn test_reset_all_weights() {
        let mut store = EntryStore::new();
        store.add("A", 0.3).unwrap();
        store.add("B", 7.0).unwrap();
        store.reset_all_weights();
        assert!(store.list().iter().all(|e| e.weight == 1.0));
    }

    #[test]
    fn test_probabilities_and_empty_total() {
        let mut store = EntryStore::new();
        assert_eq!(store.total_weight(), 0.0);
        assert!(store.probabilities().is_empty());

        store.add("A", 1.0).unwrap();
        store.add("B", 2.0).unwrap();
        let probs: Vec<f64> = store.probabilities().iter().map(|(_, p)| *p).collect();
        assert_eq!(probs, vec![33.3, 66.7]);
    }

    #[test]
    fn test_from_entries_continues_id_sequence() {
        let mut store = EntryStore::from_entries(vec![Entry {
            id: u64::MAX - 1,
            name: "A".into(),
            weight: 1.0,
        }]);
        let id = store.add("B", 1.0).unwrap().id;
        assert_eq!(id, u64::MAX);
    }

    #[test]
    fn test_exhausted_id_counter_reuses_free_ids() {
        let mut store = EntryStore::from_entries(vec![
            Entry {
                id: 1,
                name: "A".into(),
                weight: 1.0,
            },
            Entry {
                id: u64::MAX,
                name: "B".into(),
                weight: 1.0,
            },
        ]);
        let c = store.add("C", 1.0).unwrap().id;
        let d = store.add("D", 1.0).unwrap().id;
        assert_eq!((c, d), (2, 3));

        let mut ids: Vec<u64> = store.list().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
