// src/history_manager.rs

use crate::config::{HISTORY_CAPACITY, TIMESTAMP_FORMAT};
use crate::entry::{next_id, EntryId};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one past draw. Holds the winner by value so later edits to the
/// pool never rewrite history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: EntryId,
    /// Name of the winning entry at draw time.
    #[serde(rename = "winner")]
    pub winner_name: String,
    /// Weight of the winning entry at draw time.
    #[serde(rename = "weight")]
    pub winner_weight: f64,
    /// Chance the winner had, in percent with one decimal.
    /// Stored as a string such as `"75.0"`.
    #[serde(rename = "probability", with = "one_decimal")]
    pub probability_percent: f64,
    /// The UTC timestamp of the draw.
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Timestamp as shown to users, in local time.
    pub fn formatted_timestamp(&self) -> String {
        DateTime::<Local>::from(self.timestamp)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// One flattened row of the exported history.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// 1-based, counting down from the ledger length (newest row has the largest index).
    pub index: usize,
    pub winner_name: String,
    pub winner_weight: f64,
    pub probability_percent: f64,
    pub formatted_timestamp: String,
}

/// Capped log of past draws, newest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    records: Vec<HistoryRecord>,
    last_id: EntryId,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from records already ordered newest first, dropping
    /// anything past the capacity.
    pub(crate) fn from_records(mut records: Vec<HistoryRecord>) -> Self {
        records.truncate(HISTORY_CAPACITY);
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        HistoryLedger { records, last_id }
    }

    /// Inserts a new record at the head, then trims the ledger to the most
    /// recent `HISTORY_CAPACITY` records.
    ///
    /// # Arguments
    ///
    /// * `winner_name` - Name of the winning entry at draw time.
    /// * `winner_weight` - Its weight at draw time.
    /// * `probability_percent` - Its chance in percent, already rounded.
    /// * `timestamp` - When the draw resolved.
    pub fn record(
        &mut self,
        winner_name: &str,
        winner_weight: f64,
        probability_percent: f64,
        timestamp: DateTime<Utc>,
    ) -> &HistoryRecord {
        let records = &self.records;
        let id = next_id(self.last_id, |id| records.iter().any(|r| r.id == id));
        self.last_id = self.last_id.max(id);
        self.records.insert(
            0,
            HistoryRecord {
                id,
                winner_name: winner_name.to_string(),
                winner_weight,
                probability_percent,
                timestamp,
            },
        );
        self.records.truncate(HISTORY_CAPACITY); // oldest fall off the end
        &self.records[0]
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flattens the ledger into rows for tabular output, newest first.
    pub fn export(&self) -> Vec<ExportRow> {
        let len = self.records.len();
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| ExportRow {
                index: len - i, // newest gets the highest number
                winner_name: record.winner_name.clone(),
                winner_weight: record.winner_weight,
                probability_percent: record.probability_percent,
                formatted_timestamp: record.formatted_timestamp(),
            })
            .collect()
    }
}

/// Serializes a percentage as a one-decimal string and parses it back.
mod one_decimal {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.1}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid probability '{}'", raw)))?;
        if !(0.0..=100.0).contains(&value) {
            return Err(D::Error::custom(format!("probability out of range: {}", raw)));
        }
        Ok(value)
    }
}
