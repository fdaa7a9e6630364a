// src/export.rs

use crate::config::{EXPORT_FILE_PREFIX, EXPORT_HEADER};
use crate::error::PersistenceError;
use crate::history_manager::ExportRow;
use chrono::NaiveDate;

/// UTF-8 byte-order marker, so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Renders history rows as CSV, prefixed with a UTF-8 BOM and a header row.
/// Probabilities carry a `%` suffix.
///
/// # Errors
///
/// Returns `PersistenceError::Csv` if a row cannot be written.
pub fn to_csv(rows: &[ExportRow]) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.write_record([
            row.index.to_string(),
            row.winner_name.clone(),
            row.winner_weight.to_string(),
            format!("{:.1}%", row.probability_percent),
            row.formatted_timestamp.clone(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| PersistenceError::Io(e.into_error()))
}

/// File name offered for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}_{}.csv", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}
