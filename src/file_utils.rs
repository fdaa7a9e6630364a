// src/file_utils.rs

use crate::config::APP_NAME;
use crate::export::export_file_name;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Error as IoError, ErrorKind as IoErrorKind, Read, Write},
    path::{Path, PathBuf},
};

/// Returns the directory used for persisted data, creating it if needed.
/// `override_dir` wins over the platform data directory.
///
/// # Errors
///
/// Returns an error if the system's data directory cannot be determined
/// or if creating the directory fails.
pub fn get_app_data_dir(override_dir: Option<&Path>) -> io::Result<PathBuf> {
    let app_data_dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .ok_or_else(|| {
                IoError::new(
                    IoErrorKind::NotFound,
                    "Failed to determine the system's data directory.",
                )
            })?
            .join(APP_NAME),
    };

    // fs::create_dir_all is idempotent; it does nothing if the directory already exists.
    fs::create_dir_all(&app_data_dir)?;

    Ok(app_data_dir)
}

/// Key-value store backed by one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match File::open(self.path_for(key)) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None), // Nothing saved yet.
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path_for(key))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value)?;
        writer.flush()
    }
}

/// Writes an export into `dir` under the dated export file name and returns its path.
///
/// # Arguments
///
/// * `dir` - The directory to write into. It must already exist.
/// * `bytes` - The encoded export, BOM included.
/// * `at` - The export time. The file name carries its UTC calendar date.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_export(dir: &Path, bytes: &[u8], at: DateTime<Utc>) -> io::Result<PathBuf> {
    let path = dir.join(export_file_name(at.date_naive())); // UTC date, not local
    fs::write(&path, bytes)?;
    Ok(path)
}
