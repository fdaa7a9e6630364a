// src/config.rs

use std::{env, path::PathBuf, time::Duration};

/// The application name, used for creating the application-specific data directory.
pub const APP_NAME: &str = "lottery_picker";

/// Storage key for the entry pool.
pub const ENTRIES_KEY: &str = "entries";
/// Storage key for the draw history.
pub const HISTORY_KEY: &str = "history";

/// Only the most recent draws are kept in the ledger.
pub const HISTORY_CAPACITY: usize = 100;

/// Length of the suspension window between starting a draw and resolving it.
pub const DEFAULT_DRAW_DELAY_MS: u64 = 1500;

/// Weight assigned by "reset all weights".
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Header row of the exported history (index, winner, weight, probability, time).
pub const EXPORT_HEADER: [&str; 5] = ["序号", "中签楼盘", "权重", "概率", "抽签时间"];
/// Prefix of the exported file name; the current date and `.csv` are appended.
pub const EXPORT_FILE_PREFIX: &str = "楼盘抽签记录";
/// Display format of draw timestamps (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Entries seeded by `--sample` when the pool is empty.
pub const SAMPLE_ENTRIES: &[&str] = &["绿城桂花园", "万科西湖", "保利天悦", "融创江南府"];

/// Environment variable overriding the storage directory.
pub const DATA_DIR_ENV: &str = "LOTTERY_DATA_DIR";
/// Environment variable overriding the draw delay, in milliseconds.
pub const DRAW_DELAY_ENV: &str = "LOTTERY_DRAW_DELAY_MS";

/// Runtime settings resolved from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Explicit storage directory; `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub draw_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: None,
            draw_delay: Duration::from_millis(DEFAULT_DRAW_DELAY_MS),
        }
    }
}

impl Settings {
    /// Reads `LOTTERY_DATA_DIR` and `LOTTERY_DRAW_DELAY_MS`.
    /// An unparsable delay is logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.trim().is_empty()) {
            settings.data_dir = Some(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
        }

        if let Some(raw) = lookup(DRAW_DELAY_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => settings.draw_delay = Duration::from_millis(ms),
                Err(e) => log::warn!(
                    "Ignoring {}='{}' ({}); using {} ms.",
                    DRAW_DELAY_ENV,
                    raw,
                    e,
                    DEFAULT_DRAW_DELAY_MS
                ),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let settings = Settings::from_lookup(lookup_from(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.draw_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            (DATA_DIR_ENV, "/tmp/lottery"),
            (DRAW_DELAY_ENV, "250"),
        ]));
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/lottery")));
        assert_eq!(settings.draw_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_delay_falls_back_to_default() {
        let settings = Settings::from_lookup(lookup_from(&[(DRAW_DELAY_ENV, "soon")]));
        assert_eq!(settings.draw_delay, Duration::from_millis(DEFAULT_DRAW_DELAY_MS));
    }
}
