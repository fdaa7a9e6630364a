// src/cli.rs

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Weighted lottery: register entries with weights, draw a winner, keep a history.",
    long_about = None
)]
pub struct Cli {
    /// Directory holding entries.json and history.json (supports ~).
    #[clap(short, long)]
    pub data_dir: Option<String>,

    /// Suspension window before a draw resolves, in milliseconds.
    #[clap(long)]
    pub delay_ms: Option<u64>,

    /// Seed the random source to make draws reproducible.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Add the sample entries if the pool is empty.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub sample: bool,

    /// Keep everything in memory; nothing is read from or written to disk.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub ephemeral: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "lottery_picker",
            "--data-dir",
            "~/lottery",
            "--delay-ms",
            "0",
            "--seed",
            "42",
            "--sample",
        ])
        .unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some("~/lottery"));
        assert_eq!(cli.delay_ms, Some(0));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.sample);
        assert!(!cli.ephemeral);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["lottery_picker"]).unwrap();
        assert!(cli.data_dir.is_none());
        assert!(cli.delay_ms.is_none());
        assert!(!cli.sample);
    }
}
