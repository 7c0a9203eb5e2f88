//! Command-line interface definitions for Mirror Press.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All tuning options can be provided via command-line flags or environment
//! variables.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the Mirror Press ingestion pipeline.
///
/// Exactly one of `--url` and `--date` selects the run mode: a single
/// article ingest, or date-based discovery across every registered source.
///
/// # Examples
///
/// ```sh
/// # Ingest one article
/// mirror_press -o ./archive --url https://aeon.co/essays/some-essay
///
/// # Ingest everything published on a date
/// mirror_press -o ./archive --date 2025-06-30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root output directory for records.json and body documents
    #[arg(short, long, env = "MIRROR_PRESS_OUTPUT_DIR")]
    pub output_dir: String,

    /// Single article URL to ingest
    #[arg(long, conflicts_with = "date", required_unless_present = "date")]
    pub url: Option<String>,

    /// Publication date to discover and ingest (YYYY-MM-DD)
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    pub date: Option<NaiveDate>,

    /// Also produce translated variants of ingested articles
    #[arg(long, default_value_t = false)]
    pub translate: bool,

    /// Hard cap on listing pages scanned per source during discovery
    #[arg(long, env = "MIRROR_PRESS_MAX_PAGES", default_value_t = 100)]
    pub max_pages: u32,

    /// Width of the concurrent date-probe pool during discovery
    #[arg(long, env = "MIRROR_PRESS_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Minimum politeness delay before each fetch, in seconds
    #[arg(long, default_value_t = 3)]
    pub delay_min: u64,

    /// Maximum politeness delay before each fetch, in seconds
    #[arg(long, default_value_t = 7)]
    pub delay_max: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_single_url() {
        let cli = Cli::parse_from([
            "mirror_press",
            "-o",
            "./archive",
            "--url",
            "https://aeon.co/essays/x",
        ]);
        assert_eq!(cli.output_dir, "./archive");
        assert_eq!(cli.url.as_deref(), Some("https://aeon.co/essays/x"));
        assert!(cli.date.is_none());
        assert_eq!(cli.max_pages, 100);
        assert_eq!(cli.concurrency, 8);
    }

    #[test]
    fn test_cli_date_mode() {
        let cli = Cli::parse_from(["mirror_press", "-o", "./archive", "--date", "2025-06-30"]);
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert!(cli.url.is_none());
    }

    #[test]
    fn test_cli_rejects_both_modes() {
        let result = Cli::try_parse_from([
            "mirror_press",
            "-o",
            "./archive",
            "--url",
            "https://aeon.co/essays/x",
            "--date",
            "2025-06-30",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_a_mode() {
        let result = Cli::try_parse_from(["mirror_press", "-o", "./archive"]);
        assert!(result.is_err());
    }
}
