//! CLI argument definitions for the verdict downloader.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use verdict_dl::{Config, NamingScheme, Result, RunOutcome};

/// Exit code for runs that found nothing to download under `--fail-on-empty`.
pub const EXIT_EMPTY: i32 = 2;

/// Exit code for fatal errors.
pub const EXIT_FATAL: i32 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "verdict-dl",
    version,
    about = "Download published Supreme Court verdicts and index them",
    long_about = "Query the Supreme Court search API for verdicts published in a date window,\n\
                  download every document it lists and write a JSON metadata index.\n\n\
                  Settings come from built-in defaults, then --config, then flags."
)]
pub struct Cli {
    /// JSON configuration file; missing fields keep their defaults.
    #[arg(long = "config", value_name = "PATH", env = "VERDICT_DL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory for documents, metadata and the run log.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Start of the publication window (RFC 3339, e.g. 2025-09-30T21:00:00Z).
    #[arg(long = "from", value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub from: Option<DateTime<Utc>>,

    /// End of the publication window (RFC 3339).
    #[arg(long = "to", value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub to: Option<DateTime<Utc>>,

    /// Total download attempts per document.
    #[arg(long = "max-attempts", value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Delay after the first failed attempt, in seconds.
    #[arg(long = "initial-delay", value_name = "SECONDS")]
    pub initial_delay: Option<u64>,

    /// Local file naming scheme.
    #[arg(long = "naming", value_enum)]
    pub naming: Option<NamingArg>,

    /// Exit with status 2 when the search fails or returns no verdicts.
    #[arg(long = "fail-on-empty")]
    pub fail_on_empty: bool,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the run log here instead of <output-dir>/download_log.txt.
    #[arg(long = "log-file", value_name = "PATH", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Log to stderr only.
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    /// case_001.pdf, extension from the declared document name
    Declared,
    /// case_001_2025-09-30.bin, extension from the download type code
    Dated,
}

impl From<NamingArg> for NamingScheme {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Declared => NamingScheme::DeclaredExtension,
            NamingArg::Dated => NamingScheme::DatedTypeCode,
        }
    }
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the config file,
    /// then flags.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if let Some(from) = self.from {
            config.search.publish_from = from;
        }
        if let Some(to) = self.to {
            config.search.publish_to = to;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
        if let Some(secs) = self.initial_delay {
            config.retry.initial_delay = Duration::from_secs(secs);
        }
        if let Some(naming) = self.naming {
            config.download.naming = naming.into();
        }

        config.validate()?;
        Ok(config)
    }

    /// Log file for this run, if any.
    pub fn log_file(&self, config: &Config) -> Option<PathBuf> {
        if self.no_log_file {
            return None;
        }
        Some(
            self.log_file
                .clone()
                .unwrap_or_else(|| config.output.log_path()),
        )
    }
}

/// Map a finished run to the process exit code.
pub fn exit_code(outcome: RunOutcome, fail_on_empty: bool) -> i32 {
    match outcome {
        RunOutcome::Completed => 0,
        RunOutcome::NoVerdicts | RunOutcome::SearchUnavailable if fail_on_empty => EXIT_EMPTY,
        RunOutcome::NoVerdicts | RunOutcome::SearchUnavailable => 0,
    }
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
