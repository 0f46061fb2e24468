//! # verdict-dl
//!
//! Bulk downloader for published Israeli Supreme Court verdicts.
//!
//! A run queries the court's search API for verdicts published in a date
//! window, downloads every document it can locate, and writes a JSON metadata
//! index describing each file that made it to disk.
//!
//! ## Design Philosophy
//!
//! - **Sequential** - One request in flight at a time, in a fixed order
//! - **Sensible defaults** - The default [`Config`] targets the public court site
//! - **Partial success** - A failed document never aborts the run
//! - **Event-driven** - Consumers subscribe to lifecycle events
//!
//! ## Quick Start
//!
//! ```no_run
//! use verdict_dl::{Config, RunOutcome, VerdictDownloader};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = VerdictDownloader::new(Config::default()).await?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = downloader.run().await?;
//!     if report.outcome == RunOutcome::Completed {
//!         println!("{} of {} documents downloaded", report.downloaded, report.jobs);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Shared HTTP client construction
pub mod client;
/// Configuration types
pub mod config;
/// Single-document download with retries
pub mod downloader;
/// Error types
pub mod error;
/// Search API access
pub mod fetcher;
/// Record to download-job mapping
pub mod jobs;
/// Subscriber installation for the binary
pub mod logging;
/// Local filename derivation
pub mod naming;
/// Run orchestration
pub mod pipeline;
/// Search request payload
pub mod query;
/// Metadata document persistence
pub mod recorder;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use config::{
    Config, DownloadConfig, HttpConfig, NamingScheme, OutputConfig, RetryConfig, SearchConfig,
};
pub use downloader::FileDownloader;
pub use error::{Error, Result};
pub use fetcher::MetadataFetcher;
pub use jobs::JobBuilder;
pub use pipeline::VerdictDownloader;
pub use query::SearchQuery;
pub use recorder::MetadataRecorder;
pub use retry::{IsRetryable, RetryPolicy, Sleeper, TokioSleeper};
pub use types::{
    DownloadJob, Event, FetchOutcome, JobBatch, MetadataEntry, RunOutcome, RunReport,
    VerdictRecord,
};
