//! Configuration types for verdict-dl

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Search API configuration (endpoint, filter, request timeout)
///
/// Every field here feeds [`SearchQuery::from_config`](crate::query::SearchQuery::from_config)
/// or the POST issued by the [`MetadataFetcher`](crate::fetcher::MetadataFetcher).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint (default: the public SearchVerdicts endpoint)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Start of the publish-date range (inclusive, UTC)
    #[serde(default = "default_publish_date")]
    pub publish_from: DateTime<Utc>,

    /// End of the publish-date range (inclusive, UTC)
    #[serde(default = "default_publish_date")]
    pub publish_to: DateTime<Utc>,

    /// Document type filter (default: verdicts only)
    #[serde(default = "default_document_types")]
    pub document_types: Vec<DocumentTypeFilter>,

    /// Importance flag sent as `Technical` (0 = substantive decisions only)
    #[serde(default)]
    pub technical: u8,

    /// Which date the range applies to (2 = publish date)
    #[serde(default = "default_date_type")]
    pub date_type: u8,

    /// Case code types to include
    #[serde(default = "default_code_types")]
    pub code_types: Vec<u32>,

    /// Language code sent as `lan`
    #[serde(default = "default_language")]
    pub language: String,

    /// Timeout for the search request (default: 20 seconds)
    #[serde(default = "default_search_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            publish_from: default_publish_date(),
            publish_to: default_publish_date(),
            document_types: default_document_types(),
            technical: 0,
            date_type: default_date_type(),
            code_types: default_code_types(),
            language: default_language(),
            request_timeout: default_search_timeout(),
        }
    }
}

/// One entry of the search `Type` filter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeFilter {
    /// Parent category id
    pub parent: u32,
    /// Document type id
    pub value: u32,
    /// Display label as the search page sends it
    pub text: String,
}

/// Document download configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download endpoint base URL
    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Value of the `type` query parameter (2 for this deployment)
    #[serde(default = "default_doc_type")]
    pub doc_type: u32,

    /// Longest wait for the response head or any body chunk (default: 60 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Write buffer size in bytes (default: 8 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Local file naming scheme
    #[serde(default)]
    pub naming: NamingScheme,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_url: default_download_url(),
            doc_type: default_doc_type(),
            timeout: default_download_timeout(),
            chunk_size: default_chunk_size(),
            naming: NamingScheme::default(),
        }
    }
}

/// How downloaded documents are named on disk
///
/// Both schemes prefix the 3-digit zero-padded job index with `case_`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `case_001.pdf`: extension taken from the declared document name (default)
    #[default]
    DeclaredExtension,
    /// `case_001_2025-09-30.bin`: date from the storage path, extension from the type code
    DatedTypeCode,
}

/// Headers sent with every request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Referer header (the public search page)
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            referer: default_referer(),
        }
    }
}

/// Output locations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root output directory (default: "./output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Subdirectory of `output_dir` holding downloaded documents
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,

    /// File name of the metadata document inside `output_dir`
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// File name of the run log inside `output_dir`
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            documents_dir: default_documents_dir(),
            metadata_file: default_metadata_file(),
            log_file: default_log_file(),
        }
    }
}

impl OutputConfig {
    /// Directory downloaded documents are written to
    pub fn documents_path(&self) -> PathBuf {
        self.output_dir.join(&self.documents_dir)
    }

    /// Path of the metadata JSON document
    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join(&self.metadata_file)
    }

    /// Path of the run log
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }
}

/// Retry configuration for document downloads
///
/// The delay after failed attempt `n` is
/// `initial_delay * backoff_multiplier^(n-1)`, capped at `max_delay`.
/// With the defaults that is `2^n` seconds: 2, 4, 8, 16.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per document, first attempt included (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between attempts (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Main configuration for [`VerdictDownloader`](crate::VerdictDownloader)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search API settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Document download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Request headers
    #[serde(default)]
    pub http: HttpConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Download retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
            key: None,
        })
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.search.api_url)
            .map_err(|e| Error::config("search.api_url", format!("invalid URL: {e}")))?;
        url::Url::parse(&self.download.download_url)
            .map_err(|e| Error::config("download.download_url", format!("invalid URL: {e}")))?;

        if self.download.chunk_size == 0 {
            return Err(Error::config(
                "download.chunk_size",
                "chunk size must be greater than zero",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts",
                "at least one attempt is required",
            ));
        }
        if self.retry.backoff_multiplier.is_nan() || self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                "backoff multiplier must be at least 1.0",
            ));
        }
        if self.retry.max_delay > MAX_RETRY_DELAY {
            return Err(Error::config(
                "retry.max_delay",
                format!("must not exceed {} seconds", MAX_RETRY_DELAY.as_secs()),
            ));
        }
        if self.retry.initial_delay > MAX_RETRY_DELAY {
            return Err(Error::config(
                "retry.initial_delay",
                format!("must not exceed {} seconds", MAX_RETRY_DELAY.as_secs()),
            ));
        }
        Ok(())
    }
}

/// Upper bound accepted for any backoff delay (one day)
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

fn default_api_url() -> String {
    "https://supremedecisions.court.gov.il/Home/SearchVerdicts".to_string()
}

fn default_download_url() -> String {
    "https://supremedecisions.court.gov.il/Home/Download".to_string()
}

fn default_publish_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 30, 21, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_document_types() -> Vec<DocumentTypeFilter> {
    vec![DocumentTypeFilter {
        parent: 0,
        value: 2,
        text: "פסק-דין".to_string(),
    }]
}

fn default_date_type() -> u8 {
    2
}

fn default_code_types() -> Vec<u32> {
    vec![2]
}

fn default_language() -> String {
    "1".to_string()
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_doc_type() -> u32 {
    2
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_chunk_size() -> usize {
    8 * 1024
}

fn default_user_agent() -> String {
    "SupremeCourtDecisionScraper/1.0".to_string()
}

fn default_accept() -> String {
    "*/*".to_string()
}

fn default_referer() -> String {
    "https://supremedecisions.court.gov.il/Pages/fullsearch.aspx".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_documents_dir() -> String {
    "documents".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_log_file() -> String {
    "download_log.txt".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
