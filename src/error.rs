//! Error types for verdict-dl
//!
//! This module provides the error taxonomy shared by every stage of the
//! pipeline. Most errors never leave the stage that produced them: the fetcher
//! turns them into [`FetchOutcome::FetchFailed`](crate::types::FetchOutcome),
//! the downloader retries them and finally abandons the job. Only a failure to
//! persist the metadata document escapes [`VerdictDownloader::run`](crate::VerdictDownloader::run).

use thiserror::Error;

/// Result type alias for verdict-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for verdict-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.download_url")
        key: Option<String>,
    },

    /// Transport-level failure (connect, timeout, reset, body decode)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_names_status_and_url() {
        let err = Error::HttpStatus {
            status: 503,
            url: "https://example.com/Home/Download".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 503 from https://example.com/Home/Download"
        );
    }

    #[test]
    fn config_helper_records_key() {
        let err = Error::config("retry.max_attempts", "must be at least 1");
        match err {
            Error::Config { message, key } => {
                assert_eq!(message, "must be at least 1");
                assert_eq!(key.as_deref(), Some("retry.max_attempts"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn io_error_converts_via_question_mark() {
        fn open_missing() -> Result<()> {
            std::fs::File::open("/definitely/not/here/verdict.pdf")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(Error::Io(_))));
    }

    #[test]
    fn url_parse_error_converts() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid URL"));
    }
}
