//! Core types for verdict-dl

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::error::Error;

/// One element of the search response `data` array
///
/// The search API is loosely typed: any field may be absent or `null`, and
/// text fields occasionally arrive as numbers. Identifier-like fields are kept
/// as raw JSON so they are reproduced verbatim in the metadata document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    /// Internal case identifier
    #[serde(rename = "CaseId", default)]
    pub case_id: Option<Value>,

    /// Public case number
    #[serde(rename = "CaseNum", default)]
    pub case_number: Option<Value>,

    /// Party names as a single display string
    #[serde(rename = "CaseName", default, deserialize_with = "lenient_string")]
    pub parties: Option<String>,

    /// Free-text case description
    #[serde(rename = "CaseDesc", default, deserialize_with = "lenient_string")]
    pub case_description: Option<String>,

    /// Decision type
    #[serde(rename = "Type", default)]
    pub decision_type: Option<Value>,

    /// Decision date in `/Date(<ms>)/` form
    #[serde(rename = "VerdictDt", default, deserialize_with = "lenient_string")]
    pub verdict_date: Option<String>,

    /// Published date as the site displays it
    #[serde(
        rename = "VerdictsDtString",
        default,
        deserialize_with = "lenient_string"
    )]
    pub published_date: Option<String>,

    /// Case year
    #[serde(rename = "Year", default)]
    pub year: Option<Value>,

    /// Relative storage path on the document server (e.g. `2025/09/30`)
    #[serde(rename = "PathForWeb", default, deserialize_with = "lenient_string")]
    pub path_for_web: Option<String>,

    /// Server-assigned file name
    #[serde(rename = "FileName", default, deserialize_with = "lenient_string")]
    pub file_name: Option<String>,

    /// Declared document name, used to infer the extension
    #[serde(rename = "DocName", default, deserialize_with = "lenient_string")]
    pub doc_name: Option<String>,
}

impl VerdictRecord {
    /// Decode one raw `data` element; anything that is not an object yields an
    /// empty record, which job building then drops as malformed.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A single document to fetch
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadJob {
    /// 1-based position among the jobs of this run
    pub index: usize,
    /// Fully qualified download URL
    pub url: String,
    /// Relative storage path (never empty)
    pub path: String,
    /// Server file name (never empty)
    pub file_name: String,
    /// Document type discriminator sent as `type`
    pub doc_type: u32,
    /// Record the job was derived from
    pub record: VerdictRecord,
}

/// Jobs derived from one batch of verdict records
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobBatch {
    /// Jobs in input order, indexed 1..=N
    pub jobs: Vec<DownloadJob>,
    /// Records dropped for missing `PathForWeb` or `FileName`
    pub skipped: usize,
}

/// One row of the metadata document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Job index (matches the local file name)
    pub index: usize,
    /// Internal case identifier
    pub case_id: Option<Value>,
    /// Public case number
    pub case_number: Option<Value>,
    /// Party names
    pub parties: Option<String>,
    /// Case description
    pub case_description: Option<String>,
    /// Decision type
    pub decision_type: Option<Value>,
    /// Decision date as `YYYY-MM-DD`
    pub decision_date: Option<String>,
    /// Published date as the site displays it
    pub published_date: Option<String>,
    /// Case year
    pub year: Option<Value>,
    /// Date derived from the storage path, when it has a `YYYY/MM/DD` prefix
    pub path_date: Option<String>,
    /// Local file name
    pub file_name: String,
    /// Inferred file type (extension without the dot)
    pub file_type: String,
    /// Size of the written file
    pub file_size_bytes: u64,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
    /// URL the document was fetched from
    pub download_url: String,
    /// Where the document was written
    pub local_path: PathBuf,
}

/// Result of querying the search API
#[derive(Debug)]
pub enum FetchOutcome {
    /// Search succeeded (possibly with zero records)
    Fetched(Vec<VerdictRecord>),
    /// Search could not be completed
    FetchFailed(Error),
}

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every job was attempted and the metadata document was written
    Completed,
    /// The search succeeded but returned no verdicts
    NoVerdicts,
    /// The search request failed
    SearchUnavailable,
}

/// Summary of a pipeline run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// How the run ended
    pub outcome: RunOutcome,
    /// Records returned by the search
    pub verdicts: usize,
    /// Jobs prepared from those records
    pub jobs: usize,
    /// Records dropped as malformed
    pub skipped: usize,
    /// Documents downloaded successfully
    pub downloaded: usize,
    /// Jobs abandoned after exhausting retries
    pub failed: usize,
    /// Metadata document, if one was written
    pub metadata_path: Option<PathBuf>,
}

impl RunReport {
    pub(crate) fn aborted(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            verdicts: 0,
            jobs: 0,
            skipped: 0,
            downloaded: 0,
            failed: 0,
            metadata_path: None,
        }
    }
}

/// Event emitted during a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Search request about to be sent
    SearchStarted,

    /// Search returned
    SearchCompleted {
        /// Number of records in `data`
        records: usize,
    },

    /// Search failed; the run is aborted
    SearchFailed {
        /// Error message
        error: String,
    },

    /// Jobs built from the search results
    JobsPrepared {
        /// Number of jobs
        jobs: usize,
        /// Number of records dropped
        skipped: usize,
    },

    /// A download attempt is starting
    DownloadStarted {
        /// Job index
        index: usize,
        /// Total jobs in the run
        total: usize,
        /// Attempt number (1-based)
        attempt: u32,
        /// Local file name
        file_name: String,
    },

    /// A download attempt failed
    AttemptFailed {
        /// Job index
        index: usize,
        /// Attempt number (1-based)
        attempt: u32,
        /// Error message
        error: String,
        /// Delay before the next attempt, `None` after the final attempt
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_in_ms: Option<u64>,
    },

    /// Document written to disk
    Downloaded {
        /// Job index
        index: usize,
        /// Local file name
        file_name: String,
        /// Bytes written
        size_bytes: u64,
    },

    /// All attempts failed; the job is skipped
    DownloadAbandoned {
        /// Job index
        index: usize,
        /// Local file name
        file_name: String,
        /// Attempts made
        attempts: u32,
    },

    /// Metadata document written
    MetadataWritten {
        /// Path of the document
        path: PathBuf,
        /// Number of entries
        entries: usize,
    },
}
