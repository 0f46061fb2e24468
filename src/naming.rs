//! Local file naming and date helpers
//!
//! Downloaded documents are named from their job index, never from the
//! server-provided file name, so the documents directory sorts in download
//! order and cannot be polluted by odd server names.

use crate::config::NamingScheme;
use crate::types::DownloadJob;
use chrono::{DateTime, NaiveDate};

/// Extension used when none can be inferred from a declared name
pub const DEFAULT_EXTENSION: &str = "pdf";

/// Date token used by [`NamingScheme::DatedTypeCode`] when the path has no date
pub const UNKNOWN_DATE: &str = "unknown-date";

/// Name and classification of a job's local file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalName {
    /// File name inside the documents directory
    pub file_name: String,
    /// Extension without the dot
    pub file_type: String,
    /// Date derived from the storage path, if it has one
    pub path_date: Option<String>,
}

/// Derive the local file name for `job` under `scheme`
///
/// # Examples
///
/// ```
/// use verdict_dl::config::NamingScheme;
/// use verdict_dl::naming::local_name;
/// use verdict_dl::types::{DownloadJob, VerdictRecord};
///
/// let job = DownloadJob {
///     index: 7,
///     url: "https://example.com/Home/Download?path=2025/09/30&fileName=a.DOCX&type=2".into(),
///     path: "2025/09/30".into(),
///     file_name: "a.DOCX".into(),
///     doc_type: 2,
///     record: VerdictRecord::default(),
/// };
/// assert_eq!(local_name(&job, NamingScheme::DeclaredExtension).file_name, "case_007.docx");
/// ```
pub fn local_name(job: &DownloadJob, scheme: NamingScheme) -> LocalName {
    let path_date = date_from_path(&job.path);

    match scheme {
        NamingScheme::DeclaredExtension => {
            let declared = job
                .record
                .doc_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(&job.file_name);
            let file_type = infer_extension(declared);
            LocalName {
                file_name: format!("case_{:03}.{}", job.index, file_type),
                file_type,
                path_date,
            }
        }
        NamingScheme::DatedTypeCode => {
            let file_type = type_code_from_url(&job.url)
                .map(|code| extension_for_type_code(&code))
                .unwrap_or("bin")
                .to_string();
            let date = path_date.as_deref().unwrap_or(UNKNOWN_DATE);
            LocalName {
                file_name: format!("case_{:03}_{}.{}", job.index, date, file_type),
                file_type,
                path_date,
            }
        }
    }
}

/// Infer a lowercase extension from a declared file name
///
/// Falls back to [`DEFAULT_EXTENSION`] unless the text after the last `.` is
/// a short ASCII alphanumeric suffix. Free-text names such as
/// `"Decision no. 12/2025"` never leak path separators into the local name.
///
/// ```
/// use verdict_dl::naming::infer_extension;
///
/// assert_eq!(infer_extension("Ruling.PDF"), "pdf");
/// assert_eq!(infer_extension("archive.tar.gz"), "gz");
/// assert_eq!(infer_extension("25012340"), "pdf");
/// assert_eq!(infer_extension("Decision no. 12/2025"), "pdf");
/// ```
#[must_use]
pub fn infer_extension(name: &str) -> String {
    match name.rsplit_once('.').map(|(_, ext)| ext.trim()) {
        Some(ext) if is_plain_extension(ext) => ext.to_ascii_lowercase(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Longest suffix still treated as an extension
const MAX_EXTENSION_LEN: usize = 5;

fn is_plain_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Map the download endpoint's `type` code to an extension
#[must_use]
pub fn extension_for_type_code(code: &str) -> &'static str {
    match code.trim() {
        "4" => "pdf",
        "3" => "docx",
        _ => "bin",
    }
}

fn type_code_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "type")
        .map(|(_, value)| value.into_owned())
}

/// Extract a `YYYY-MM-DD` date from a `YYYY/MM/DD[/...]` storage path
///
/// ```
/// use verdict_dl::naming::date_from_path;
///
/// assert_eq!(date_from_path("2025/09/30").as_deref(), Some("2025-09-30"));
/// assert_eq!(date_from_path("/2025/9/1/extra").as_deref(), Some("2025-09-01"));
/// assert_eq!(date_from_path("archive/misc"), None);
/// ```
#[must_use]
pub fn date_from_path(path: &str) -> Option<String> {
    let mut segments = path
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let year = segments.next()?;
    let month = segments.next()?;
    let day = segments.next()?;

    if year.len() != 4 || month.len() > 2 || day.len() > 2 {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Convert a .NET JSON date (`/Date(1696118400000)/`) to `YYYY-MM-DD` (UTC)
///
/// A trailing timezone offset (`/Date(1696118400000+0300)/`) is ignored; the
/// millisecond count is already UTC.
///
/// ```
/// use verdict_dl::naming::parse_dotnet_date;
///
/// assert_eq!(parse_dotnet_date("/Date(1696118400000)/").as_deref(), Some("2023-10-01"));
/// assert_eq!(parse_dotnet_date("yesterday"), None);
/// ```
#[must_use]
pub fn parse_dotnet_date(value: &str) -> Option<String> {
    let inner = value.trim().trim_matches(|c| "/Date()".contains(c));
    if inner.is_empty() {
        return None;
    }

    // Skip a leading sign when looking for the offset separator
    let digits_end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());

    let millis: i64 = inner[..digits_end].parse().ok()?;
    let timestamp = DateTime::from_timestamp_millis(millis)?;
    Some(timestamp.format("%Y-%m-%d").to_string())
}
