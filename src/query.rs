//! Search request payload
//!
//! The search endpoint expects the exact body its own search page sends,
//! including the empty `Counsel`/`Parties`/`SearchText` arrays and a single
//! all-`null` subject filter.

use crate::config::{DocumentTypeFilter, SearchConfig};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Body of the SearchVerdicts POST
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Document filter block
    pub document: DocumentFilter,
    /// Subject filter (one unrestricted entry)
    #[serde(rename = "AllSubjects")]
    pub all_subjects: Vec<SubjectFilter>,
    /// Counsel filter (unused)
    #[serde(rename = "Counsel")]
    pub counsel: Vec<String>,
    /// Parties filter (unused)
    #[serde(rename = "Parties")]
    pub parties: Vec<String>,
    /// Free-text filter (unused)
    #[serde(rename = "SearchText")]
    pub search_text: Vec<String>,
    /// Language code
    pub lan: String,
}

/// The `document` block of the search body
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentFilter {
    /// Range start
    #[serde(rename = "PublishFrom", serialize_with = "serialize_millis_z")]
    pub publish_from: DateTime<Utc>,
    /// Range end
    #[serde(rename = "PublishTo", serialize_with = "serialize_millis_z")]
    pub publish_to: DateTime<Utc>,
    /// Document types
    #[serde(rename = "Type")]
    pub types: Vec<DocumentTypeFilter>,
    /// Importance flag (0 = substantive only)
    #[serde(rename = "Technical")]
    pub technical: u8,
    /// Which date the range applies to
    #[serde(rename = "dateType")]
    pub date_type: u8,
    /// Case code types
    #[serde(rename = "CodeTypes")]
    pub code_types: Vec<u32>,
}

/// One subject filter entry; all `None` means "any subject"
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SubjectFilter {
    /// Subject
    #[serde(rename = "Subject")]
    pub subject: Option<String>,
    /// Sub-subject
    #[serde(rename = "SubSubject")]
    pub sub_subject: Option<String>,
    /// Sub-sub-subject
    #[serde(rename = "SubSubSubject")]
    pub sub_sub_subject: Option<String>,
}

impl SearchQuery {
    /// Build the request body for the configured range and filters.
    ///
    /// The range is passed through as-is; `publish_from > publish_to` is the
    /// caller's problem.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            document: DocumentFilter {
                publish_from: config.publish_from,
                publish_to: config.publish_to,
                types: config.document_types.clone(),
                technical: config.technical,
                date_type: config.date_type,
                code_types: config.code_types.clone(),
            },
            all_subjects: vec![SubjectFilter::default()],
            counsel: Vec::new(),
            parties: Vec::new(),
            search_text: Vec::new(),
            lan: config.language.clone(),
        }
    }
}

// 2025-09-30T21:00:00.000Z
fn serialize_millis_z<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn default_query_matches_search_page_body() {
        let query = SearchQuery::from_config(&SearchConfig::default());

        let body = serde_json::to_value(&query).unwrap();

        assert_eq!(
            body,
            json!({
                "document": {
                    "PublishFrom": "2025-09-30T21:00:00.000Z",
                    "PublishTo": "2025-09-30T21:00:00.000Z",
                    "Type": [{"parent": 0, "value": 2, "text": "פסק-דין"}],
                    "Technical": 0,
                    "dateType": 2,
                    "CodeTypes": [2]
                },
                "AllSubjects": [{"Subject": null, "SubSubject": null, "SubSubSubject": null}],
                "Counsel": [],
                "Parties": [],
                "SearchText": [],
                "lan": "1"
            })
        );
    }

    #[test]
    fn range_and_flags_come_from_config() {
        let config = SearchConfig {
            publish_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            publish_to: Utc.with_ymd_and_hms(2024, 1, 31, 12, 30, 15).unwrap(),
            technical: 1,
            language: "2".to_string(),
            ..SearchConfig::default()
        };

        let body = serde_json::to_value(SearchQuery::from_config(&config)).unwrap();

        assert_eq!(body["document"]["PublishFrom"], "2024-01-01T00:00:00.000Z");
        assert_eq!(body["document"]["PublishTo"], "2024-01-31T12:30:15.000Z");
        assert_eq!(body["document"]["Technical"], 1);
        assert_eq!(body["lan"], "2");
    }

    #[test]
    fn inverted_range_is_not_rejected() {
        let config = SearchConfig {
            publish_from: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            publish_to: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            ..SearchConfig::default()
        };

        let query = SearchQuery::from_config(&config);

        assert!(query.document.publish_from > query.document.publish_to);
    }

    #[test]
    fn hebrew_label_is_not_escaped() {
        let query = SearchQuery::from_config(&SearchConfig::default());

        let text = serde_json::to_string(&query).unwrap();

        assert!(text.contains("פסק-דין"));
    }
}
