//! Metadata accumulation and persistence

use crate::error::Result;
use crate::types::MetadataEntry;
use std::path::{Path, PathBuf};

/// Collects one [`MetadataEntry`] per downloaded document and writes them out
/// once, at the end of the run
#[derive(Debug)]
pub struct MetadataRecorder {
    path: PathBuf,
    entries: Vec<MetadataEntry>,
}

impl MetadataRecorder {
    /// Create an empty recorder that will write to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn record(&mut self, entry: MetadataEntry) {
        self.entries.push(entry);
    }

    /// Entries recorded so far, in download order
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// Number of entries recorded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destination of [`flush`](Self::flush)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every entry as a pretty-printed JSON array, replacing any
    /// existing file. Non-ASCII text (party names, descriptions) is written
    /// as-is, not `\u`-escaped.
    pub async fn flush(&self) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "metadata written"
        );
        Ok(self.path.clone())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn entry(index: usize, parties: &str) -> MetadataEntry {
        MetadataEntry {
            index,
            case_id: Some(json!(index * 10)),
            case_number: Some(json!(format!("{index}/25"))),
            parties: Some(parties.to_string()),
            case_description: None,
            decision_type: None,
            decision_date: Some("2025-10-01".to_string()),
            published_date: None,
            year: Some(json!(2025)),
            path_date: Some("2025-09-30".to_string()),
            file_name: format!("case_{index:03}.pdf"),
            file_type: "pdf".to_string(),
            file_size_bytes: 7,
            sha256: "00".repeat(32),
            download_url: "https://example.com/Home/Download?path=p&fileName=f&type=2".to_string(),
            local_path: PathBuf::from(format!("output/documents/case_{index:03}.pdf")),
        }
    }

    #[tokio::test]
    async fn flush_writes_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = MetadataRecorder::new(dir.path().join("metadata.json"));
        recorder.record(entry(1, "a"));
        recorder.record(entry(3, "b"));

        let path = recorder.flush().await.unwrap();

        let written: Vec<MetadataEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, recorder.entries());
        let indices: Vec<usize> = written.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[tokio::test]
    async fn flush_preserves_hebrew_and_indents() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = MetadataRecorder::new(dir.path().join("metadata.json"));
        recorder.record(entry(1, "פלוני נ' מדינת ישראל"));

        let path = recorder.flush().await.unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("פלוני נ' מדינת ישראל"));
        assert!(!text.contains("\\u"), "non-ASCII must not be escaped");
        assert!(text.starts_with("[\n  {\n    \"index\": 1,"));
    }

    #[tokio::test]
    async fn flush_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"[{"index": 99}, {"index": 100}]"#).unwrap();

        let mut recorder = MetadataRecorder::new(&path);
        recorder.record(entry(1, "a"));
        recorder.flush().await.unwrap();

        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["index"], 1);
    }

    #[tokio::test]
    async fn empty_recorder_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = MetadataRecorder::new(dir.path().join("nested").join("metadata.json"));

        let path = recorder.flush().await.unwrap();

        assert!(recorder.is_empty());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn len_tracks_records() {
        let mut recorder = MetadataRecorder::new("metadata.json");
        assert_eq!(recorder.len(), 0);
        recorder.record(entry(1, "a"));
        recorder.record(entry(2, "b"));
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.path(), Path::new("metadata.json"));
    }
}
