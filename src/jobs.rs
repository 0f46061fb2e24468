//! Download job construction
//!
//! Turns search records into concrete download jobs. Records without a storage
//! path or a server file name cannot be downloaded and are dropped here; they
//! only show up in the `skipped` count.

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::types::{DownloadJob, JobBatch, VerdictRecord};
use url::Url;

/// Builds [`DownloadJob`]s against a fixed download endpoint
#[derive(Clone, Debug)]
pub struct JobBuilder {
    base_url: Url,
    doc_type: u32,
}

impl JobBuilder {
    /// Create a builder for the configured download endpoint
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let base_url = Url::parse(&config.download_url).map_err(|e| {
            Error::config("download.download_url", format!("invalid URL: {}", e))
        })?;
        Ok(Self {
            base_url,
            doc_type: config.doc_type,
        })
    }

    /// Derive one job per downloadable record, preserving order
    ///
    /// Job indices run 1..=N over the records that survive, regardless of how
    /// many were dropped in between.
    pub fn build(&self, records: Vec<VerdictRecord>) -> JobBatch {
        let mut batch = JobBatch::default();

        for record in records {
            let Some((path, file_name)) = required_fields(&record) else {
                batch.skipped += 1;
                continue;
            };

            let index = batch.jobs.len() + 1;
            let url = self.download_url(&path, &file_name);
            batch.jobs.push(DownloadJob {
                index,
                url,
                path,
                file_name,
                doc_type: self.doc_type,
                record,
            });
        }

        tracing::info!(
            jobs = batch.jobs.len(),
            skipped = batch.skipped,
            "prepared download jobs"
        );
        batch
    }

    /// `<base>?path=<path>&fileName=<fileName>&type=<docType>`
    fn download_url(&self, path: &str, file_name: &str) -> String {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("fileName", file_name)
            .append_pair("type", &self.doc_type.to_string());
        url.into()
    }
}

fn required_fields(record: &VerdictRecord) -> Option<(String, String)> {
    let path = non_blank(record.path_for_web.as_deref())?;
    let file_name = non_blank(record.file_name.as_deref())?;
    Some((path, file_name))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
