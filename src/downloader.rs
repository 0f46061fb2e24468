//! Single-document download with retries
//!
//! Each attempt streams the response body straight to the destination file.
//! The file is created with truncation, so a partial file left by a failed
//! attempt is overwritten by the next one; only a fully written file ever
//! makes it into a [`MetadataEntry`].

use crate::config::{DownloadConfig, NamingScheme};
use crate::error::{Error, Result};
use crate::naming::{LocalName, local_name, parse_dotnet_date};
use crate::retry::{RetryPolicy, Sleeper, retry_with_backoff};
use crate::types::{DownloadJob, Event, MetadataEntry};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::broadcast;

/// What a successful attempt left on disk
#[derive(Debug)]
struct WrittenFile {
    size_bytes: u64,
    sha256: String,
}

/// Fetches download jobs one at a time
pub struct FileDownloader {
    client: reqwest::Client,
    documents_dir: PathBuf,
    timeout: Duration,
    chunk_size: usize,
    naming: NamingScheme,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    event_tx: broadcast::Sender<Event>,
}

impl FileDownloader {
    /// Create a downloader writing into `documents_dir`
    pub fn new(
        client: reqwest::Client,
        config: &DownloadConfig,
        documents_dir: PathBuf,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            client,
            documents_dir,
            timeout: config.timeout,
            chunk_size: config.chunk_size,
            naming: config.naming,
            policy,
            sleeper,
            event_tx,
        }
    }

    /// Replace the backoff clock
    pub fn set_sleeper(&mut self, sleeper: Arc<dyn Sleeper>) {
        self.sleeper = sleeper;
    }

    /// Download `job`, retrying per the policy.
    ///
    /// Returns the metadata entry on success and `None` once every attempt has
    /// failed. Failures are logged and broadcast, never returned.
    pub async fn download(&self, job: &DownloadJob, total: usize) -> Option<MetadataEntry> {
        let name = local_name(job, self.naming);
        let local_path = self.documents_dir.join(&name.file_name);

        let index = job.index;
        let url = job.url.as_str();
        let path = local_path.as_path();
        let file_name = name.file_name.as_str();

        let result = retry_with_backoff(
            &self.policy,
            self.sleeper.as_ref(),
            move |attempt| {
                tracing::info!(index, total, attempt, file = %file_name, "downloading");
                self.event_tx
                    .send(Event::DownloadStarted {
                        index,
                        total,
                        attempt,
                        file_name: file_name.to_string(),
                    })
                    .ok();
                self.fetch_to_file(url, path)
            },
            move |attempt, error, next_delay| {
                tracing::warn!(
                    index,
                    attempt,
                    file = %file_name,
                    error = %error,
                    retry_in_ms = next_delay.map(|d| d.as_millis() as u64),
                    "download attempt failed"
                );
                self.event_tx
                    .send(Event::AttemptFailed {
                        index,
                        attempt,
                        error: error.to_string(),
                        retry_in_ms: next_delay.map(|d| d.as_millis() as u64),
                    })
                    .ok();
            },
        )
        .await;

        match result {
            Ok(written) => {
                tracing::info!(
                    index,
                    file = %name.file_name,
                    size_bytes = written.size_bytes,
                    "downloaded successfully"
                );
                self.event_tx
                    .send(Event::Downloaded {
                        index,
                        file_name: name.file_name.clone(),
                        size_bytes: written.size_bytes,
                    })
                    .ok();
                Some(metadata_entry(job, name, local_path, written))
            }
            Err(failure) => {
                tracing::error!(
                    index,
                    file = %name.file_name,
                    url = %job.url,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "abandoning download after retries"
                );
                self.event_tx
                    .send(Event::DownloadAbandoned {
                        index,
                        file_name: name.file_name,
                        attempts: failure.attempts,
                    })
                    .ok();
                None
            }
        }
    }

    /// One attempt: GET `url` and stream the body into `path`
    ///
    /// The timeout bounds each wait for the server (response head, then every
    /// chunk), not the whole transfer, so a large document that keeps
    /// arriving is never cut off.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<WrittenFile> {
        let mut response = self.within_timeout(url, self.client.get(url).send()).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut hasher = Sha256::new();

        while let Some(chunk) = self.within_timeout(url, response.chunk()).await? {
            hasher.update(&chunk);
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        let size_bytes = tokio::fs::metadata(path).await?.len();
        Ok(WrittenFile {
            size_bytes,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }

    /// Await one read from the server, failing with `TimedOut` if it stalls
    async fn within_timeout<T>(
        &self,
        url: &str,
        read: impl Future<Output = reqwest::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, read).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("no data from {} within {:?}", url, self.timeout),
            ))),
        }
    }
}

fn metadata_entry(
    job: &DownloadJob,
    name: LocalName,
    local_path: PathBuf,
    written: WrittenFile,
) -> MetadataEntry {
    let record = &job.record;
    MetadataEntry {
        index: job.index,
        case_id: record.case_id.clone(),
        case_number: record.case_number.clone(),
        parties: record.parties.clone(),
        case_description: record.case_description.clone(),
        decision_type: record.decision_type.clone(),
        decision_date: record.verdict_date.as_deref().and_then(parse_dotnet_date),
        published_date: record.published_date.clone(),
        year: record.year.clone(),
        path_date: name.path_date,
        file_name: name.file_name,
        file_type: name.file_type,
        file_size_bytes: written.size_bytes,
        sha256: written.sha256,
        download_url: job.url.clone(),
        local_path,
    }
}
