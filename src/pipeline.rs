//! Run orchestration
//!
//! [`VerdictDownloader`] sequences a run: search, build jobs, download each job
//! in order, write the metadata document. Every step runs to completion before
//! the next one starts; nothing is downloaded concurrently.

use crate::client::build_http_client;
use crate::config::Config;
use crate::downloader::FileDownloader;
use crate::error::{Error, Result};
use crate::fetcher::MetadataFetcher;
use crate::jobs::JobBuilder;
use crate::query::SearchQuery;
use crate::recorder::MetadataRecorder;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::types::{Event, FetchOutcome, RunOutcome, RunReport};
use std::sync::Arc;
use tokio::sync::broadcast;

/// End-to-end downloader for Supreme Court verdicts
pub struct VerdictDownloader {
    config: Config,
    fetcher: MetadataFetcher,
    jobs: JobBuilder,
    downloader: FileDownloader,
    event_tx: broadcast::Sender<Event>,
}

impl VerdictDownloader {
    /// Create a downloader for `config`
    ///
    /// Validates the configuration, builds the HTTP client shared by the whole
    /// run and creates the output and documents directories.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let documents_dir = config.output.documents_path();
        tokio::fs::create_dir_all(&documents_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create documents directory '{}': {}",
                        documents_dir.display(),
                        e
                    ),
                ))
            })?;

        let client = build_http_client(&config.http)?;

        // Room for every event of a sizeable run; lagging subscribers only
        // lose old events
        let (event_tx, _rx) = broadcast::channel(1000);

        let fetcher = MetadataFetcher::new(client.clone(), &config.search);
        let jobs = JobBuilder::new(&config.download)?;
        let downloader = FileDownloader::new(
            client,
            &config.download,
            documents_dir,
            RetryPolicy::from_config(&config.retry),
            Arc::new(TokioSleeper),
            event_tx.clone(),
        );

        Ok(Self {
            config,
            fetcher,
            jobs,
            downloader,
            event_tx,
        })
    }

    /// Replace the clock used for backoff delays
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.downloader.set_sleeper(sleeper);
        self
    }

    /// Subscribe to run events
    ///
    /// Only events sent after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute the full pipeline
    ///
    /// A failed or empty search ends the run early without writing any
    /// metadata. Individual download failures only reduce the number of
    /// entries. The only error returned is a failure to write the metadata
    /// document.
    pub async fn run(&self) -> Result<RunReport> {
        let query = SearchQuery::from_config(&self.config.search);

        self.emit(Event::SearchStarted);
        let records = match self.fetcher.fetch_verdicts(&query).await {
            FetchOutcome::Fetched(records) => records,
            FetchOutcome::FetchFailed(e) => {
                tracing::error!(error = %e, "search unavailable, aborting run");
                self.emit(Event::SearchFailed {
                    error: e.to_string(),
                });
                return Ok(RunReport::aborted(RunOutcome::SearchUnavailable));
            }
        };
        self.emit(Event::SearchCompleted {
            records: records.len(),
        });

        if records.is_empty() {
            tracing::error!("no verdicts retrieved, exiting");
            return Ok(RunReport::aborted(RunOutcome::NoVerdicts));
        }

        let verdicts = records.len();
        let batch = self.jobs.build(records);
        self.emit(Event::JobsPrepared {
            jobs: batch.jobs.len(),
            skipped: batch.skipped,
        });

        let total = batch.jobs.len();
        let mut recorder = MetadataRecorder::new(self.config.output.metadata_path());
        for job in &batch.jobs {
            if let Some(entry) = self.downloader.download(job, total).await {
                recorder.record(entry);
            }
        }

        let metadata_path = recorder.flush().await?;
        self.emit(Event::MetadataWritten {
            path: metadata_path.clone(),
            entries: recorder.len(),
        });

        let report = RunReport {
            outcome: RunOutcome::Completed,
            verdicts,
            jobs: total,
            skipped: batch.skipped,
            downloaded: recorder.len(),
            failed: total - recorder.len(),
            metadata_path: Some(metadata_path),
        };
        tracing::info!(
            verdicts = report.verdicts,
            jobs = report.jobs,
            skipped = report.skipped,
            downloaded = report.downloaded,
            failed = report.failed,
            "run complete"
        );
        Ok(report)
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingSleeper;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn downloader_for(server: &MockServer) -> (VerdictDownloader, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.search.api_url = format!("{}/Home/SearchVerdicts", server.uri());
        config.download.download_url = format!("{}/Home/Download", server.uri());
        config.output.output_dir = temp_dir.path().join("output");

        let downloader = VerdictDownloader::new(config)
            .await
            .unwrap()
            .with_sleeper(Arc::new(RecordingSleeper::default()));
        (downloader, temp_dir)
    }

    #[tokio::test]
    async fn new_creates_documents_directory() {
        let mock_server = MockServer::start().await;
        let (downloader, _temp_dir) = downloader_for(&mock_server).await;

        assert!(downloader.config().output.documents_path().is_dir());
    }

    #[tokio::test]
    async fn new_rejects_invalid_config() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;

        assert!(matches!(
            VerdictDownloader::new(config).await,
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn failed_search_aborts_without_metadata() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let (downloader, _temp_dir) = downloader_for(&mock_server).await;
        let mut events = downloader.subscribe();

        let report = downloader.run().await.unwrap();

        assert_eq!(report.outcome, RunOutcome::SearchUnavailable);
        assert!(report.metadata_path.is_none());
        assert!(!downloader.config().output.metadata_path().exists());
        assert_eq!(events.try_recv().unwrap(), Event::SearchStarted);
        assert!(matches!(events.try_recv().unwrap(), Event::SearchFailed { .. }));
    }

    #[tokio::test]
    async fn all_records_malformed_writes_empty_metadata() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"CaseId": 1}, {"PathForWeb": "2025/09/30"}]
            })))
            .mount(&mock_server)
            .await;

        let (downloader, _temp_dir) = downloader_for(&mock_server).await;

        let report = downloader.run().await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.verdicts, 2);
        assert_eq!(report.jobs, 0);
        assert_eq!(report.skipped, 2);
        let text = std::fs::read_to_string(report.metadata_path.unwrap()).unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn jobs_run_in_order_and_report_counts() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"PathForWeb": "2025/09/30", "FileName": "a.pdf"},
                    {"PathForWeb": "2025/09/30", "FileName": "b.docx"},
                    {"FileName": "orphan.pdf"}
                ]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Home/Download"))
            .and(query_param("fileName", "a.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"A".to_vec()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Home/Download"))
            .and(query_param("fileName", "b.docx"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BB".to_vec()))
            .mount(&mock_server)
            .await;

        let (downloader, _temp_dir) = downloader_for(&mock_server).await;
        let mut events = downloader.subscribe();

        let report = downloader.run().await.unwrap();

        assert_eq!(report.jobs, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 0);

        let downloaded: Vec<(usize, String)> = std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|e| match e {
                Event::Downloaded {
                    index, file_name, ..
                } => Some((index, file_name)),
                _ => None,
            })
            .collect();
        assert_eq!(
            downloaded,
            vec![
                (1, "case_001.pdf".to_string()),
                (2, "case_002.docx".to_string())
            ]
        );
    }
}
