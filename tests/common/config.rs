//! Test configuration helpers for pointing a downloader at a mock court server

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use verdict_dl::{Config, Sleeper, VerdictDownloader};
use wiremock::MockServer;

/// Search endpoint path on the mock server
pub const SEARCH_PATH: &str = "/Home/SearchVerdicts";

/// Download endpoint path on the mock server
pub const DOWNLOAD_PATH: &str = "/Home/Download";

/// Sleeper that records every backoff delay and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Delays requested so far, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Default configuration with both endpoints on `server` and output in a
/// fresh temp directory
///
/// The temp directory must outlive the downloader.
pub fn mock_config(server: &MockServer) -> (Config, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.search.api_url = format!("{}{}", server.uri(), SEARCH_PATH);
    config.download.download_url = format!("{}{}", server.uri(), DOWNLOAD_PATH);
    config.output.output_dir = temp_dir.path().join("output");
    (config, temp_dir)
}

/// Build a downloader from `config` whose backoff sleeps are recorded, not slept
pub async fn create_downloader(config: Config) -> (VerdictDownloader, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let downloader = VerdictDownloader::new(config)
        .await
        .expect("Failed to create downloader")
        .with_sleeper(sleeper.clone());
    (downloader, sleeper)
}
