//! Verdict search
//!
//! A single POST to the search endpoint. Failures are not retried here: a
//! search that cannot be completed ends the run, so the outcome is returned
//! as a [`FetchOutcome`] instead of an error for the orchestrator to act on.

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::query::SearchQuery;
use crate::types::{FetchOutcome, VerdictRecord};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Response envelope; only `data` is used
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Client for the verdict search endpoint
pub struct MetadataFetcher {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl MetadataFetcher {
    /// Create a fetcher that reuses `client`
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Run the search and return its records.
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies become
    /// [`FetchOutcome::FetchFailed`]. A body without `data` is a successful
    /// search with no results.
    pub async fn fetch_verdicts(&self, query: &SearchQuery) -> FetchOutcome {
        tracing::info!(url = %self.api_url, "requesting verdict list");

        match self.search(query).await {
            Ok(records) => {
                tracing::info!(count = records.len(), "fetched verdict records");
                FetchOutcome::Fetched(records)
            }
            Err(e) => {
                tracing::error!(error = %e, url = %self.api_url, "failed to fetch verdicts");
                FetchOutcome::FetchFailed(e)
            }
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VerdictRecord>> {
        let response = self
            .client
            .post(&self.api_url)
            .json(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: self.api_url.clone(),
            });
        }

        let body = response.bytes().await?;
        let envelope: SearchResponse = serde_json::from_slice(&body)?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(VerdictRecord::from_value)
            .collect())
    }
}
