//! Shared HTTP client

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER};

/// Build the one client used for the whole run.
///
/// Timeouts are set per request (search and download use different ones), so
/// the client itself carries only the identifying headers and the connection
/// pool.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("http.accept", &config.accept)?);
    headers.insert(REFERER, header_value("http.referer", &config.referer)?);

    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))
}

fn header_value(key: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::config(key, format!("invalid header value {:?}: {}", value, e)))
}
