//! HTTP fallback source backed by a blocking `reqwest` client.

use super::{decode_body, FetchError, FetchResult, RecordSource};
use crate::model::processo::Processo;
use log::{error, info};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};

/// GETs the seed JSON array from a URL.
///
/// No timeout is applied unless one is configured; a hanging server keeps the
/// caller in its loading state.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    url: String,
    client: Client,
}

impl HttpRecordSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Uses a preconfigured client (proxy, TLS or timeout settings).
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RecordSource for HttpRecordSource {
    fn fetch(&self) -> FetchResult<Vec<Processo>> {
        let started_at = Instant::now();
        let result = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| FetchError::Network(err.to_string()))
            .and_then(|response| {
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::HttpStatus(status.as_u16()));
                }
                let body = response
                    .text()
                    .map_err(|err| FetchError::Network(err.to_string()))?;
                decode_body(&body)
            });

        match &result {
            Ok(records) => info!(
                "event=fallback_fetch module=source status=ok kind=http records={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=fallback_fetch module=source status=error kind=http duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
