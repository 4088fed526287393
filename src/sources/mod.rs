/// Sources module
///
/// UPS API calls: the OAuth token exchange and the tracking lookup built on it.
use std::time::Duration;

use reqwest::Response;

use crate::errors::{Error, Result};

pub mod oauth2;
pub mod tracking;

/// Per-call request options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Hard bound on the whole request; falls back to the client default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Run `request` under a deadline, mapping expiry to [`Error::Timeout`].
pub(crate) async fn with_deadline<F, T>(url: &str, timeout: Duration, request: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| Error::timeout(url, timeout.as_millis() as u64))?
}

/// Read the body of a response, failing with [`Error::Http`] on a non-success status.
pub(crate) async fn read_success_body(url: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| Error::transport(url, e))?;
    if !status.is_success() {
        return Err(Error::http(status, body));
    }
    Ok(body)
}
