//! Error types for the UPS client.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur when talking to the UPS API.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured environment url does not produce a valid request url.
    #[error("failed to parse URL from {input}: {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// Network-level failure (DNS, connect, reset, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within its deadline.
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The remote answered with a non-success status.
    #[error("{status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
        body: String,
    },

    /// Success status, but the body is not the expected JSON.
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl Error {
    pub(crate) fn url(input: &str, source: url::ParseError) -> Self {
        Error::Url { input: input.to_owned(), source }
    }

    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Error::Transport { url: url.to_owned(), source }
    }

    pub(crate) fn timeout(url: &str, timeout_ms: u64) -> Self {
        Error::Timeout { url: url.to_owned(), timeout_ms }
    }

    pub(crate) fn decode(url: &str, source: serde_json::Error) -> Self {
        Error::Decode { url: url.to_owned(), source }
    }

    /// Build an HTTP error, deriving the message from the response body.
    pub(crate) fn http(status: StatusCode, body: String) -> Self {
        let message = message_from_body(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_owned());
        Error::Http { status, message, body }
    }

    /// Status code of the remote response, if the failure was an HTTP error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

/// UPS error bodies look like `{"response":{"errors":[{"code":"..","message":".."}]}}`.
/// Anything else falls back to the trimmed raw body.
fn message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|json| {
        let messages: Vec<String> = json
            .pointer("/response/errors")?
            .as_array()?
            .iter()
            .filter_map(|err| {
                let message = err.get("message")?.as_str()?;
                Some(match err.get("code").and_then(Value::as_str) {
                    Some(code) => format!("[{}] {}", code, message),
                    None => message.to_owned(),
                })
            })
            .collect();
        (!messages.is_empty()).then(|| messages.join("; "))
    });

    Some(from_json.unwrap_or_else(|| trimmed.to_owned()))
}
