//! Upstream error types.

use thiserror::Error;

/// Errors that can occur while talking to the LENS API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured base URL cannot be used to build resource URLs.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client initialisation failed: {0}")]
    Client(String),

    /// The upstream service could not be reached.
    #[error("Upstream unavailable ({url}): {message}")]
    Unavailable { url: String, message: String },

    /// The upstream request exceeded the configured timeout.
    #[error("Upstream request timed out: {url}")]
    Timeout { url: String },

    /// The upstream service answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The upstream body was not the expected JSON document.
    #[error("Failed to parse upstream response from {url}: {message}")]
    Parse { url: String, message: String },
}

impl UpstreamError {
    /// Create an "invalid URL" error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl(url.into())
    }

    /// Create a parse error for the given URL.
    pub fn parse(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Classify a reqwest failure into a timeout or an unavailable upstream.
    pub fn from_request(url: impl Into<String>, err: reqwest::Error) -> Self {
        let url = url.into();
        if err.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Unavailable {
                url,
                message: err.to_string(),
            }
        }
    }
}
