//! Remote query error type.

use thiserror::Error;

/// Error returned by a single remote inventory query.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Query could not be turned into a request URL.
    #[error("invalid query URL: {0}")]
    Url(#[from] url::ParseError),
    /// Response body was not the expected feature collection.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Any other source-specific failure.
    #[error("{0}")]
    Other(String),
}
