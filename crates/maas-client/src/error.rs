//! Error types for the MAAS client.
//!
//! Remote failures (bad status, non-JSON content, unparsable JSON) are kept
//! as separate variants but share the `is_remote` classification. Polling
//! adds `Timeout` and `UnexpectedStatus`.

use std::time::Duration;

use maas_core::{IdError, StatusName, StatusSet};
use reqwest::header::HeaderMap;
use thiserror::Error;

/// A result type using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in MAAS client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("status={status} content={body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response is not `application/json`.
    #[error("unexpected non-json response: status={status} headers={headers:?} content={body}")]
    ContentType {
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HeaderMap,
        /// Raw response body.
        body: String,
    },

    /// The response claims to be JSON but does not parse.
    #[error("failed to parse json: status={status} headers={headers:?} content={body}")]
    Json {
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HeaderMap,
        /// Raw response body.
        body: String,
    },

    /// The JSON document does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The server returned data that breaks an invariant the API guarantees.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    /// The machine did not reach a target status before the deadline.
    #[error(
        "the machine did not reach the expected status {expected} within the time limit {}s (the last status is {last_status})",
        .timeout.as_secs()
    )]
    Timeout {
        /// Statuses the caller was waiting for.
        expected: StatusSet,
        /// The requested time limit.
        timeout: Duration,
        /// The last status observed.
        last_status: StatusName,
    },

    /// The machine entered a status that is neither a target nor transient.
    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusName),

    /// Connection-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// API key or signing error.
    #[error("authentication error: {0}")]
    Auth(#[from] maas_auth::AuthError),

    /// Invalid identifier or hostname.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns true for failures reported by the remote server's response.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::ContentType { .. } | Self::Json { .. }
        )
    }

    /// Returns the HTTP status code associated with this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. }
            | Self::ContentType { status, .. }
            | Self::Json { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this error might be resolved by retrying.
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
