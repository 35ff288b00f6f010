//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while preparing authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The API key does not have the `consumer:token:secret` shape.
    #[error("invalid API key: expected 3 colon-separated parts, got {parts}")]
    MalformedApiKey {
        /// Number of parts found.
        parts: usize,
    },

    /// One of the API key parts is empty.
    #[error("invalid API key: {0} is empty")]
    EmptyKeyPart(&'static str),
}
