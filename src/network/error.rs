//! Transport-level failures at the backend boundary

use thiserror::Error;

/// Anything that kept a well-formed backend answer from arriving.
///
/// Application errors (`{"error": ...}` on a 2xx) are not transport errors;
/// they travel as [`crate::messages::ApiOutcome::Rejected`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("server returned HTTP {status}")]
    Status {
        status: u16,
        /// `error` field of the body, if the server sent one
        detail: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("could not read attachment {path}: {reason}")]
    Attachment { path: String, reason: String },
    #[error("could not write {path}: {reason}")]
    Write { path: String, reason: String },
    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}
