//! Error types for the accounts API client.
//!
//! # Design
//! Two views of the same failure. `ApiError` keeps the cause apart
//! (request construction, transport, HTTP status, decode) for callers that
//! want to inspect it. `Outcome` is the coarse success/failure signal the
//! plain `create`/`fetch`/`delete` methods return; every `ApiError` variant
//! collapses to `Outcome::Failure`.

use thiserror::Error;

/// Errors returned by `AccountsClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced an HTTP response (connection refused,
    /// timeout, DNS failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status of 300 or above.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Binary result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl<T> From<&Result<T, ApiError>> for Outcome {
    fn from(result: &Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(_) => Outcome::Failure,
        }
    }
}
