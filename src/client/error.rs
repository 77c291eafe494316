//! Normalized pipeline errors
//!
//! Every transport and HTTP failure collapses into one error shape so the
//! command layer can print it directly. `Clone` because coalesced cache
//! waiters all observe the same failure.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced an HTTP response
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response; message already normalized (bounded length, never
    /// raw HTML)
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the endpoint schema
    #[error("invalid response from {resource}: {detail}")]
    Decode { resource: String, detail: String },
}

impl ApiError {
    /// HTTP status code, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an authentication failure (drives the per-query
    /// suppress policy)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
