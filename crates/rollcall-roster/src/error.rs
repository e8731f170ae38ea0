//! Error types for rollcall-roster
//!
//! `RosterError` never crosses the `RosterSource` trait: adapters catch it,
//! log a diagnostic, and return `None`/empty per the fail-soft contract.

use thiserror::Error;

/// Errors that can occur while talking to the roster provider
#[derive(Error, Debug)]
pub enum RosterError {
    /// Request never completed (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("Unexpected status: {status}")]
    Status { status: u16 },

    /// Response body did not match the expected shape
    #[error("Response decode failed: {0}")]
    Decode(String),
}

impl RosterError {
    /// Whether this is the provider's plain "no such resource" answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RosterError::Status { status: 404 })
    }
}

impl From<reqwest::Error> for RosterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RosterError::Decode(err.to_string())
        } else {
            RosterError::Http(err.to_string())
        }
    }
}
