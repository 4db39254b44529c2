//! # Error Types
//!
//! Defines error types reported by catalog data providers.

use thiserror::Error;

/// Errors a data provider can report.
///
/// Components never surface these to the user; a failed load is treated as
/// an empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The backing service could not be reached.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The requested scope is unknown to the provider.
    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    /// The provider answered with data it could not decode.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The request was cancelled before completion.
    #[error("Request cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
