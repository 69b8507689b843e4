//! Error types for the fetch module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page fetches
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure: DNS, refused connection, timeout
    #[error("Network error fetching {url}: {source}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than 200
    #[error("Unexpected HTTP status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code received
        status: u16,
    },

    /// The response exceeded the configured size cap
    #[error("Response from {url} exceeds {limit} bytes")]
    BodyTooLarge {
        /// Requested URL
        url: String,
        /// Configured cap in bytes
        limit: usize,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether the failure happened below HTTP (no status was received)
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    /// Status code of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network { source, .. } => CrateError::Http(source),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}
