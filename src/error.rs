//! Error types for the primer crate

use thiserror::Error;

use crate::fetch::FetchError;
use crate::store::StoreError;

/// Result type for primer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for primer operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote page could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A page could not be decomposed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// The table of contents was unreachable, which ends the run
    #[error("Failed to fetch table of contents from {url}: {source}")]
    Toc {
        /// URL of the index page
        url: String,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },

    /// A module record could not be written, which ends the run
    #[error("Failed to create module '{slug}': {source}")]
    Module {
        /// Slug of the module
        slug: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The run was cancelled at a delay checkpoint
    #[error("Run cancelled")]
    Cancelled,

    /// Invalid configuration or site profile
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
