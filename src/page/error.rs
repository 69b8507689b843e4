//! Error types for the page module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response contained no markup at all
    #[error("Empty document")]
    EmptyDocument,

    /// An exclusion selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// The offending selector
        selector: String,
        /// Parser message
        message: String,
    },
}

impl From<ParseError> for CrateError {
    fn from(err: ParseError) -> Self {
        CrateError::Parse(err.to_string())
    }
}
