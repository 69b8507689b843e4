//! # Store Error Types Module
//!
//! Error types for the lesson store. Every libsql failure is wrapped with the
//! operation that hit it, and the result folds into the crate's main error
//! type.

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQL query error
    #[error("SQL query error: {0}")]
    Query(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Data error
    #[error("Data error: {0}")]
    Data(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl From<StoreError> for CrateError {
    fn from(err: StoreError) -> Self {
        CrateError::Database(err.to_string())
    }
}
