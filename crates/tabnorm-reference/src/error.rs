//! Error types for reference-store access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching reference data.
///
/// Every variant is fatal for the table being normalized.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The store could not be opened.
    #[error("failed to connect to reference store {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The query failed to prepare or execute.
    #[error("reference query failed ({query}): {message}")]
    Query { query: String, message: String },

    /// A keyed lookup named a field the result rows do not have.
    #[error("key field '{field}' not present in results of ({query})")]
    MissingKeyField { field: String, query: String },
}

impl ReferenceError {
    pub(crate) fn query(query: &str, message: impl ToString) -> Self {
        Self::Query {
            query: query.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;
