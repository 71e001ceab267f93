//! Error types for table normalization.

use tabnorm_model::ModelError;
use tabnorm_reference::ReferenceError;
use thiserror::Error;

/// Errors that abort the normalization of a table.
///
/// Per-value parse failures and column-level coercion failures are not
/// errors; they show up as [`Adjustment`](crate::Adjustment)s in the report.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The reference dictionary could not be resolved.
    #[error("reference lookup failed: {0}")]
    Reference(#[from] ReferenceError),

    /// The normalized table would break a table invariant.
    #[error("invalid normalized table: {0}")]
    Model(#[from] ModelError),
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, TransformError>;
