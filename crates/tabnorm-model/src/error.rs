use thiserror::Error;

/// Errors raised when a table would violate its structural invariants.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{column}'")]
    DuplicateColumn { column: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
