//! Compiler error types
//!
//! Error codes:
//! - ELASTIC_MISSING_INDEX (REJECT)
//! - ELASTIC_INVALID_PREDICATE (REJECT)

use thiserror::Error;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Compilation errors, raised before anything reaches the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No target index was set
    #[error("Missing index: every operation requires a target index")]
    MissingIndex,

    /// A predicate cannot be expressed as a leaf clause
    #[error("Invalid predicate on '{column}': {reason}")]
    InvalidPredicate { column: String, reason: String },
}

impl CompileError {
    pub fn invalid_predicate(column: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::InvalidPredicate {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::MissingIndex => "ELASTIC_MISSING_INDEX",
            CompileError::InvalidPredicate { .. } => "ELASTIC_INVALID_PREDICATE",
        }
    }
}
