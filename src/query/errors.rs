//! Query builder error types
//!
//! Error codes:
//! - ELASTIC_INVALID_ARGUMENT (REJECT)

use thiserror::Error;

/// Result type for query builder operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query builder errors
///
/// These are programming errors at the call site: an unknown attribute
/// name, an unsupported operator symbol, a malformed argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Passed parameter [{0}] is invalid")]
    InvalidArgument(String),
}

impl QueryError {
    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        QueryError::InvalidArgument(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidArgument(_) => "ELASTIC_INVALID_ARGUMENT",
        }
    }
}
