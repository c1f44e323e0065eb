//! Client error types
//!
//! Error codes:
//! - ELASTIC_INVALID_ARGUMENT (REJECT, from the query builder)
//! - ELASTIC_MISSING_INDEX / ELASTIC_INVALID_PREDICATE (REJECT, from compilation)
//! - ELASTIC_DECODE_FAILED / ELASTIC_NO_HITS (from decoding)
//! - ELASTIC_TRANSPORT_* (passed through from the transport)
//! - ELASTIC_DOCUMENT_EXISTS (create conflict)
//! - ELASTIC_NOT_FOUND_DOCUMENT (update on a missing id)
//! - ELASTIC_UNEXPECTED_RESULT (engine answered with an unknown status)
//! - ELASTIC_CONFIG_ERROR (configuration file or environment)

use thiserror::Error;

use crate::client::transport::TransportError;
use crate::compiler::CompileError;
use crate::query::QueryError;
use crate::response::DecodeError;

/// Result type for client operations
pub type ElasticResult<T> = Result<T, ElasticError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElasticError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A document with this id already exists
    #[error("Document already exists: {0}")]
    DocumentExists(String),

    /// Update targeted an id the engine does not know
    #[error("Document not found: {0}")]
    NotFoundDocument(String),

    /// Engine answered a write with a result this client does not expect
    #[error("Unexpected result from engine: {0}")]
    UnexpectedResult(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ElasticError {
    pub fn unexpected_result(result: impl Into<String>) -> Self {
        ElasticError::UnexpectedResult(result.into())
    }

    pub fn config(reason: impl Into<String>) -> Self {
        ElasticError::Config(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ElasticError::Query(e) => e.code(),
            ElasticError::Compile(e) => e.code(),
            ElasticError::Decode(e) => e.code(),
            ElasticError::Transport(e) => e.code(),
            ElasticError::DocumentExists(_) => "ELASTIC_DOCUMENT_EXISTS",
            ElasticError::NotFoundDocument(_) => "ELASTIC_NOT_FOUND_DOCUMENT",
            ElasticError::UnexpectedResult(_) => "ELASTIC_UNEXPECTED_RESULT",
            ElasticError::Config(_) => "ELASTIC_CONFIG_ERROR",
        }
    }

    /// Returns true if the caller may retry or adjust and try again.
    ///
    /// Builder and compilation errors are programming errors and never
    /// recover on retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ElasticError::Transport(TransportError::Failed(_))
                | ElasticError::DocumentExists(_)
                | ElasticError::NotFoundDocument(_)
                | ElasticError::Decode(DecodeError::NoHits)
        )
    }
}
