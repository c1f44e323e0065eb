//! Transport boundary
//!
//! The document-search client that actually talks to the engine lives
//! outside this crate. It receives compiled requests and returns the
//! engine's JSON untouched. Retries, connection pooling, cancellation and
//! timeouts all belong to the implementor.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::compiler::CompiledRequest;

/// Result type for transport calls
pub type TransportResult<T> = Result<T, TransportError>;

/// Failure signals a transport reports.
///
/// Conflicts and not-found responses are distinguished because the client
/// translates them; everything else passes through unexamined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Version or duplicate-id conflict (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Document or index not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other failure
    #[error("Transport failed: {0}")]
    Failed(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::Conflict(_) => "ELASTIC_TRANSPORT_CONFLICT",
            TransportError::NotFound(_) => "ELASTIC_TRANSPORT_NOT_FOUND",
            TransportError::Failed(_) => "ELASTIC_TRANSPORT_FAILED",
        }
    }
}

/// Engine operations a compiled request can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOperation {
    Search,
    Create,
    Update,
    Delete,
    DeleteByQuery,
}

impl TransportOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportOperation::Search => "search",
            TransportOperation::Create => "create",
            TransportOperation::Update => "update",
            TransportOperation::Delete => "delete",
            TransportOperation::DeleteByQuery => "delete_by_query",
        }
    }
}

impl fmt::Display for TransportOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document-search client.
///
/// Each call performs one blocking round trip and returns the engine's raw
/// JSON response.
pub trait Transport {
    fn search(&mut self, request: &CompiledRequest) -> TransportResult<Value>;

    fn create(&mut self, request: &CompiledRequest) -> TransportResult<Value>;

    fn update(&mut self, request: &CompiledRequest) -> TransportResult<Value>;

    fn delete(&mut self, request: &CompiledRequest) -> TransportResult<Value>;

    fn delete_by_query(&mut self, request: &CompiledRequest) -> TransportResult<Value>;

    /// Routes a request to the operation it was compiled for
    fn dispatch(
        &mut self,
        operation: TransportOperation,
        request: &CompiledRequest,
    ) -> TransportResult<Value> {
        match operation {
            TransportOperation::Search => self.search(request),
            TransportOperation::Create => self.create(request),
            TransportOperation::Update => self.update(request),
            TransportOperation::Delete => self.delete(request),
            TransportOperation::DeleteByQuery => self.delete_by_query(request),
        }
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn search(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        (**self).search(request)
    }

    fn create(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        (**self).create(request)
    }

    fn update(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        (**self).update(request)
    }

    fn delete(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        (**self).delete(request)
    }

    fn delete_by_query(&mut self, request: &CompiledRequest) -> TransportResult<Value> {
        (**self).delete_by_query(request)
    }
}
