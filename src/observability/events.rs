//! Observable events
//!
//! Every event the crate logs is listed here.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,

    // Compilation
    /// A request was compiled from query state
    RequestCompiled,
    /// Compilation rejected the query state
    RequestRejected,

    // Transport
    /// A compiled request was handed to the transport
    RequestDispatched,
    /// The transport reported a failure
    TransportFailed,

    // Reads
    /// Search returned and decoded
    SearchCompleted,

    // Writes
    /// Document created
    DocumentCreated,
    /// Document updated (including no-op updates)
    DocumentUpdated,
    /// Document deleted
    DocumentDeleted,
    /// Every document under an index deleted
    IndexFlushed,
    /// The engine answered with a status this crate does not expect
    UnexpectedResult,

    // State
    /// Query state replaced after a terminal operation
    StateReset,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestCompiled => "REQUEST_COMPILED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestDispatched => "REQUEST_DISPATCHED",
            Event::TransportFailed => "TRANSPORT_FAILED",
            Event::SearchCompleted => "SEARCH_COMPLETED",
            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentUpdated => "DOCUMENT_UPDATED",
            Event::DocumentDeleted => "DOCUMENT_DELETED",
            Event::IndexFlushed => "INDEX_FLUSHED",
            Event::UnexpectedResult => "UNEXPECTED_RESULT",
            Event::StateReset => "STATE_RESET",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RequestCompiled | Event::RequestDispatched | Event::StateReset => {
                Severity::Trace
            }
            Event::RequestRejected | Event::TransportFailed => Severity::Warn,
            Event::UnexpectedResult => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
