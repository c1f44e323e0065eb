//! Response decoding errors
//!
//! Error codes:
//! - ELASTIC_DECODE_FAILED (ERROR)
//! - ELASTIC_NO_HITS (ERROR)

use thiserror::Error;

/// Result type for response decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Response decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The engine response is missing a required section or has the wrong shape
    #[error("Malformed search response: {0}")]
    Malformed(String),

    /// A single-result read found nothing
    #[error("Search returned no hits")]
    NoHits,
}

impl DecodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::Malformed(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::Malformed(_) => "ELASTIC_DECODE_FAILED",
            DecodeError::NoHits => "ELASTIC_NO_HITS",
        }
    }
}
