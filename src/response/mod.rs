//! Response decoding subsystem
//!
//! Inverse of the compiler: parses the engine's raw JSON into typed results.
//!
//! # Read Modes
//!
//! - Single result: the first merged hit, failing when there are none
//! - Listing: every merged hit plus totals, shard stats, timing and aggregations
//!
//! Each hit is its source document with `_id` and `_score` injected.

mod errors;
mod paginator;
mod result;

pub use errors::{DecodeError, DecodeResult};
pub use paginator::Paginator;
pub use result::{Document, SearchResult};
