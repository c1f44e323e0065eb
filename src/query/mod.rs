//! Query state subsystem
//!
//! Holds the predicate model and the mutable state a builder accumulates
//! before compilation.
//!
//! # Lifecycle
//!
//! 1. A builder mutates one `QueryState` (index, predicates, sorts, ...)
//! 2. A terminal operation compiles a snapshot of it
//! 3. The builder replaces it with `reset()`, keeping index and document type
//!
//! A `QueryState` is never shared between concurrent operations.

mod ast;
mod errors;
mod filters;
mod state;

pub use ast::{AggregationKind, Conjunction, LeafKind, Operator, Predicate, SortDirection};
pub use errors::{QueryError, QueryResult};
pub use filters::Filters;
pub use state::{Attribute, QueryState};
