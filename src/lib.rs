//! elasticql - a fluent query builder and compiler for document search engines
//!
//! Predicates, sorts and aggregations accumulate in a query state; a
//! terminal call compiles it into a wire-shaped request, hands that to a
//! transport and decodes the answer.
//!
//! ```ignore
//! use elasticql::{Elastic, Filters, Operator, SortDirection};
//!
//! let mut client = Elastic::new(transport);
//! let page = client
//!     .index("users")
//!     .where_term("status", "active")
//!     .or_where_range("age", Operator::Gte, 65)
//!     .order_by("age", SortDirection::Desc)
//!     .paginate(1, 20)?;
//! ```

pub mod cli;
pub mod client;
pub mod compiler;
pub mod observability;
pub mod query;
pub mod response;

pub use client::{
    Elastic, ElasticConfig, ElasticError, ElasticResult, Transport, TransportError,
    TransportOperation, TransportResult,
};
pub use compiler::{CompileError, CompiledRequest, Resolver};
pub use query::{
    AggregationKind, Attribute, Conjunction, Filters, LeafKind, Operator, Predicate,
    QueryError, QueryState, SortDirection,
};
pub use response::{DecodeError, Document, Paginator, SearchResult};
