//! Query compiler subsystem
//!
//! Turns a query state snapshot into a wire-shaped request for the
//! document-search engine.
//!
//! # Compilation Flow (strict order)
//!
//! 1. Group predicates at OR boundaries (AND binds tighter)
//! 2. Compile each predicate into a leaf clause or nested sub-query
//! 3. Assemble the boolean tree (must / should / must_not)
//! 4. Resolve the remaining aspects (projection, sort, aggregations, paging)
//! 5. Shape the request for the operation (search, create, update, delete, flush)
//!
//! # Invariants
//!
//! - Deterministic: the same snapshot always compiles to identical bytes
//! - Sparse: absent aspects never appear in the request
//! - Targeted: no request compiles without an index

mod errors;
mod grouper;
mod leaf;
mod request;
mod resolver;

pub use errors::{CompileError, CompileResult};
pub use grouper::{group_predicates, Combinator};
pub use leaf::{compile_leaf, MULTI_FIELD_SEPARATOR, NESTED_PATH_MARKER};
pub use request::CompiledRequest;
pub use resolver::Resolver;
