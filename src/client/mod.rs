//! Client subsystem
//!
//! The caller-facing surface: a fluent [`Elastic`] builder over one
//! [`Transport`], its configuration and its error taxonomy.
//!
//! # Terminal operations
//!
//! | Call | Transport | Success |
//! |---|---|---|
//! | `create` | `create` | engine result `created` |
//! | `update` | `update` | engine result `updated` or `noop` |
//! | `delete` | `delete` | engine result `deleted` |
//! | `flush` | `delete_by_query` | any answer |
//! | `first` / `list` / `paginate` / `raw_search` | `search` | decodable answer |
//!
//! Conflicts on create become `DocumentExists`; not-found on update or
//! delete becomes `NotFoundDocument`. No call is retried here.

mod config;
mod elastic;
mod errors;
mod transport;

pub use config::{ElasticConfig, ENV_DEFAULT_INDEX, ENV_HOST, ENV_RETRIES};
pub use elastic::{Elastic, DEFAULT_ID_FIELD};
pub use errors::{ElasticError, ElasticResult};
pub use transport::{Transport, TransportError, TransportOperation, TransportResult};
