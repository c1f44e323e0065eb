//! CLI command implementations
//!
//! `explain` never contacts an engine: it compiles a query description
//! and prints the request a client would hand to its transport.

use std::path::Path;

use serde_json::Value;

use crate::client::{ElasticConfig, ElasticError};
use crate::compiler::{CompiledRequest, Resolver};
use crate::observability::Logger;
use crate::query::{Attribute, QueryState};

use super::args::{Cli, Command, Operation};
use super::errors::{CliError, CliResult};
use super::io::{read_description, write_json};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Explain {
            config,
            query,
            operation,
        } => explain(config.as_deref(), query.as_deref(), operation),
    }
}

/// Compile a query description and print the request as pretty JSON
pub fn explain(
    config_path: Option<&Path>,
    query_path: Option<&Path>,
    operation: Operation,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let description = read_description(query_path)?;
    let request = compile_description(&config, &description, operation)?;

    write_json(&request.into_value())
}

/// Configuration from `path`, or from the environment when absent
pub fn load_config(path: Option<&Path>) -> CliResult<ElasticConfig> {
    let config = match path {
        Some(path) => ElasticConfig::load(path)?,
        None => ElasticConfig::from_env()?,
    };
    Ok(config)
}

/// Applies every key of `description` to a state seeded with the
/// configured index, then compiles it for `operation`.
///
/// Keys must name a query attribute (`index`, `type`, `limit`, `offset`,
/// `columns`, `wheres`, `orders`, `aggs`, `scroll`).
pub fn compile_description(
    config: &ElasticConfig,
    description: &Value,
    operation: Operation,
) -> CliResult<CompiledRequest> {
    let fields = description
        .as_object()
        .ok_or_else(|| CliError::invalid_query("query description must be a JSON object"))?;

    let mut state = QueryState::for_index(config.index.as_str());
    for (key, value) in fields {
        let attribute = Attribute::from_name(key).map_err(ElasticError::from)?;
        state.set(attribute, value).map_err(ElasticError::from)?;
    }

    let request = match operation {
        Operation::Search => Resolver::resolve_search(&state),
        Operation::Flush => Resolver::resolve_flush(&state),
    }
    .map_err(ElasticError::from)?;

    Ok(request)
}
