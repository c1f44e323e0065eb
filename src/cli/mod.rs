//! CLI module for elasticql
//!
//! Provides command-line interface for:
//! - explain: compile a query description file and print the request

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Operation};
pub use commands::{compile_description, explain, load_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_description, read_description, write_json};
