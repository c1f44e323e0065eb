//! CLI argument definitions using clap
//!
//! Commands:
//! - elasticql explain --config <path> --query <path> [--operation search|flush]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// elasticql - compile fluent query descriptions into search engine requests
#[derive(Parser, Debug)]
#[command(name = "elasticql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a query description and print the request without sending it
    Explain {
        /// Path to configuration file; environment variables when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the JSON query description; stdin when omitted
        #[arg(long)]
        query: Option<PathBuf>,

        /// Operation to compile for
        #[arg(long, value_enum, default_value_t = Operation::Search)]
        operation: Operation,
    },
}

/// Operations `explain` can compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Search,
    Flush,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
