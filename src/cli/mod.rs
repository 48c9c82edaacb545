//! CLI module for skyquery
//!
//! Provides command-line interface for:
//! - query: run one query request
//! - convert: re-encode a table between row and columnar form
//! - inspect: print a table's metadata and rows
//! - stats: histogram of one numeric column

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, TargetFormat};
pub use commands::{
    convert, convert_envelope, inspect, inspect_envelope, query, run, run_command, run_query,
    stats, stats_envelope, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_input, read_input, write_error, write_response, StatsInput, TableEnvelope};
