//! CLI argument definitions using clap
//!
//! Commands:
//! - skyquery query [--config <path>]
//! - skyquery convert --to row|columnar [--split] [--config <path>]
//! - skyquery inspect [--config <path>]
//! - skyquery stats [--config <path>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// skyquery - query pushdown over serialized table partitions
#[derive(Parser, Debug)]
#[command(name = "skyquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one query request read from stdin
    Query,

    /// Re-encode a table read from stdin
    Convert {
        /// Output format
        #[arg(long, value_enum)]
        to: TargetFormat,

        /// Split columnar output into shards of max_rows_per_shard rows
        #[arg(long)]
        split: bool,
    },

    /// Print a table's metadata and rows
    Inspect,

    /// Histogram of one numeric column of a table read from stdin
    Stats,
}

/// Conversion target
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Row,
    Columnar,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
