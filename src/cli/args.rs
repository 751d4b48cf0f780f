//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Assemble company hierarchies and roll up travel costs bottom-up
#[derive(Parser, Debug)]
#[command(name = "costtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (overrides the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Company source: URL or file path
    #[arg(long, global = true)]
    pub companies: Option<String>,

    /// Travel source: URL or file path
    #[arg(long, global = true)]
    pub travels: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the nested cost report as JSON (default)
    Report {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
        /// Print total run time to stderr
        #[arg(short, long)]
        timing: bool,
        /// Write the report to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the company forest with costs as a tree
    Tree,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,
    /// Show the global config file path
    Path,
}
