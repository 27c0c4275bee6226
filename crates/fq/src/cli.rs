//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the fq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fq - Filter JSON records with grouped conditions
#[derive(Parser, Debug)]
#[command(name = "fq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ~/.config/fq/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the records that match the user and application filters
    #[command(alias = "a")]
    Apply {
        /// JSON file holding an array of records (default: stdin)
        records: Option<PathBuf>,

        /// Condition as PATH:OP:VALUE, e.g. status:EQ:open or age:BT:18..65 (repeatable)
        #[arg(short = 'w', long = "where", value_name = "COND", action = clap::ArgAction::Append)]
        conditions: Vec<String>,

        /// JSON or TOML file with additional user filter definitions
        #[arg(short, long, value_name = "FILE")]
        filters: Option<PathBuf>,

        /// Compare --where strings case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Treat date-looking strings as plain strings
        #[arg(long)]
        no_dates: bool,

        /// Skip the application filters from the config file
        #[arg(long)]
        no_app_filters: bool,

        /// Print only the number of matching records
        #[arg(short, long)]
        count: bool,

        /// Print records on a single line
        #[arg(long)]
        compact: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
}
