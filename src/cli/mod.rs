//! CLI module for sshtap
//!
//! This module provides the command-line interface using clap derive macros.

pub mod args;
pub mod commands;
pub mod exit_code;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{ConfigArgs, LoginArgs, RunArgs};
pub use exit_code::ExitCode;

/// Auditing SSH pass-through proxy
#[derive(Parser, Debug)]
#[command(name = "sshtap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true, env = "SSHTAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open an audited interactive session to a host
    Login(LoginArgs),

    /// Run one command on many hosts over a worker pool
    Run(RunArgs),

    /// Show or validate configuration
    Config(ConfigArgs),

    /// Show version information
    Version,
}
