//! Argument structures for CLI commands

use clap::Args;

/// Arguments for the `login` command
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Remote host to connect to
    pub host: String,

    /// Remote SSH port (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Remote user name
    ///
    /// Defaults to the local OS user
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Hosts to run the command on (repeatable, duplicates ignored)
    #[arg(required = true)]
    pub hosts: Vec<String>,

    /// Command to execute on every host
    #[arg(short, long)]
    pub command: String,

    /// Remote SSH port (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Remote user name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Maximum concurrent sessions (overrides configuration)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Arguments for the `config` command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Validate configuration only
    #[arg(long)]
    pub validate: bool,

    /// Show default configuration
    #[arg(long)]
    pub show_default: bool,
}
