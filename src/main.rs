//! sshtap - auditing SSH pass-through proxy

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sshtap::cli::{commands, Cli, Commands, ExitCode};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Login(args) => commands::login::execute(args, config_path).await,
        Commands::Run(args) => commands::run::execute(args, config_path).await,
        Commands::Config(args) => commands::config::execute(args, config_path),
        Commands::Version => {
            commands::version::print_version(cli.verbose);
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from_error(&e).into()
        }
    }
}

/// Initialize logging with tracing-subscriber
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
