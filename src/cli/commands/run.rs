//! Run command - one command across many hosts

use std::path::Path;
use std::sync::Arc;

use crate::audit;
use crate::batch;
use crate::cli::args::RunArgs;
use crate::config::{load_config_or_default, ExpandedConfig};
use crate::ssh::{ConnectOptions, Connection, ExecOutput};
use crate::{Error, Result};

const GREEN: &str = "\x1b[1;32m";
const RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Execute the run command
pub async fn execute(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let loaded = load_config_or_default(config_path)?;
    let cfg = Arc::new(loaded.config.expand()?);

    let port = args.port.unwrap_or(cfg.port);
    let principal = args.user.clone().unwrap_or_else(audit::local_user);
    let workers = args.workers.unwrap_or(cfg.workers).max(1);
    let command = Arc::new(args.command.clone());

    let results = batch::run_all(args.hosts, workers, move |host| {
        let cfg = Arc::clone(&cfg);
        let command = Arc::clone(&command);
        let principal = principal.clone();
        async move { exec_on_host(&host, port, &principal, &cfg, &command).await }
    })
    .await;

    let mut failed = 0usize;
    for (host, outcome) in &results {
        report(host, outcome);
        if !matches!(outcome, Ok(output) if output.success()) {
            failed += 1;
        }
    }

    tracing::info!(hosts = results.len(), failed, "batch run complete");
    if failed > 0 {
        return Err(Error::Other(format!(
            "{failed} of {} hosts failed",
            results.len()
        )));
    }
    Ok(())
}

/// Batch sessions authenticate with the key only: there is no terminal to
/// prompt on while the pool runs.
async fn exec_on_host(
    host: &str,
    port: u16,
    principal: &str,
    cfg: &ExpandedConfig,
    command: &str,
) -> Result<ExecOutput> {
    let mut conn = Connection::open(ConnectOptions {
        host: host.to_string(),
        port,
        principal: principal.to_string(),
        key_path: cfg.key_path.clone(),
        connect_timeout: cfg.connect_timeout,
        keepalive: cfg.keepalive,
        inactivity_timeout: cfg.inactivity_timeout,
    })
    .await?;

    if !conn.authenticate_key().await? {
        return Err(Error::Authentication(format!(
            "public-key authentication rejected by {host}"
        )));
    }

    let output = conn.exec(command).await?;
    if let Err(e) = conn.disconnect().await {
        tracing::debug!(host, error = %e, "disconnect after exec failed");
    }
    Ok(output)
}

fn report(host: &str, outcome: &Result<ExecOutput>) {
    match outcome {
        Ok(output) if output.success() => {
            println!("{GREEN}{host} | SUCCESS :{RESET}");
            print_block(&output.stdout);
        }
        Ok(output) => {
            println!("{RED}{host} | FAILED :{RESET}");
            if output.stderr.is_empty() {
                println!(
                    "non-zero return code ({})",
                    output
                        .exit_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
            } else {
                print_block(&output.stderr);
            }
        }
        Err(e) => {
            println!("{RED}{host} | FAILED : {e}{RESET}");
        }
    }
}

fn print_block(text: &str) {
    if text.is_empty() {
        return;
    }
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}
