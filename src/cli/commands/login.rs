//! Login command - audited interactive session to one host

use std::io::{Read, Write};
use std::path::Path;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::audit::{self, AuditSink};
use crate::cli::args::LoginArgs;
use crate::config::load_config_or_default;
use crate::session::{relay, InputGate, Lifecycle, Session};
use crate::ssh::{ConnectOptions, Connection};
use crate::term::raw::{enter_raw_mode, terminal_size};
use crate::term::{Reconstructor, Scrubber};
use crate::{Error, Result};

/// Execute the login command
pub async fn execute(args: LoginArgs, config_path: Option<&Path>) -> Result<()> {
    let loaded = load_config_or_default(config_path)?;
    let cfg = loaded.config.expand()?;

    let port = args.port.unwrap_or(cfg.port);
    let local_user = audit::local_user();
    let principal = args.user.clone().unwrap_or_else(|| local_user.clone());

    // An unwritable audit log is fatal before anything touches the network.
    let mut audit_sink = AuditSink::open(&cfg.log_dir, &local_user)?;

    let scrubber = Scrubber::new(&cfg.prompt_pattern)?;
    let mut gate = InputGate::new(
        Reconstructor::new(scrubber),
        cfg.deny_list.clone(),
        cfg.editor_commands.clone(),
    );

    let mut session = Session::new(args.host.clone(), port, principal.clone());

    let mut conn = Connection::open(ConnectOptions {
        host: args.host.clone(),
        port,
        principal: principal.clone(),
        key_path: cfg.key_path.clone(),
        connect_timeout: cfg.connect_timeout,
        keepalive: cfg.keepalive,
        inactivity_timeout: cfg.inactivity_timeout,
    })
    .await?;

    let mut authenticated = match conn.authenticate_key().await {
        Ok(accepted) => accepted,
        Err(e) => {
            debug!(error = %e, "public-key authentication unavailable");
            false
        }
    };
    if !authenticated {
        let password = prompt_password(&format!("{}@{}'s password: ", principal, args.host))?;
        authenticated = conn.authenticate_password(&password).await?;
    }
    if !authenticated {
        return Err(Error::Authentication(format!(
            "all authentication methods failed for {}@{}",
            principal, args.host
        )));
    }
    session.advance(Lifecycle::Authenticated)?;

    let (cols, rows) = terminal_size();
    let mut channel = conn.open_shell(&cfg.term, cols, rows).await?;
    session.advance(Lifecycle::Interactive)?;
    info!(
        host = %args.host,
        principal = %principal,
        audit_log = %audit_sink.path().display(),
        "interactive session started"
    );

    let (resize_tx, mut resize_rx) = mpsc::channel::<(u16, u16)>(8);
    tokio::spawn(async move {
        let Ok(mut winch) = signal(SignalKind::window_change()) else {
            return;
        };
        while winch.recv().await.is_some() {
            let _ = resize_tx.send(terminal_size()).await;
        }
    });

    let mut guard = enter_raw_mode()?;
    let outcome = relay::run(
        &mut channel,
        &mut gate,
        &mut audit_sink,
        &principal,
        &args.host,
        &mut resize_rx,
    )
    .await;
    guard.restore();

    session.advance(Lifecycle::Closed)?;
    if let Err(e) = conn.disconnect().await {
        debug!(error = %e, "disconnect after session close failed");
    }
    outcome
}

/// Read a password from the local terminal without echoing it.
fn prompt_password(prompt: &str) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut guard = enter_raw_mode()?;
    let stdin = std::io::stdin();
    let mut handle = stdin.lock();
    let mut bytes = Vec::new();
    let mut byte = [0u8; 1];
    let outcome = loop {
        if let Err(e) = handle.read_exact(&mut byte) {
            break Err(Error::Io(e));
        }
        match byte[0] {
            b'\r' | b'\n' => break Ok(String::from_utf8_lossy(&bytes).into_owned()),
            // Ctrl-C / Ctrl-D abort
            0x03 | 0x04 => {
                break Err(Error::Authentication("password entry aborted".to_string()));
            }
            0x08 | 0x7f => {
                bytes.pop();
            }
            b => bytes.push(b),
        }
    };
    guard.restore();
    writeln!(stderr)?;
    outcome
}
