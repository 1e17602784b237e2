//! PTY relay loop
//!
//! Bidirectional byte pump between the local raw-mode terminal and the
//! remote channel. Bytes cross verbatim and unbuffered in both directions;
//! the keystroke gate and audit sink observe them on the side. The loop
//! multiplexes exactly three sources: local input, remote channel
//! messages, and terminal resize events.

use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::audit::{AuditSink, CommandRecord};
use crate::session::machine::{InputAction, InputGate};
use crate::Result;

/// Written locally when the remote side reaches end-of-stream.
pub const SESSION_CLOSED_NOTICE: &[u8] = b"\r\n\x1b[32;1m*** Session closed ***\x1b[0m\r\n";

/// Pump bytes between the local terminal and the remote channel until
/// either side reaches end-of-stream.
///
/// The caller is responsible for raw mode: enter before, restore after
/// (on every path). Resize events arrive as `(cols, rows)` pairs and are
/// propagated best-effort.
pub async fn run(
    channel: &mut Channel<Msg>,
    gate: &mut InputGate,
    audit: &mut AuditSink,
    principal: &str,
    remote_host: &str,
    resize: &mut mpsc::Receiver<(u16, u16)>,
) -> Result<()> {
    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            read = stdin.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    // Local end-of-input: tell the remote and unwind.
                    let _ = channel.eof().await;
                    break;
                }
                let decision = gate.on_local_input(&buf[..n]);
                if let Some(text) = decision.record {
                    let record = CommandRecord::new(principal, remote_host, text);
                    // An audit write failure must not kill a live session.
                    if let Err(e) = audit.record(&record) {
                        warn!(error = %e, "audit write failed");
                    }
                }
                match decision.action {
                    InputAction::Forward => channel.data(&buf[..n]).await?,
                    InputAction::Reject(notice) => channel.data(notice).await?,
                }
            }

            msg = channel.wait() => {
                match msg {
                    Some(ChannelMsg::Data { ref data }) => {
                        stdout.write_all(data).await?;
                        stdout.flush().await?;
                        // Invalid bytes are replaced, never fatal: one bad
                        // chunk must not end the session.
                        let text = String::from_utf8_lossy(data);
                        gate.on_remote_output(&text);
                    }
                    Some(ChannelMsg::ExtendedData { ref data, .. }) => {
                        stdout.write_all(data).await?;
                        stdout.flush().await?;
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        debug!(exit_status, "remote shell exited");
                    }
                    Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                        stdout.write_all(SESSION_CLOSED_NOTICE).await?;
                        stdout.flush().await?;
                        break;
                    }
                    Some(other) => {
                        debug!(?other, "ignoring channel message");
                    }
                }
            }

            Some((cols, rows)) = resize.recv() => {
                // Best-effort: a failed resize never disturbs the relay.
                if let Err(e) = channel.window_change(cols as u32, rows as u32, 0, 0).await {
                    debug!(error = %e, "window-change request failed");
                }
            }
        }
    }

    Ok(())
}
