//! SSH client connection

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use tracing::{debug, info, warn};

use crate::ssh::handler::ClientHandler;
use crate::{Error, Result};

/// Everything needed to reach and authenticate against one host.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub principal: String,
    pub key_path: PathBuf,
    pub connect_timeout: Duration,
    pub keepalive: Duration,
    pub inactivity_timeout: Option<Duration>,
}

/// Output of a single non-interactive command.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: Option<u32>,
}

impl ExecOutput {
    /// True when the remote command reported exit status zero.
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

/// An authenticated (or authenticating) connection to one remote host.
pub struct Connection {
    handle: Handle<ClientHandler>,
    options: ConnectOptions,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Establish the TCP + SSH transport. Authentication happens
    /// separately so callers can fall back between methods.
    pub async fn open(options: ConnectOptions) -> Result<Self> {
        let config = Arc::new(client::Config {
            keepalive_interval: Some(options.keepalive),
            inactivity_timeout: options.inactivity_timeout,
            ..Default::default()
        });

        debug!(host = %options.host, port = options.port, "connecting");
        let connect = client::connect(
            config,
            (options.host.as_str(), options.port),
            ClientHandler,
        );
        let handle = tokio::time::timeout(options.connect_timeout, connect)
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "connection to {}:{} timed out after {:?}",
                    options.host, options.port, options.connect_timeout
                ))
            })?
            .map_err(|e| {
                Error::Connection(format!(
                    "cannot connect to {}:{}: {}",
                    options.host, options.port, e
                ))
            })?;

        Ok(Self { handle, options })
    }

    pub fn host(&self) -> &str {
        &self.options.host
    }

    pub fn principal(&self) -> &str {
        &self.options.principal
    }

    /// Try public-key authentication with the configured key file.
    ///
    /// A missing or unreadable key is an authentication error; a key the
    /// server rejects yields `Ok(false)` so the caller can fall back to
    /// a password.
    pub async fn authenticate_key(&mut self) -> Result<bool> {
        let key = russh_keys::load_secret_key(&self.options.key_path, None).map_err(|e| {
            Error::Authentication(format!(
                "cannot load private key '{}': {}",
                self.options.key_path.display(),
                e
            ))
        })?;

        let accepted = self
            .handle
            .authenticate_publickey(&self.options.principal, Arc::new(key))
            .await?;
        if accepted {
            info!(host = %self.options.host, principal = %self.options.principal,
                "public-key authentication accepted");
        } else {
            debug!(host = %self.options.host, "public-key authentication rejected");
        }
        Ok(accepted)
    }

    /// Try password authentication.
    pub async fn authenticate_password(&mut self, password: &str) -> Result<bool> {
        let accepted = self
            .handle
            .authenticate_password(&self.options.principal, password)
            .await?;
        if !accepted {
            warn!(host = %self.options.host, principal = %self.options.principal,
                "password authentication rejected");
        }
        Ok(accepted)
    }

    /// Open a session channel with a PTY and an interactive shell.
    pub async fn open_shell(&mut self, term: &str, cols: u16, rows: u16) -> Result<Channel<Msg>> {
        let channel = self.handle.channel_open_session().await?;
        channel
            .request_pty(true, term, cols as u32, rows as u32, 0, 0, &[])
            .await?;
        channel.request_shell(true).await?;
        debug!(host = %self.options.host, term, cols, rows, "shell opened");
        Ok(channel)
    }

    /// Run one command without a PTY and collect its output.
    pub async fn exec(&mut self, command: &str) -> Result<ExecOutput> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut output = ExecOutput::default();
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { ref data }) => {
                    output.stdout.push_str(&String::from_utf8_lossy(data));
                }
                Some(ChannelMsg::ExtendedData { ref data, ext: 1 }) => {
                    output.stderr.push_str(&String::from_utf8_lossy(data));
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    output.exit_status = Some(exit_status);
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }
        Ok(output)
    }

    /// Politely end the transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
