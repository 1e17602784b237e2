//! russh client handler

use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;
use tracing::debug;

/// Minimal client-side event handler.
///
/// Host keys are accepted without verification; trust is assumed to be
/// established out of band (managed fleet, bastion-local known hosts).
pub struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        debug!(
            algorithm = server_public_key.name(),
            "accepting server host key"
        );
        Ok(true)
    }
}
