//! SSH transport
//!
//! Thin wrapper around the russh client: connect, authenticate, open a
//! PTY shell or run a single command. Everything above this module works
//! in terms of [`Connection`] and channels, never raw russh handles.

pub mod client;
pub mod handler;

pub use client::{ConnectOptions, Connection, ExecOutput};
pub use handler::ClientHandler;
