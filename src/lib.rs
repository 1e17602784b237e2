//! sshtap - auditing SSH pass-through proxy
//!
//! This library relays an interactive terminal to a remote host over SSH
//! while reconstructing, from the raw escaped byte stream, the logical
//! commands the user typed. Reconstructed commands are written to an
//! append-only per-user-per-day audit log and checked against a deny-list
//! before the line is allowed through to the remote shell.

pub mod audit;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod ssh;
pub mod term;

pub use error::{Error, Result};

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const NAME: &str = env!("CARGO_PKG_NAME");
