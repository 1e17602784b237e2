//! Command implementations

pub mod config;
pub mod login;
pub mod run;
pub mod version;
