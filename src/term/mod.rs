//! Terminal byte-stream analysis
//!
//! This module turns the raw escaped byte stream echoed by a remote shell
//! back into the logical command line the user typed. The pipeline is:
//! noise pre-pass -> tokenizer -> reconstructor -> residual scrub.
//! It also owns the local raw-mode guard used by the relay loop.

pub mod raw;
pub mod reconstruct;
pub mod scrub;
pub mod tokenizer;

pub use raw::RestoreGuard;
pub use reconstruct::{Reconstructor, MAX_COMMAND_LEN};
pub use scrub::Scrubber;
pub use tokenizer::{strip_noise, Token, Tokenizer};
