//! Local terminal raw mode
//!
//! The relay puts the local terminal into raw mode for the lifetime of an
//! interactive session and must restore it on every exit path: normal
//! close, error, or unwind. [`RestoreGuard`] makes restoration idempotent
//! so an explicit restore followed by drop runs the action exactly once.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::Result;

/// Runs a restore action exactly once, on explicit call or on drop.
pub struct RestoreGuard<F: FnMut()> {
    restore: F,
    armed: bool,
}

impl<F: FnMut()> RestoreGuard<F> {
    pub fn new(restore: F) -> Self {
        Self { restore, armed: true }
    }

    /// Run the restore action now. Subsequent calls (and drop) are no-ops.
    pub fn restore(&mut self) {
        if self.armed {
            self.armed = false;
            (self.restore)();
        }
    }
}

impl<F: FnMut()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Switch the local terminal to raw mode, returning a guard that restores
/// the original mode.
pub fn enter_raw_mode() -> Result<RestoreGuard<impl FnMut()>> {
    enable_raw_mode()?;
    Ok(RestoreGuard::new(|| {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }))
}

/// Current local terminal size as (cols, rows), with a conventional
/// fallback when the size cannot be queried (e.g. not a tty).
pub fn terminal_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or((80, 24))
}
