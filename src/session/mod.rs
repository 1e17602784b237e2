//! Session lifecycle
//!
//! A session moves `Connecting -> Authenticated -> Interactive -> Closed`
//! and is owned by exactly one relay loop. The keystroke gate
//! ([`machine::InputGate`]) and the byte pump ([`relay`]) live in the
//! submodules.

pub mod machine;
pub mod relay;

pub use machine::{InputAction, InputDecision, InputGate};

use crate::{Error, Result};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Connecting,
    Authenticated,
    Interactive,
    Closed,
}

impl Lifecycle {
    /// Legal forward transitions. `Closed` is terminal; every state may
    /// close.
    pub fn can_transition(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Connecting, Authenticated)
                | (Connecting, Closed)
                | (Authenticated, Interactive)
                | (Authenticated, Closed)
                | (Interactive, Closed)
        )
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Lifecycle::Connecting => "connecting",
            Lifecycle::Authenticated => "authenticated",
            Lifecycle::Interactive => "interactive",
            Lifecycle::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// One proxied session to a remote host.
#[derive(Debug, Clone)]
pub struct Session {
    host: String,
    port: u16,
    principal: String,
    state: Lifecycle,
}

impl Session {
    pub fn new(host: impl Into<String>, port: u16, principal: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            principal: principal.into(),
            state: Lifecycle::Connecting,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Move to the next lifecycle state, rejecting illegal transitions.
    pub fn advance(&mut self, next: Lifecycle) -> Result<()> {
        if !self.state.can_transition(next) {
            return Err(Error::Protocol(format!(
                "illegal session transition {} -> {}",
                self.state, next
            )));
        }
        tracing::debug!(
            host = %self.host,
            principal = %self.principal,
            from = %self.state,
            to = %next,
            "session transition"
        );
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut s = Session::new("10.0.0.1", 22, "admin");
        assert_eq!(s.state(), Lifecycle::Connecting);
        s.advance(Lifecycle::Authenticated).unwrap();
        s.advance(Lifecycle::Interactive).unwrap();
        s.advance(Lifecycle::Closed).unwrap();
        assert_eq!(s.state(), Lifecycle::Closed);
    }

    #[test]
    fn test_every_state_may_close() {
        for state in [Lifecycle::Connecting, Lifecycle::Authenticated, Lifecycle::Interactive] {
            assert!(state.can_transition(Lifecycle::Closed));
        }
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut s = Session::new("h", 22, "a");
        s.advance(Lifecycle::Closed).unwrap();
        assert!(s.advance(Lifecycle::Authenticated).is_err());
        assert!(s.advance(Lifecycle::Interactive).is_err());
        assert!(s.advance(Lifecycle::Closed).is_err());
    }

    #[test]
    fn test_cannot_skip_authentication() {
        let mut s = Session::new("h", 22, "a");
        let err = s.advance(Lifecycle::Interactive).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
