//! Keystroke gate
//!
//! Pure, I/O-free command-boundary tracking for one interactive session.
//! The relay feeds it every local keystroke chunk and every remote output
//! chunk; on a line terminator the accumulated echo is committed to the
//! reconstructor and the resulting command is checked against the
//! deny-list. Full-screen-editor suppression is tracked here too: while an
//! editor runs, keystrokes are not shell commands and nothing is emitted.

use std::collections::HashSet;

use crate::term::Reconstructor;

/// Everything echoed since the last commit boundary is bounded; during
/// editor suppression the stream can run long and old bytes are dropped.
const MAX_ACCUMULATOR: usize = 16 * 1024;

/// Recent remote output retained for prompt detection while suppressed.
const MAX_PROMPT_WINDOW: usize = 4 * 1024;

/// Sent to the remote in place of the line terminator for denied commands.
pub const REJECTION_NOTICE: &[u8] = b"\rOperation is not supported!\r\n";

/// What the relay should do with the keystroke chunk it just read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Forward the bytes to the remote unchanged.
    Forward,
    /// The line matched the deny-list: substitute this notice.
    Reject(&'static [u8]),
}

/// Outcome of feeding one keystroke chunk through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDecision {
    /// Reconstructed command to audit, when a non-empty, unsuppressed
    /// line was committed.
    pub record: Option<String>,
    pub action: InputAction,
}

impl InputDecision {
    fn forward(record: Option<String>) -> Self {
        Self {
            record,
            action: InputAction::Forward,
        }
    }
}

/// Per-session keystroke accumulation and suppression state.
pub struct InputGate {
    reconstructor: Reconstructor,
    deny_list: HashSet<String>,
    editor_commands: Vec<String>,
    /// Echoed output since the last commit boundary.
    accumulator: String,
    /// Remote output observed while suppressed, scanned for a prompt.
    prompt_window: String,
    /// Set once the user has typed since the last commit.
    input_mode: bool,
    suppressed: bool,
}

impl InputGate {
    pub fn new(
        reconstructor: Reconstructor,
        deny_list: Vec<String>,
        editor_commands: Vec<String>,
    ) -> Self {
        Self {
            reconstructor,
            deny_list: deny_list.into_iter().collect(),
            editor_commands,
            accumulator: String::new(),
            prompt_window: String::new(),
            input_mode: false,
            suppressed: false,
        }
    }

    /// Whether full-screen-editor suppression is currently active.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Feed one chunk of remote output (already lossily decoded).
    ///
    /// The echo of typed characters accumulates here; chunks containing a
    /// line break are program output, not echo, and are skipped.
    pub fn on_remote_output(&mut self, chunk: &str) {
        if self.suppressed {
            push_bounded(&mut self.prompt_window, chunk, MAX_PROMPT_WINDOW);
        }
        if self.input_mode && !chunk.contains(['\n', '\r']) {
            push_bounded(&mut self.accumulator, chunk, MAX_ACCUMULATOR);
        }
    }

    /// Feed one chunk of local keystrokes. A lone line terminator commits
    /// the accumulated line; everything else forwards untouched.
    pub fn on_local_input(&mut self, bytes: &[u8]) -> InputDecision {
        self.input_mode = true;
        if !matches!(bytes, b"\r" | b"\n" | b"\r\n") {
            return InputDecision::forward(None);
        }
        self.commit()
    }

    fn commit(&mut self) -> InputDecision {
        // A prompt observed in remote output means the editor exited and
        // lines are shell commands again.
        if self.suppressed
            && self
                .reconstructor
                .scrubber()
                .matches_prompt(&self.prompt_window)
        {
            tracing::debug!("editor suppression cleared by prompt match");
            self.suppressed = false;
        }

        let record = if self.suppressed {
            None
        } else {
            let text = self.reconstructor.reconstruct(&self.accumulator);
            (!text.is_empty()).then_some(text)
        };

        // The invocation itself is audited; only keystrokes inside the
        // editor are discarded.
        if let Some(text) = &record {
            if self
                .editor_commands
                .iter()
                .any(|prefix| text.starts_with(prefix.as_str()))
            {
                tracing::debug!(command = %text, "editor suppression set");
                self.suppressed = true;
            }
        }

        let action = match &record {
            Some(text) if self.deny_list.contains(text) => {
                tracing::warn!(command = %text, "command denied");
                InputAction::Reject(REJECTION_NOTICE)
            }
            _ => InputAction::Forward,
        };

        self.accumulator.clear();
        self.prompt_window.clear();
        self.input_mode = false;

        InputDecision { record, action }
    }
}

/// Append keeping at most `max` bytes, dropping the oldest (on a char
/// boundary) when the buffer overflows.
fn push_bounded(buf: &mut String, chunk: &str, max: usize) {
    buf.push_str(chunk);
    if buf.len() > max {
        let overflow = buf.len() - max;
        let cut = buf
            .char_indices()
            .find(|(i, _)| *i >= overflow)
            .map(|(i, _)| i)
            .unwrap_or(buf.len());
        buf.drain(..cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::scrub::DEFAULT_PROMPT_PATTERN;
    use crate::term::Scrubber;

    fn gate() -> InputGate {
        let scrubber = Scrubber::new(DEFAULT_PROMPT_PATTERN).unwrap();
        InputGate::new(
            Reconstructor::new(scrubber),
            vec!["reboot".into(), "shutdown".into(), "init".into()],
            vec!["vi".into(), "fg".into()],
        )
    }

    /// Type a command the way a real session would: keystrokes in, echo
    /// back, then the line terminator.
    fn type_line(g: &mut InputGate, echoed: &str) -> InputDecision {
        for c in echoed.chars() {
            let mut b = [0u8; 4];
            assert_eq!(
                g.on_local_input(c.encode_utf8(&mut b).as_bytes()).action,
                InputAction::Forward
            );
            g.on_remote_output(&c.to_string());
        }
        g.on_local_input(b"\r")
    }

    #[test]
    fn test_plain_command_committed() {
        let mut g = gate();
        let decision = type_line(&mut g, "uptime");
        assert_eq!(decision.record.as_deref(), Some("uptime"));
        assert_eq!(decision.action, InputAction::Forward);
    }

    #[test]
    fn test_empty_line_commits_nothing() {
        let mut g = gate();
        let decision = g.on_local_input(b"\r");
        assert_eq!(decision.record, None);
        assert_eq!(decision.action, InputAction::Forward);
    }

    #[test]
    fn test_denied_command_rejected_but_recorded() {
        let mut g = gate();
        let decision = type_line(&mut g, "reboot");
        assert_eq!(decision.record.as_deref(), Some("reboot"));
        assert_eq!(decision.action, InputAction::Reject(REJECTION_NOTICE));
    }

    #[test]
    fn test_deny_list_is_exact_match() {
        let mut g = gate();
        let decision = type_line(&mut g, "reboot --help");
        assert_eq!(decision.action, InputAction::Forward);
    }

    #[test]
    fn test_edited_line_reconstructed_before_deny_check() {
        let mut g = gate();
        // User typed "rebooX", backspaced once, finished with "t".
        let decision = type_line(&mut g, "rebooX\u{8}\u{1b}[Kt");
        assert_eq!(decision.record.as_deref(), Some("reboot"));
        assert_eq!(decision.action, InputAction::Reject(REJECTION_NOTICE));
    }

    #[test]
    fn test_output_lines_not_accumulated() {
        let mut g = gate();
        g.on_local_input(b"l");
        g.on_remote_output("l");
        // Program output with line breaks is not echo.
        g.on_remote_output("total 12\r\nfile-a\r\nfile-b\r\n");
        let decision = g.on_local_input(b"\r");
        assert_eq!(decision.record.as_deref(), Some("l"));
    }

    #[test]
    fn test_suppression_round_trip() {
        let mut g = gate();

        // The editor invocation is audited and sets suppression.
        let decision = type_line(&mut g, "vi notes.txt");
        assert_eq!(decision.record.as_deref(), Some("vi notes.txt"));
        assert!(g.is_suppressed());

        // Keystrokes inside the editor are not commands.
        let decision = type_line(&mut g, ":wq");
        assert_eq!(decision.record, None);
        assert!(g.is_suppressed());

        // The shell prompt reappears in output: suppression clears and
        // the next line is reconstructed normally.
        g.on_remote_output("[admin@web01 ~]$ ");
        let decision = type_line(&mut g, "uptime");
        assert_eq!(decision.record.as_deref(), Some("uptime"));
        assert!(!g.is_suppressed());
    }

    #[test]
    fn test_foreground_job_sets_suppression() {
        let mut g = gate();
        let decision = type_line(&mut g, "fg");
        assert_eq!(decision.record.as_deref(), Some("fg"));
        assert!(g.is_suppressed());
    }

    #[test]
    fn test_accumulator_bounded() {
        let mut g = gate();
        g.on_local_input(b"x");
        let chunk = "y".repeat(1000);
        for _ in 0..100 {
            g.on_remote_output(&chunk);
        }
        assert!(g.accumulator.len() <= MAX_ACCUMULATOR);
    }

    #[test]
    fn test_prompt_window_bounded_while_suppressed() {
        let mut g = gate();
        type_line(&mut g, "vi big.txt");
        let chunk = "z".repeat(1000);
        for _ in 0..100 {
            g.on_remote_output(&chunk);
        }
        assert!(g.prompt_window.len() <= MAX_PROMPT_WINDOW);
    }

    #[test]
    fn test_push_bounded_drops_oldest() {
        let mut buf = String::from("abcdef");
        push_bounded(&mut buf, "ghij", 8);
        assert_eq!(buf, "cdefghij");
    }
}
