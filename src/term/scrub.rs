//! Residual control-sequence scrubbing
//!
//! After reconstruction the command text can still carry escape sequences
//! that are not line-edit operations: colors, window-title updates, device
//! control strings, and the shell prompt itself. The scrubber removes all
//! of these before the text is audited.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Escape and control sequences with no bearing on the typed command:
/// charset selections, carriage returns, CSI commands, OSC strings, DCS/PM/
/// APC strings, stray two-byte escapes, and C1 control characters.
static CONTROL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \x1b[\x20\#%()*+./-].
        | \r
        | (?:\x1b\[|\x9b) [\x20-\x3f]* [\x40-\x7e]
        | (?:\x1b\]|\x9d) .*? (?:\x1b\\|\x07|\x9c)
        | (?:\x1b[P\^_]|[\x90\x9e\x9f]) .*? (?:\x1b\\|\x9c)
        | \x1b.
        | [\x80-\x9f]
        ",
    )
    .expect("control pattern")
});

/// Removes residual escapes and prompt markers from reconstructed text.
///
/// The prompt pattern is configuration, not a constant: prompt shapes vary
/// per site and the default only covers the common `[user@host]$` form.
#[derive(Debug, Clone)]
pub struct Scrubber {
    prompt: Regex,
}

impl Scrubber {
    /// Build a scrubber with the given shell-prompt pattern.
    pub fn new(prompt_pattern: &str) -> Result<Self> {
        let prompt = Regex::new(prompt_pattern)
            .map_err(|e| Error::Config(format!("invalid prompt pattern '{prompt_pattern}': {e}")))?;
        Ok(Self { prompt })
    }

    /// Whether the text contains a shell prompt marker.
    pub fn matches_prompt(&self, text: &str) -> bool {
        self.prompt.is_match(text)
    }

    /// Strip control sequences and prompt markers, trimming the result.
    pub fn scrub(&self, text: &str) -> String {
        let cleaned = CONTROL.replace_all(text.trim(), "");
        let cleaned = self.prompt.replace_all(&cleaned, "");
        cleaned.trim().to_string()
    }
}

/// Default prompt pattern: `[anything@anything]$` or `#`.
pub const DEFAULT_PROMPT_PATTERN: &str = r"\[[^\]]*@[^\]]*\][$#]";

#[cfg(test)]
mod tests {
    use super::*;

    fn scrubber() -> Scrubber {
        Scrubber::new(DEFAULT_PROMPT_PATTERN).unwrap()
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(scrubber().scrub("ls -al /tmp"), "ls -al /tmp");
    }

    #[test]
    fn test_csi_color_removed() {
        assert_eq!(scrubber().scrub("\u{1b}[1;32mls\u{1b}[0m"), "ls");
    }

    #[test]
    fn test_osc_title_removed() {
        assert_eq!(scrubber().scrub("\u{1b}]0;title\u{7}whoami"), "whoami");
    }

    #[test]
    fn test_dcs_removed() {
        assert_eq!(scrubber().scrub("\u{1b}Pq data\u{1b}\\date"), "date");
    }

    #[test]
    fn test_prompt_marker_removed() {
        assert_eq!(scrubber().scrub("[root@web01 ~]$ uptime"), "uptime");
        assert_eq!(scrubber().scrub("[ops@db]# df -h"), "df -h");
    }

    #[test]
    fn test_carriage_return_removed() {
        assert_eq!(scrubber().scrub("echo\rhi"), "echohi");
    }

    #[test]
    fn test_c1_controls_removed() {
        assert_eq!(scrubber().scrub("a\u{9b}1mb"), "ab");
    }

    #[test]
    fn test_invalid_prompt_pattern_is_config_error() {
        let err = Scrubber::new("[unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
