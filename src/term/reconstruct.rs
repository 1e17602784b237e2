//! Command reconstruction
//!
//! Replays the remote shell's line editing over the echoed byte stream to
//! recover the logical command the user typed. Edits arrive in echo order:
//! a backspace run opens an edit region, text typed inside the region is
//! held pending, and a clear-to-EOL (or the end of the stream) splices the
//! pending text into place, discarding whatever the remote told the
//! terminal to erase.

use super::scrub::Scrubber;
use super::tokenizer::{strip_noise, Token, Tokenizer};

/// Reconstructed command text is capped to bound audit log size.
pub const MAX_COMMAND_LEN: usize = 200;

/// Stateful reconstruction over one raw accumulator.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    scrubber: Scrubber,
}

impl Reconstructor {
    pub fn new(scrubber: Scrubber) -> Self {
        Self { scrubber }
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    /// Rebuild the command line from everything echoed since the last
    /// commit boundary. Returns scrubbed text truncated to
    /// [`MAX_COMMAND_LEN`] characters.
    pub fn reconstruct(&self, raw: &str) -> String {
        let cleaned = strip_noise(raw);

        let mut result: Vec<char> = Vec::new();
        // Text typed while the cursor sits inside an edit region.
        let mut pending: Vec<char> = Vec::new();
        // How far left of end-of-line the cursor currently is. Clamped to
        // the reconstructed length, never used as a negative index.
        let mut backspaces: usize = 0;

        for token in Tokenizer::new(&cleaned) {
            match token {
                Token::Literal(text) => {
                    let target = if backspaces == 0 { &mut result } else { &mut pending };
                    target.extend(text.chars());
                }
                Token::Backspaces(n) => {
                    // A new run while an edit region is open commits the
                    // previous region first.
                    if backspaces > 0 {
                        splice(&mut result, &mut pending, backspaces);
                    }
                    backspaces = n.min(result.len());
                }
                Token::ClearToEol { backspaces: trailing } => {
                    splice(&mut result, &mut pending, backspaces);
                    // Backspaces trailing the erase chop the tail: the
                    // remote discarded those characters too.
                    let keep = result.len().saturating_sub(trailing);
                    result.truncate(keep);
                    backspaces = 0;
                }
                Token::Replace(text) => {
                    let chars: Vec<char> = text.chars().collect();
                    let at = result.len().saturating_sub(backspaces);
                    for (i, c) in chars.iter().enumerate() {
                        match result.get_mut(at + i) {
                            Some(slot) => *slot = *c,
                            None => result.push(*c),
                        }
                    }
                    // One backspace-equivalent consumed per character.
                    backspaces = backspaces.saturating_sub(chars.len());
                }
                Token::Passthrough(c) => {
                    let target = if backspaces == 0 { &mut result } else { &mut pending };
                    target.push(c);
                }
            }
        }

        // A still-open pending edit splices in like a clear-to-EOL. Bare
        // trailing backspaces with nothing typed after them only moved the
        // cursor and erase nothing.
        if !pending.is_empty() {
            splice(&mut result, &mut pending, backspaces);
        }

        let text: String = result.into_iter().collect();
        self.scrubber
            .scrub(&text)
            .chars()
            .take(MAX_COMMAND_LEN)
            .collect()
    }
}

/// Splice the pending edit into the committed text: truncate back to the
/// cursor position (clamped) and append the pending text.
fn splice(result: &mut Vec<char>, pending: &mut Vec<char>, backspaces: usize) {
    let keep = result.len().saturating_sub(backspaces);
    result.truncate(keep);
    result.append(pending);
}
