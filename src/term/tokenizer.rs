//! Control-sequence tokenizer
//!
//! Splits one chunk of echoed terminal output into classified tokens.
//! The tokenizer is a priority-ordered lexer: at every position the rules
//! below are tried in order against the unconsumed input and the first
//! match wins. It is restartable per chunk; continuation state across
//! chunks lives in the reconstructor, not here.

use std::sync::LazyLock;

use regex::Regex;

/// Backspace control byte as echoed by the remote line editor.
const BS: char = '\u{8}';

/// A classified slice of echoed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Maximal run of word or whitespace characters.
    Literal(String),
    /// `ESC [ K` (erase to end of line), optionally followed by a run of
    /// backspaces that leaves the cursor further left.
    ClearToEol { backspaces: usize },
    /// Run of bare backspaces, cursor repositioning without erasure.
    Backspaces(usize),
    /// One or more `ESC [ 1 @ <char>` pairs: the line editor's
    /// insert-character idiom. Carries the inserted characters.
    Replace(String),
    /// Anything else, emitted one character at a time.
    Passthrough(char),
}

/// Non-semantic noise removed before tokenization: bell, single
/// delete-character, bare carriage return.
static NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x07|\x1b\[1P|\r").expect("noise pattern"));

/// Pre-pass over a chunk before tokenization.
///
/// Besides the noise characters, repeated backspace-then-cursor-right
/// pairs (a left/right arrow dance that cancels out) are removed so they
/// cannot be misread as edit operations.
pub fn strip_noise(chunk: &str) -> String {
    let mut s = NOISE.replace_all(chunk.trim(), "").into_owned();
    while s.contains("\u{8}\u{1b}[C") {
        s = s.trim_end().replace("\u{8}\u{1b}[C", "");
    }
    s
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte length of a leading `\s* \w+ \s*` run, or `None` if the input
/// does not start with one (at least one word character is required).
fn literal_len(s: &str) -> Option<usize> {
    fn whitespace_prefix(s: &str) -> usize {
        s.char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or(s.len())
    }

    let lead = whitespace_prefix(s);
    let rest = &s[lead..];
    let word = rest
        .char_indices()
        .find(|(_, c)| !is_word(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if word == 0 {
        return None;
    }
    let trail = whitespace_prefix(&rest[word..]);
    Some(lead + word + trail)
}

/// Lazy tokenizer over one pre-stripped chunk.
pub struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(chunk: &'a str) -> Self {
        Self { rest: chunk }
    }

    fn take(&mut self, len: usize) -> &'a str {
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        head
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.rest.is_empty() {
            return None;
        }

        // 1. Literal run
        if let Some(len) = literal_len(self.rest) {
            return Some(Token::Literal(self.take(len).to_string()));
        }

        // 2. Clear-to-EOL, with any trailing backspace run attached
        if let Some(after) = self.rest.strip_prefix("\u{1b}[K") {
            let backspaces = after.chars().take_while(|c| *c == BS).count();
            self.rest = &after[backspaces..];
            return Some(Token::ClearToEol { backspaces });
        }

        // 3. Bare backspace run
        let backspaces = self.rest.chars().take_while(|c| *c == BS).count();
        if backspaces > 0 {
            self.rest = &self.rest[backspaces..];
            return Some(Token::Backspaces(backspaces));
        }

        // 4. Insert-character run
        let mut rest = self.rest;
        let mut text = String::new();
        loop {
            let Some(after) = rest.strip_prefix("\u{1b}[1@") else {
                break;
            };
            let Some(c) = after.chars().next().filter(|c| is_word(*c)) else {
                break;
            };
            text.push(c);
            rest = &after[c.len_utf8()..];
        }
        if !text.is_empty() {
            self.rest = rest;
            return Some(Token::Replace(text));
        }

        // 5. Passthrough, one character
        let c = self.rest.chars().next()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(Token::Passthrough(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<Token> {
        Tokenizer::new(s).collect()
    }

    #[test]
    fn test_literal_run() {
        assert_eq!(
            tokens("ls -al"),
            vec![
                Token::Literal("ls ".to_string()),
                Token::Passthrough('-'),
                Token::Literal("al".to_string()),
            ]
        );
    }

    #[test]
    fn test_literal_requires_word_char() {
        assert_eq!(literal_len("   "), None);
        assert_eq!(literal_len("-x"), None);
        assert_eq!(literal_len("  cd  "), Some(6));
    }

    #[test]
    fn test_backspace_run() {
        assert_eq!(
            tokens("abc\u{8}\u{8}"),
            vec![Token::Literal("abc".to_string()), Token::Backspaces(2)]
        );
    }

    #[test]
    fn test_clear_to_eol_with_trailing_backspaces() {
        assert_eq!(
            tokens("\u{1b}[K\u{8}\u{8}\u{8}"),
            vec![Token::ClearToEol { backspaces: 3 }]
        );
    }

    #[test]
    fn test_clear_to_eol_without_backspaces() {
        assert_eq!(tokens("\u{1b}[K"), vec![Token::ClearToEol { backspaces: 0 }]);
    }

    #[test]
    fn test_backspaces_then_clear_are_separate_tokens() {
        assert_eq!(
            tokens("\u{8}\u{8}\u{1b}[K"),
            vec![Token::Backspaces(2), Token::ClearToEol { backspaces: 0 }]
        );
    }

    #[test]
    fn test_replace_run_single() {
        assert_eq!(
            tokens("\u{1b}[1@r"),
            vec![Token::Replace("r".to_string())]
        );
    }

    #[test]
    fn test_replace_run_multiple() {
        assert_eq!(
            tokens("\u{1b}[1@a\u{1b}[1@b\u{1b}[1@c"),
            vec![Token::Replace("abc".to_string())]
        );
    }

    #[test]
    fn test_replace_requires_word_char() {
        // ESC [ 1 @ followed by punctuation is not the insert idiom;
        // the pieces fall through to passthrough.
        let toks = tokens("\u{1b}[1@-");
        assert!(toks.iter().all(|t| !matches!(t, Token::Replace(_))));
    }

    #[test]
    fn test_unknown_escape_passes_through_char_by_char() {
        assert_eq!(
            tokens("\u{1b}[A"),
            vec![
                Token::Passthrough('\u{1b}'),
                Token::Passthrough('['),
                Token::Literal("A".to_string()),
            ]
        );
    }

    #[test]
    fn test_strip_noise_bell_and_cr() {
        assert_eq!(strip_noise("a\u{7}b\rc"), "abc");
    }

    #[test]
    fn test_strip_noise_delete_char() {
        assert_eq!(strip_noise("ab\u{1b}[1Pc"), "abc");
    }

    #[test]
    fn test_strip_noise_arrow_pairs() {
        assert_eq!(strip_noise("echo\u{8}\u{1b}[C hi"), "echo hi");
    }

    #[test]
    fn test_strip_noise_trims() {
        assert_eq!(strip_noise("  ls  "), "ls");
    }

    #[test]
    fn test_empty_chunk() {
        assert!(tokens("").is_empty());
    }
}
