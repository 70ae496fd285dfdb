//! Sentence boundary checks over normalized comment text.
//!
//! Positions returned from this module are positions inside the given
//! text, with rune-based columns. The position mapper converts them back
//! to byte-accurate file positions.

use crate::position::TextPos;

pub const NO_PERIOD_MESSAGE: &str = "Comment should end in a period";
pub const NO_CAPITAL_MESSAGE: &str = "Sentence should start with a capital letter";

/// Valid sentence endings. A sentence can sit inside parenthesis, and a
/// colon is valid because it usually introduces a code example, which is
/// itself excluded from checks.
const LAST_CHARS: &[&str] = &[".", "?", "!", ".)", "?)", "!)", ":"];

/// Lowercase tokens whose trailing period is part of the token, not a
/// sentence boundary. Tunable allowlist, matched by prefix so the interior
/// periods of multi-segment abbreviations are inert too.
const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "vs.", "n.b.", "cf.", "approx.", "incl.",
];

/// Prefix-matching lookup over the abbreviation allowlist.
#[derive(Debug)]
pub struct AbbreviationList {
    entries: &'static [&'static str],
}

impl AbbreviationList {
    pub fn new() -> Self {
        Self {
            entries: ABBREVIATIONS,
        }
    }

    /// True when `token` followed by a period is an abbreviation or the
    /// beginning of one, e.g. "etc" or the "e" in "e.g.".
    fn period_is_interior(&self, token: &str) -> bool {
        let token = token.trim_start_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() || !token.chars().all(|c| c.is_lowercase() || c == '.') {
            return false;
        }
        let candidate = format!("{token}.");
        self.entries
            .iter()
            .any(|entry| *entry == candidate || entry.starts_with(&candidate))
    }
}

impl Default for AbbreviationList {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that the last sentence of the text ends in a valid terminator.
/// Returns the in-text position of the missing period, or `None` when the
/// text is fine (or entirely blank).
pub fn check_period(text: &str) -> Option<TextPos> {
    let lines: Vec<&str> = text.split('\n').collect();
    for (idx, raw) in lines.iter().enumerate().rev() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        if LAST_CHARS.iter().any(|c| line.ends_with(c)) {
            return None;
        }
        return Some(TextPos {
            line: idx + 1,
            column: line.chars().count() + 1,
        });
    }
    None
}

/// Scanner state for sentence segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentenceState {
    /// Somewhere inside a sentence.
    InSentence,
    /// Right after a terminator character.
    JustEnded,
    /// After terminator plus whitespace: the next letter starts a sentence.
    SentenceStart,
}

/// Check that each sentence starts with a capital letter. Returns in-text
/// positions of offending first letters.
///
/// The first sentence is not checked for declaration comments
/// (`skip_first`), because they conventionally start with the name of the
/// declared entity, which may be lowercase.
pub fn check_capital(text: &str, skip_first: bool, abbr: &AbbreviationList) -> Vec<TextPos> {
    let mut issues = Vec::new();
    let mut state = if skip_first {
        SentenceState::InSentence
    } else {
        SentenceState::SentenceStart
    };
    let mut line = 1;
    let mut column = 0;
    // Current run of non-whitespace characters, for abbreviation lookups.
    let mut token = String::new();

    for ch in text.chars() {
        column += 1;
        match ch {
            '\n' => {
                line += 1;
                column = 0;
                token.clear();
                if state == SentenceState::JustEnded {
                    state = SentenceState::SentenceStart;
                }
            }
            '.' if abbr.period_is_interior(&token) => {
                token.push(ch);
                state = SentenceState::InSentence;
            }
            '.' | '!' | '?' => {
                token.push(ch);
                state = SentenceState::JustEnded;
            }
            ')' if state == SentenceState::JustEnded => {
                token.push(ch);
            }
            _ if ch.is_whitespace() => {
                token.clear();
                if state == SentenceState::JustEnded {
                    state = SentenceState::SentenceStart;
                }
            }
            _ => {
                token.push(ch);
                if state == SentenceState::SentenceStart && ch.is_lowercase() {
                    issues.push(TextPos { line, column });
                }
                state = SentenceState::InSentence;
            }
        }
    }
    issues
}
