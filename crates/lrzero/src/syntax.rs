//! Textual grammar parsing.
//!
//! A grammar source holds one production per non-empty line, written
//! `lhs -> tok1 tok2 ...`. The arrow may be flush against either side,
//! right-hand tokens are separated by whitespace, and an empty right-hand
//! side denotes epsilon.

use std::fmt;

/// Name of the synthetic start symbol of the augmented grammar. It must
/// not occur in user productions.
pub const START_NAME: &str = "S'";

/// Name of the synthetic end-of-input terminal.
pub const EOI_NAME: &str = "$";

/// A production as written in the source, before interning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduction {
    pub left: String,
    pub right: Vec<String>,
}

/// A line that could not be turned into a production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source.
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("no `->` separator")]
    MissingArrow,

    #[error("empty left-hand side")]
    MissingLeft,

    #[error("the symbol `S'` is reserved for the augmented start production")]
    ReservedStart,
}

impl fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipping invalid line {} (`{}`): {}",
            self.line, self.text, self.reason
        )
    }
}

/// Split a grammar source into raw productions, dropping blank lines and
/// reporting the unparsable ones.
pub fn parse(source: &str) -> (Vec<RawProduction>, Vec<SkippedLine>) {
    let mut productions = Vec::new();
    let mut skipped = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut skip = |reason| {
            skipped.push(SkippedLine {
                line: index + 1,
                text: line.to_owned(),
                reason,
            });
        };

        let Some((left, right)) = line.split_once("->") else {
            skip(SkipReason::MissingArrow);
            continue;
        };

        let left = left.trim();
        let right: Vec<String> = right.split_whitespace().map(str::to_owned).collect();

        if left.is_empty() {
            skip(SkipReason::MissingLeft);
            continue;
        }
        if left == START_NAME || right.iter().any(|token| token == START_NAME) {
            skip(SkipReason::ReservedStart);
            continue;
        }

        productions.push(RawProduction {
            left: left.to_owned(),
            right,
        });
    }

    (productions, skipped)
}
