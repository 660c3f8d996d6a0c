//! TODO comment extraction
//!
//! Matches TODO comments line by line with a configurable regex. Lines that
//! start with a string-literal delimiter are skipped so that TODOs quoted in
//! docstrings or examples are not reported.
//!
//! The string-literal check only looks at the line itself. A TODO comment on
//! a line *inside* a multi-line string that does not start with a quote is
//! still reported.

use crate::error::{HistoryError, HistoryResult};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Default TODO pattern: `#` or `//` (optionally repeated), the word TODO,
/// a separator (whitespace, `:` or `-`), then the TODO text in group 1.
/// Always matched case-insensitively.
pub const DEFAULT_TODO_PATTERN: &str = r"(?:^|\s)(?:#+|//+)\s*TODO[\s:-](.+)";

/// Default pattern for working-tree scans. Not anchored, so a TODO glued
/// to code (`x = 1#TODO: fix`) is still listed.
pub const DEFAULT_SCAN_PATTERN: &str = r"(?:#+|//+)\s*TODO[\s:-](.+)";

const STRING_DELIMITERS: [char; 2] = ['\'', '"'];

/// Extracts TODO bodies from text with a compiled pattern.
#[derive(Debug, Clone)]
pub struct TodoExtractor {
    pattern: Regex,
}

impl Default for TodoExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TODO_PATTERN).expect("valid regex")
    }
}

impl TodoExtractor {
    /// Compile `pattern` case-insensitively.
    ///
    /// The TODO text is taken from capture group 1, or the whole match when
    /// the pattern has no groups.
    pub fn new(pattern: &str) -> HistoryResult<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| HistoryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { pattern })
    }

    /// Extractor with [`DEFAULT_SCAN_PATTERN`].
    pub fn for_scan() -> Self {
        Self::new(DEFAULT_SCAN_PATTERN).expect("valid regex")
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// TODO text on a single line, trimmed. `None` for non-matching lines,
    /// string-literal lines and empty bodies.
    pub fn match_line(&self, line: &str) -> Option<String> {
        if line.trim_start().starts_with(STRING_DELIMITERS) {
            return None;
        }
        let caps = self.pattern.captures(line)?;
        let body = caps.get(1).or_else(|| caps.get(0))?.as_str().trim();
        if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        }
    }

    /// Distinct TODO bodies found anywhere in `content`.
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        content.lines().filter_map(|line| self.match_line(line)).collect()
    }
}
