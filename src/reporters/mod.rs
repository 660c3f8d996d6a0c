//! Output reporters for TODO history and scan results
//!
//! Supports multiple output formats:
//! - `text` - Plain terminal output
//! - `markdown` - GitHub-flavored Markdown
//! - `json` - Machine-readable JSON
//! - `tsv` - Tab-separated values (scan results only)

mod json;
mod markdown;
mod text;
mod tsv;

use crate::models::{ReconciliationEvent, ScannedTodo};
use anyhow::{anyhow, bail, Result};
use std::path::Path;
use std::str::FromStr;

/// Timestamp format used in every human-readable report
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) const NO_HISTORY_MESSAGE: &str = "No TODO changes found";
pub(crate) const NO_TODOS_MESSAGE: &str = "No TODOs found";

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
    Tsv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, markdown, json, tsv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Tsv => write!(f, "tsv"),
        }
    }
}

impl OutputFormat {
    /// Format implied by an output file's extension, if any.
    ///
    /// `.md` is Markdown, `.json` is JSON, `.txt` is text and `.tsv` is TSV.
    pub fn from_output_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "md" | "markdown" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            "txt" => Some(OutputFormat::Text),
            "tsv" => Some(OutputFormat::Tsv),
            _ => None,
        }
    }
}

/// Render TODO history events in the specified format
pub fn report_history(events: &[ReconciliationEvent], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_history(events)),
        OutputFormat::Markdown => Ok(markdown::render_history(events)),
        OutputFormat::Json => json::render(events),
        OutputFormat::Tsv => bail!("TSV output is only available for scan results"),
    }
}

/// Render current-tree scan results in the specified format
pub fn report_scan(todos: &[ScannedTodo], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_scan(todos)),
        OutputFormat::Markdown => Ok(markdown::render_scan(todos)),
        OutputFormat::Json => json::render(todos),
        OutputFormat::Tsv => Ok(tsv::render_scan(todos)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{LogEntry, Revision};
    use chrono::{Local, TimeZone, Utc};
    use std::path::PathBuf;

    /// Two events: one adding two TODOs, one swapping a TODO
    pub(crate) fn test_events() -> Vec<ReconciliationEvent> {
        let rev = |id: &str, seconds: i64, subject: &str| {
            let entry = LogEntry::new(
                id,
                "Ada Lovelace",
                "ada@example.com",
                Utc.timestamp_opt(seconds, 0).unwrap(),
                subject,
            );
            Revision::from_entry(entry, "app.py".into())
        };

        vec![
            ReconciliationEvent::new(
                rev("0123456789abcdef0123456789abcdef01234567", 1_700_000_000, "Initial commit"),
                vec!["add test".into(), "fix bug".into()],
                vec![],
            ),
            ReconciliationEvent::new(
                rev("fedcba9876543210fedcba9876543210fedcba98", 1_700_003_600, "Fix the bug"),
                vec![],
                vec!["fix bug".into()],
            ),
        ]
    }

    pub(crate) fn test_todos() -> Vec<ScannedTodo> {
        vec![ScannedTodo {
            file: "app.py".into(),
            path: PathBuf::from("/work/app.py"),
            line: 4,
            todo: "handle\ttabs".into(),
            context: "def main():".into(),
            scope: "def main():".into(),
            modified: Local.timestamp_opt(1_700_000_000, 0).single(),
        }]
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from_str("tsv").unwrap(), OutputFormat::Tsv);
        assert!(OutputFormat::from_str("html").is_err());
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_format_from_output_path() {
        assert_eq!(
            OutputFormat::from_output_path(Path::new("out/todos.MD")),
            Some(OutputFormat::Markdown)
        );
        assert_eq!(
            OutputFormat::from_output_path(Path::new("history.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_output_path(Path::new("todos.csv")), None);
        assert_eq!(OutputFormat::from_output_path(Path::new("todos")), None);
    }

    #[test]
    fn test_tsv_rejected_for_history() {
        assert!(report_history(&test_events(), OutputFormat::Tsv).is_err());
        assert!(report_scan(&test_todos(), OutputFormat::Tsv).is_ok());
    }

    #[test]
    fn test_empty_inputs_have_explicit_message() {
        for format in [OutputFormat::Text, OutputFormat::Markdown] {
            assert!(report_history(&[], format).unwrap().contains(NO_HISTORY_MESSAGE));
            assert!(report_scan(&[], format).unwrap().contains(NO_TODOS_MESSAGE));
        }
    }
}
