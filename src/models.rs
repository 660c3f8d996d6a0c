//! Core data models for whattodo
//!
//! These models describe revisions of a tracked file, the TODO changes
//! attributed to each revision, and TODOs found in the current tree.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of hash characters shown in reports.
pub const SHORT_ID_LEN: usize = 8;

/// A per-file status line attached to a log entry (`M`, `A`, `D`, `R100`...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Status code as reported by git (`R` codes may carry a similarity score)
    pub code: String,
    /// Previous path, present for renames and copies
    pub old_path: Option<String>,
}

impl FileStatus {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            old_path: None,
        }
    }

    pub fn renamed(old_path: impl Into<String>) -> Self {
        Self {
            code: "R".to_string(),
            old_path: Some(old_path.into()),
        }
    }

    /// The path the file had before this revision, if this status is a rename.
    pub fn renamed_from(&self) -> Option<&str> {
        if self.code.starts_with('R') {
            self.old_path.as_deref()
        } else {
            None
        }
    }
}

/// One entry of a file's change log, as returned by a history source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Full commit hash
    pub id: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    /// First line of the commit message
    pub subject: String,
    pub statuses: Vec<FileStatus>,
}

impl LogEntry {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        email: impl Into<String>,
        timestamp: DateTime<Utc>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            email: email.into(),
            timestamp,
            subject: subject.into(),
            statuses: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.statuses.push(status);
        self
    }

    /// Old path recorded by the first rename status line, if any.
    pub fn renamed_from(&self) -> Option<&str> {
        self.statuses.iter().find_map(FileStatus::renamed_from)
    }
}

/// A revision of a tracked file, with the path the file had at that revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: String,
    pub author: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Path of the file relative to the repository root at this revision
    pub path: String,
}

impl Revision {
    pub fn from_entry(entry: LogEntry, path: String) -> Self {
        Self {
            id: entry.id,
            author: entry.author,
            email: entry.email,
            timestamp: entry.timestamp,
            message: entry.subject,
            path,
        }
    }

    /// Abbreviated hash (first 8 characters).
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

/// Whether a TODO appeared or disappeared at a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Added,
    Removed,
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TodoStatus::Added => write!(f, "added"),
            TodoStatus::Removed => write!(f, "removed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub todo: String,
    pub status: TodoStatus,
}

/// TODO additions and removals attributed to a single revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEvent {
    pub revision: Revision,
    /// Added items first, then removed items, each group sorted by text
    pub todos: Vec<TodoItem>,
}

impl ReconciliationEvent {
    pub fn new(revision: Revision, added: Vec<String>, removed: Vec<String>) -> Self {
        let todos = added
            .into_iter()
            .map(|todo| TodoItem {
                todo,
                status: TodoStatus::Added,
            })
            .chain(removed.into_iter().map(|todo| TodoItem {
                todo,
                status: TodoStatus::Removed,
            }))
            .collect();
        Self { revision, todos }
    }

    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.with_status(TodoStatus::Added)
    }

    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.with_status(TodoStatus::Removed)
    }

    fn with_status(&self, status: TodoStatus) -> impl Iterator<Item = &str> {
        self.todos
            .iter()
            .filter(move |t| t.status == status)
            .map(|t| t.todo.as_str())
    }
}

/// A TODO comment found in the current working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedTodo {
    /// File name without directories
    pub file: String,
    /// Absolute path to the file
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub todo: String,
    /// The line directly above the TODO, trimmed
    pub context: String,
    /// Nearest enclosing definition line, or `main`
    pub scope: String,
    pub modified: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: &str) -> LogEntry {
        LogEntry::new(id, "Ada", "ada@example.com", Utc.timestamp_opt(0, 0).unwrap(), "init")
    }

    #[test]
    fn test_short_id() {
        let rev = Revision::from_entry(entry("0123456789abcdef"), "a.py".into());
        assert_eq!(rev.short_id(), "01234567");

        let rev = Revision::from_entry(entry("abc"), "a.py".into());
        assert_eq!(rev.short_id(), "abc");
    }

    #[test]
    fn test_renamed_from_only_for_rename_codes() {
        let modified = FileStatus {
            code: "M".into(),
            old_path: Some("ignored.py".into()),
        };
        assert_eq!(modified.renamed_from(), None);

        let renamed = FileStatus {
            code: "R087".into(),
            old_path: Some("old.py".into()),
        };
        assert_eq!(renamed.renamed_from(), Some("old.py"));

        let e = entry("abc").with_status(FileStatus::new("M")).with_status(renamed);
        assert_eq!(e.renamed_from(), Some("old.py"));
    }

    #[test]
    fn test_event_orders_added_before_removed() {
        let rev = Revision::from_entry(entry("abc"), "a.py".into());
        let event = ReconciliationEvent::new(rev, vec!["new".into()], vec!["old".into()]);
        assert_eq!(event.todos[0].status, TodoStatus::Added);
        assert_eq!(event.todos[1].status, TodoStatus::Removed);
        assert_eq!(event.added().collect::<Vec<_>>(), vec!["new"]);
        assert_eq!(event.removed().collect::<Vec<_>>(), vec!["old"]);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TodoStatus::Removed).unwrap();
        assert_eq!(json, "\"removed\"");
    }
}
