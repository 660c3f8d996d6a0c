//! In-memory history source with a fixed log and content map

use super::HistorySource;
use crate::error::{HistoryError, HistoryResult};
use crate::models::LogEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// [`HistorySource`] serving a fixed history.
///
/// Entries are recorded oldest first with [`MemorySource::commit`], the
/// order in which they would have been committed, and served newest first
/// like git does.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    root: PathBuf,
    entries: Vec<LogEntry>,
    snapshots: HashMap<(String, String), String>,
    log_error: Option<String>,
}

impl MemorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Record a revision and the content `path` had at it. `None` content
    /// means the path cannot be read at that revision.
    pub fn commit(mut self, entry: LogEntry, path: &str, content: Option<&str>) -> Self {
        if let Some(content) = content {
            self.snapshots
                .insert((entry.id.clone(), path.to_string()), content.to_string());
        }
        self.entries.push(entry);
        self
    }

    /// Make every `file_log` call fail.
    pub fn failing(mut self, reason: &str) -> Self {
        self.log_error = Some(reason.to_string());
        self
    }
}

impl HistorySource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn find_root(&self, start: &Path) -> Option<PathBuf> {
        start.starts_with(&self.root).then(|| self.root.clone())
    }

    fn file_log(&self, _root: &Path, _relative_path: &str) -> HistoryResult<Vec<LogEntry>> {
        if let Some(reason) = &self.log_error {
            return Err(HistoryError::unavailable(reason));
        }
        Ok(self.entries.iter().rev().cloned().collect())
    }

    fn read_at_revision(&self, _root: &Path, revision: &str, path: &str) -> HistoryResult<String> {
        self.snapshots
            .get(&(revision.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| HistoryError::snapshot_missing(revision, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: &str) -> LogEntry {
        LogEntry::new(id, "A", "a@x", Utc.timestamp_opt(1, 0).unwrap(), id)
    }

    #[test]
    fn test_serves_newest_first() {
        let source = MemorySource::new("/repo")
            .commit(entry("one"), "a.py", Some("1"))
            .commit(entry("two"), "a.py", None);

        let ids: Vec<_> = source
            .file_log(Path::new("/repo"), "a.py")
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["two", "one"]);

        let root = Path::new("/repo");
        assert_eq!(source.read_at_revision(root, "one", "a.py").unwrap(), "1");
        assert!(source.read_at_revision(root, "two", "a.py").is_err());
        assert!(source.read_at_revision(root, "one", "b.py").is_err());
    }

    #[test]
    fn test_find_root_and_failure() {
        let source = MemorySource::new("/repo").failing("corrupt");
        assert_eq!(source.find_root(Path::new("/repo/src")), Some(PathBuf::from("/repo")));
        assert_eq!(source.find_root(Path::new("/elsewhere")), None);
        assert!(source.file_log(Path::new("/repo"), "a.py").is_err());
    }
}
