//! Revision enumeration with rename tracking

use crate::git::HistorySource;
use crate::models::{LogEntry, Revision};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// A file resolved against the repository that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Absolute repository root
    pub root: PathBuf,
    /// Path relative to `root`, `/`-separated
    pub relative: String,
}

/// Resolve `file` to its repository root and repo-relative path.
///
/// The root is looked up from the file's parent directory. Returns `None`
/// when the file is not inside a repository.
pub fn locate(source: &dyn HistorySource, file: &Path) -> Option<RepoFile> {
    let absolute = absolutize(file);
    let start = absolute.parent().unwrap_or(absolute.as_path());

    let Some(root) = source.find_root(start) else {
        debug!("{} is not inside a repository", file.display());
        return None;
    };

    let Ok(relative) = absolute.strip_prefix(&root) else {
        warn!("{} is outside repository root {}", absolute.display(), root.display());
        return None;
    };

    Some(RepoFile {
        relative: to_git_path(relative),
        root,
    })
}

/// Revisions of `file`, newest first, each carrying the path the file had
/// at that revision. Empty when the history cannot be read.
pub fn enumerate_revisions(source: &dyn HistorySource, file: &RepoFile) -> Vec<Revision> {
    match source.file_log(&file.root, &file.relative) {
        Ok(entries) => follow_renames(entries, &file.relative),
        Err(e) => {
            warn!("No history for {} ({}): {}", file.relative, source.name(), e);
            Vec::new()
        }
    }
}

/// Assign a historical path to each newest-first log entry.
///
/// A rename recorded on an entry applies to that entry's parent: the entry
/// itself keeps the new path, and every older entry gets the old path until
/// the next rename further back.
pub fn follow_renames(entries: Vec<LogEntry>, current_path: &str) -> Vec<Revision> {
    entries
        .into_iter()
        .scan(current_path.to_string(), |tracked, entry| {
            let path_here = tracked.clone();
            if let Some(old) = entry.renamed_from() {
                *tracked = old.to_string();
            }
            Some(Revision::from_entry(entry, path_here))
        })
        .collect()
}

fn absolutize(file: &Path) -> PathBuf {
    if let Ok(canonical) = file.canonicalize() {
        return canonical;
    }
    if file.is_absolute() {
        return file.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(file))
        .unwrap_or_else(|_| file.to_path_buf())
}

fn to_git_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
