//! Version-control access for history reconstruction
//!
//! Everything the history engine needs from git goes through
//! [`HistorySource`]:
//!
//! - locate the repository root for a path
//! - list the revisions that touched a file, following renames
//! - read a file's content at a revision
//!
//! Three implementations are provided:
//!
//! - [`LibGitSource`] - libgit2 via the `git2` crate (default)
//! - [`GitCommandSource`] - shells out to the `git` binary
//! - [`MemorySource`] - fixed log and content, for tests
//!
//! # Example
//!
//! ```no_run
//! use whattodo::git::{HistorySource, LibGitSource};
//! use std::path::Path;
//!
//! let source = LibGitSource::new();
//! if let Some(root) = source.find_root(Path::new("src")) {
//!     let log = source.file_log(&root, "src/main.rs").unwrap_or_default();
//!     println!("{} revisions", log.len());
//! }
//! ```

mod command;
mod libgit;
mod memory;

pub use command::GitCommandSource;
pub use libgit::LibGitSource;
pub use memory::MemorySource;

use crate::error::HistoryResult;
use crate::models::LogEntry;
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Capability surface the history engine needs from a version-control system.
///
/// Implementations must be `Send + Sync` so snapshots can be fetched on a
/// rayon pool.
pub trait HistorySource: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Root of the working tree containing `start`, or `None` when `start` is
    /// not inside a repository (or the repository cannot be opened).
    fn find_root(&self, start: &Path) -> Option<PathBuf>;

    /// Revisions that touched `relative_path`, newest first, following renames.
    fn file_log(&self, root: &Path, relative_path: &str) -> HistoryResult<Vec<LogEntry>>;

    /// Content of `path` as committed at `revision`.
    fn read_at_revision(&self, root: &Path, revision: &str, path: &str) -> HistoryResult<String>;
}

/// Which [`HistorySource`] implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitBackend {
    #[default]
    LibGit2,
    Command,
}

impl GitBackend {
    pub fn source(self) -> Box<dyn HistorySource> {
        match self {
            GitBackend::LibGit2 => Box::new(LibGitSource::new()),
            GitBackend::Command => Box::new(GitCommandSource::new()),
        }
    }
}

impl FromStr for GitBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "libgit2" | "git2" => Ok(GitBackend::LibGit2),
            "git" | "command" | "cli" => Ok(GitBackend::Command),
            _ => Err(anyhow!(
                "Unknown git backend '{}'. Valid backends: libgit2, git",
                s
            )),
        }
    }
}

impl std::fmt::Display for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitBackend::LibGit2 => write!(f, "libgit2"),
            GitBackend::Command => write!(f, "git"),
        }
    }
}

/// Locate the repository root for `path` using libgit2.
///
/// A file path is resolved from its parent directory. Any failure is `None`.
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    let path = path.canonicalize().ok()?;
    let start = if path.is_file() { path.parent()? } else { path.as_path() };
    LibGitSource::new().find_root(start)
}
