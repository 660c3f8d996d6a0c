//! History source backed by libgit2
//!
//! Walks first-parent history from HEAD and follows a file across renames by
//! running rename detection on the commit where the tracked path first
//! appears.

use super::HistorySource;
use crate::error::{HistoryError, HistoryResult};
use crate::models::{FileStatus, LogEntry};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Delta, Diff, DiffFindOptions, DiffOptions, Oid, Repository, Sort, Tree};
use std::path::{Path, PathBuf};
use tracing::debug;

/// libgit2-backed [`HistorySource`].
///
/// The repository is reopened for every call so a single source can be
/// shared across rayon workers (`git2::Repository` is not `Sync`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LibGitSource;

impl LibGitSource {
    pub fn new() -> Self {
        Self
    }

    fn open(root: &Path) -> HistoryResult<Repository> {
        Repository::open(root).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => HistoryError::NotARepository {
                path: root.to_path_buf(),
            },
            _ => HistoryError::unavailable(e),
        })
    }
}

impl HistorySource for LibGitSource {
    fn name(&self) -> &'static str {
        "libgit2"
    }

    fn find_root(&self, start: &Path) -> Option<PathBuf> {
        let repo = Repository::discover(start).ok()?;
        let workdir = repo.workdir()?;
        debug!("Opened git repository at {:?}", repo.path());
        Some(workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf()))
    }

    fn file_log(&self, root: &Path, relative_path: &str) -> HistoryResult<Vec<LogEntry>> {
        let repo = Self::open(root)?;
        let mut revwalk = repo.revwalk().map_err(HistoryError::unavailable)?;
        revwalk.set_sorting(Sort::TIME).map_err(HistoryError::unavailable)?;
        revwalk.push_head().map_err(HistoryError::unavailable)?;
        revwalk.simplify_first_parent().map_err(HistoryError::unavailable)?;

        let mut entries = Vec::new();
        let mut tracked = relative_path.to_string();

        for oid_result in revwalk {
            let oid = oid_result.map_err(HistoryError::unavailable)?;
            let commit = repo.find_commit(oid).map_err(HistoryError::unavailable)?;

            let tree = commit.tree().map_err(HistoryError::unavailable)?;
            let parent_tree = commit
                .parent(0)
                .ok()
                .map(|p| p.tree())
                .transpose()
                .map_err(HistoryError::unavailable)?;

            let Some(status) = file_status(&repo, parent_tree.as_ref(), &tree, &tracked)
                .map_err(HistoryError::unavailable)?
            else {
                continue;
            };

            let mut entry = extract_log_entry(&commit);
            if let Some(old) = status.renamed_from() {
                debug!("{} renamed from {} in {}", tracked, old, &entry.id[..12.min(entry.id.len())]);
                tracked = old.to_string();
            }
            entry.statuses.push(status);
            entries.push(entry);
        }

        Ok(entries)
    }

    fn read_at_revision(&self, root: &Path, revision: &str, path: &str) -> HistoryResult<String> {
        let repo = Self::open(root)?;
        let missing = |_| HistoryError::snapshot_missing(revision, path);

        let oid = Oid::from_str(revision).map_err(missing)?;
        let commit = repo.find_commit(oid).map_err(missing)?;
        let tree = commit.tree().map_err(missing)?;
        let entry = tree.get_path(Path::new(path)).map_err(missing)?;
        let blob = entry
            .to_object(&repo)
            .and_then(|object| object.peel_to_blob())
            .map_err(missing)?;

        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

/// Status of `path` between `parent` and `tree`, or `None` if untouched.
///
/// When the path is added, the whole-tree diff is searched for a rename
/// whose target is `path`.
fn file_status(
    repo: &Repository,
    parent: Option<&Tree>,
    tree: &Tree,
    path: &str,
) -> Result<Option<FileStatus>, git2::Error> {
    let mut diff_opts = DiffOptions::new();
    diff_opts.pathspec(path).disable_pathspec_match(true);
    let diff = repo.diff_tree_to_tree(parent, Some(tree), Some(&mut diff_opts))?;

    let Some(delta) = diff.deltas().next() else {
        return Ok(None);
    };

    if delta.status() != Delta::Added || parent.is_none() {
        return Ok(Some(FileStatus::new(status_code(delta.status()))));
    }

    let mut full = repo.diff_tree_to_tree(parent, Some(tree), None)?;
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    full.find_similar(Some(&mut find_opts))?;

    Ok(Some(
        rename_source(&full, path)
            .map(FileStatus::renamed)
            .unwrap_or_else(|| FileStatus::new("A")),
    ))
}

/// Old path of a rename whose new path is `path`.
fn rename_source(diff: &Diff, path: &str) -> Option<String> {
    diff.deltas()
        .filter(|d| d.status() == Delta::Renamed)
        .find(|d| d.new_file().path() == Some(Path::new(path)))
        .and_then(|d| d.old_file().path().map(|p| p.to_string_lossy().replace('\\', "/")))
}

fn status_code(delta: Delta) -> &'static str {
    match delta {
        Delta::Added => "A",
        Delta::Deleted => "D",
        Delta::Modified => "M",
        Delta::Renamed => "R",
        Delta::Copied => "C",
        Delta::Typechange => "T",
        _ => "X",
    }
}

fn extract_log_entry(commit: &git2::Commit) -> LogEntry {
    let author = commit.author();
    let subject = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string();

    LogEntry::new(
        commit.id().to_string(),
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or(""),
        git_time(&commit.time()),
        subject,
    )
}

fn git_time(time: &git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    /// Small helper for building repositories commit by commit.
    struct TestRepo {
        dir: tempfile::TempDir,
        repo: Repository,
        time: i64,
    }

    impl TestRepo {
        fn new() -> Result<Self> {
            let dir = tempdir()?;
            let repo = Repository::init(dir.path())?;
            let mut config = repo.config()?;
            config.set_str("user.name", "Test User")?;
            config.set_str("user.email", "test@example.com")?;
            Ok(Self {
                dir,
                repo,
                time: 1_700_000_000,
            })
        }

        fn root(&self) -> PathBuf {
            self.dir.path().canonicalize().unwrap()
        }

        /// Write files, drop `removed` from the index, and commit.
        fn commit(&mut self, message: &str, files: &[(&str, &str)], removed: &[&str]) -> Result<Oid> {
            let mut index = self.repo.index()?;
            for (path, content) in files {
                let full = self.dir.path().join(path);
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&full, content)?;
                index.add_path(Path::new(path))?;
            }
            for path in removed {
                std::fs::remove_file(self.dir.path().join(path))?;
                index.remove_path(Path::new(path))?;
            }
            index.write()?;
            let tree = self.repo.find_tree(index.write_tree()?)?;

            self.time += 60;
            let sig = git2::Signature::new("Test User", "test@example.com", &git2::Time::new(self.time, 0))?;
            let parents = match self.repo.head() {
                Ok(head) => vec![head.peel_to_commit()?],
                Err(_) => Vec::new(),
            };
            let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
            Ok(self.repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)?)
        }
    }

    #[test]
    fn test_find_root() -> Result<()> {
        let mut repo = TestRepo::new()?;
        repo.commit("init", &[("pkg/a.py", "x = 1\n")], &[])?;
        let source = LibGitSource::new();

        assert_eq!(source.find_root(&repo.root().join("pkg")), Some(repo.root()));

        let outside = tempdir()?;
        assert_eq!(source.find_root(outside.path()), None);
        Ok(())
    }

    #[test]
    fn test_file_log_newest_first_with_statuses() -> Result<()> {
        let mut repo = TestRepo::new()?;
        repo.commit("add a", &[("a.py", "# TODO one\n")], &[])?;
        repo.commit("unrelated", &[("b.py", "pass\n")], &[])?;
        repo.commit("edit a", &[("a.py", "# TODO two\n")], &[])?;

        let log = LibGitSource::new().file_log(&repo.root(), "a.py")?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].subject, "edit a");
        assert_eq!(log[0].statuses, vec![FileStatus::new("M")]);
        assert_eq!(log[1].subject, "add a");
        assert_eq!(log[1].statuses, vec![FileStatus::new("A")]);
        assert_eq!(log[0].author, "Test User");
        assert_eq!(log[0].email, "test@example.com");
        assert!(log[0].timestamp > log[1].timestamp);
        Ok(())
    }

    #[test]
    fn test_file_log_follows_rename() -> Result<()> {
        let body = "import os\n\n# TODO keep me\n\ndef main():\n    return os.getcwd()\n";
        let mut repo = TestRepo::new()?;
        repo.commit("create", &[("old.py", body)], &[])?;
        repo.commit("rename", &[("new.py", body)], &["old.py"])?;
        let touched = format!("{body}# TODO later\n");
        repo.commit("touch", &[("new.py", touched.as_str())], &[])?;

        let log = LibGitSource::new().file_log(&repo.root(), "new.py")?;
        let subjects: Vec<_> = log.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["touch", "rename", "create"]);
        assert_eq!(log[1].renamed_from(), Some("old.py"));
        Ok(())
    }

    #[test]
    fn test_read_at_revision() -> Result<()> {
        let mut repo = TestRepo::new()?;
        let first = repo.commit("v1", &[("a.py", "# TODO v1\n")], &[])?;
        repo.commit("v2", &[("a.py", "# TODO v2\n")], &[])?;
        let source = LibGitSource::new();

        let content = source.read_at_revision(&repo.root(), &first.to_string(), "a.py")?;
        assert_eq!(content, "# TODO v1\n");

        let missing = source.read_at_revision(&repo.root(), &first.to_string(), "nope.py");
        assert!(matches!(missing, Err(HistoryError::SnapshotMissing { .. })));

        let bad = source.read_at_revision(&repo.root(), "not-a-hash", "a.py");
        assert!(bad.is_err());
        Ok(())
    }

    #[test]
    fn test_file_log_outside_repo() -> Result<()> {
        let dir = tempdir()?;
        let result = LibGitSource::new().file_log(dir.path(), "a.py");
        assert!(result.is_err());
        Ok(())
    }
}
