//! TODO history reconstruction
//!
//! Reconstructs when each TODO comment in a file appeared and disappeared:
//!
//! 1. Locate the repository and the file's repo-relative path
//! 2. Enumerate the revisions that touched the file, following renames
//! 3. Fetch the file's content at each revision (in parallel)
//! 4. Fold the per-revision TODO sets into add/remove events, oldest first
//!
//! ```no_run
//! use whattodo::git::LibGitSource;
//! use whattodo::history::TodoHistory;
//! use whattodo::todo::TodoExtractor;
//! use std::path::Path;
//!
//! let source = LibGitSource::new();
//! let history = TodoHistory::new(&source, TodoExtractor::default());
//! for event in history.reconcile(Path::new("src/app.py")) {
//!     println!("{} {:?}", event.revision.short_id(), event.todos);
//! }
//! ```

mod reconcile;
mod revisions;

pub use reconcile::{reconcile, replay};
pub use revisions::{enumerate_revisions, follow_renames, locate, RepoFile};

use crate::git::HistorySource;
use crate::models::{ReconciliationEvent, Revision};
use crate::todo::TodoExtractor;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tuning knobs for a history run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Snapshot fetch threads; 1 fetches sequentially
    pub workers: usize,
    /// Only look at the newest N revisions (0 = all)
    pub max_revisions: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            max_revisions: 0,
        }
    }
}

/// Reconstructs TODO history for files using a [`HistorySource`].
pub struct TodoHistory<'a> {
    source: &'a dyn HistorySource,
    extractor: TodoExtractor,
    options: HistoryOptions,
}

impl<'a> TodoHistory<'a> {
    pub fn new(source: &'a dyn HistorySource, extractor: TodoExtractor) -> Self {
        Self {
            source,
            extractor,
            options: HistoryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HistoryOptions) -> Self {
        self.options = options;
        self
    }

    /// Revisions that touched `file`, newest first, with historical paths.
    ///
    /// Empty when the file is not in a repository or its history cannot be
    /// read. Never errors.
    pub fn revisions(&self, file: &Path) -> Vec<Revision> {
        let Some(repo_file) = locate(self.source, file) else {
            return Vec::new();
        };
        self.limit(enumerate_revisions(self.source, &repo_file))
    }

    /// TODO change events for `file`, oldest first.
    pub fn reconcile(&self, file: &Path) -> Vec<ReconciliationEvent> {
        let start = Instant::now();
        let Some(repo_file) = locate(self.source, file) else {
            info!("{} is not tracked by a repository", file.display());
            return Vec::new();
        };

        let mut revisions = self.limit(enumerate_revisions(self.source, &repo_file));
        revisions.reverse();
        debug!("{} revisions of {}", revisions.len(), repo_file.relative);

        let contents = self.fetch_snapshots(&repo_file.root, &revisions);
        let events = reconcile(&self.extractor, revisions.into_iter().zip(contents));

        info!(
            "Reconciled {} in {:?}: {} events ({})",
            repo_file.relative,
            start.elapsed(),
            events.len(),
            self.source.name()
        );
        events
    }

    fn limit(&self, mut revisions: Vec<Revision>) -> Vec<Revision> {
        if self.options.max_revisions > 0 {
            revisions.truncate(self.options.max_revisions);
        }
        revisions
    }

    /// Content of each revision's path, `None` where it cannot be read.
    /// Output order matches `revisions`.
    fn fetch_snapshots(&self, root: &Path, revisions: &[Revision]) -> Vec<Option<String>> {
        let fetch = |revision: &Revision| -> Option<String> {
            match self.source.read_at_revision(root, &revision.id, &revision.path) {
                Ok(content) => Some(content),
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            }
        };

        if self.options.workers > 1 && revisions.len() > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.workers)
                .build()
            {
                Ok(pool) => return pool.install(|| revisions.par_iter().map(&fetch).collect()),
                Err(e) => warn!("Failed to build fetch pool, fetching sequentially: {}", e),
            }
        }

        revisions.iter().map(&fetch).collect()
    }
}
