//! Shared helpers: build throwaway git repositories commit by commit

#![allow(dead_code)]

use git2::{Oid, Repository, Signature, Time};
use std::path::{Path, PathBuf};

pub struct TestRepo {
    dir: tempfile::TempDir,
    repo: Repository,
    time: i64,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Self {
            dir,
            repo,
            time: 1_700_000_000,
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `files`, delete `removed`, and commit everything as `author`.
    pub fn commit_as(
        &mut self,
        author: &str,
        message: &str,
        files: &[(&str, &str)],
        removed: &[&str],
    ) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        for path in removed {
            std::fs::remove_file(self.dir.path().join(path)).unwrap();
            index.remove_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        self.time += 3600;
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let sig = Signature::new(author, &email, &Time::new(self.time, 0)).unwrap();
        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn commit(&mut self, message: &str, files: &[(&str, &str)]) -> Oid {
        self.commit_as("Test User", message, files, &[])
    }

    /// Move `from` to `to` with the same content in one commit.
    pub fn rename(&mut self, message: &str, from: &str, to: &str) -> Oid {
        let content = std::fs::read_to_string(self.dir.path().join(from)).unwrap();
        self.commit_as("Test User", message, &[(to, content.as_str())], &[from])
    }
}

/// Whether a `git` binary is on PATH
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A Python module large enough for rename detection to be reliable
pub fn module_body(todos: &[&str]) -> String {
    let mut body = String::from(
        "import os\nimport sys\n\n\ndef main(argv):\n    \"\"\"Entry point.\"\"\"\n    for arg in argv:\n        print(os.path.basename(arg))\n    return 0\n\n\nclass Config:\n    verbose = False\n    retries = 3\n\n",
    );
    for todo in todos {
        body.push_str(&format!("# TODO: {todo}\n"));
    }
    body.push_str("\nif __name__ == \"__main__\":\n    sys.exit(main(sys.argv[1:]))\n");
    body
}
