//! Current-tree TODO scanner
//!
//! Walks a directory (respecting `.gitignore` and `.whattodoignore`), and
//! reports every TODO comment together with the line above it and the
//! nearest enclosing definition.

use super::extractor::TodoExtractor;
use crate::config::glob_match;
use crate::models::ScannedTodo;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "R", "sh", "c", "cpp", "pl"];

/// Scope used for TODOs outside any definition.
pub const TOP_LEVEL_SCOPE: &str = "main";

static SCOPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn scope_pattern() -> &'static Regex {
    SCOPE_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(def|class|namespace|fn|impl|struct|enum|trait)\s+\w+")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extensions without the leading dot (`py`, `rs`)
    pub extensions: Vec<String>,
    /// Glob patterns matched against paths relative to the scan root
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Whether `path` has one of the configured extensions. A leading dot in
    /// the configured value is ignored, so `.py` and `py` are equivalent.
    fn wants(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.') == ext)
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| glob_match(p, relative))
    }
}

/// Scan `root` (a directory or a single file) for TODO comments.
///
/// Files that cannot be read as UTF-8 are skipped. Results are ordered by
/// path, then line.
pub fn scan(root: &Path, options: &ScanOptions, extractor: &TodoExtractor) -> Result<Vec<ScannedTodo>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", root.display()))?;

    let files = collect_files(&root, options);
    debug!("Scanning {} files under {}", files.len(), root.display());

    let mut todos = Vec::new();
    for path in &files {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let modified = modified_time(path);
        let found = scan_content(path, &content, extractor, modified);
        for todo in &found {
            debug!("Found TODO in {} at line {} with scope {}", todo.path.display(), todo.line, todo.scope);
        }
        todos.extend(found);
    }

    todos.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)));
    info!("Found {} TODOs in {} files", todos.len(), files.len());
    Ok(todos)
}

/// Collect candidate files under `root`, respecting .gitignore
fn collect_files(root: &Path, options: &ScanOptions) -> Vec<PathBuf> {
    if root.is_file() {
        return if options.wants(root) { vec![root.to_path_buf()] } else { Vec::new() };
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(".whattodoignore");

    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() || !options.wants(path) {
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if options.is_excluded(&relative) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files
}

/// Find TODOs in one file's content.
pub fn scan_content(
    path: &Path,
    content: &str,
    extractor: &TodoExtractor,
    modified: Option<DateTime<Local>>,
) -> Vec<ScannedTodo> {
    let lines: Vec<&str> = content.lines().collect();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let todo = extractor.match_line(line)?;
            let context = if idx > 0 { lines[idx - 1].trim().to_string() } else { String::new() };
            Some(ScannedTodo {
                file: file.clone(),
                path: path.to_path_buf(),
                line: idx + 1,
                todo,
                context,
                scope: find_scope(&lines[..=idx]),
                modified,
            })
        })
        .collect()
}

/// Nearest definition line at or above the last line of `lines`.
pub fn find_scope(lines: &[&str]) -> String {
    lines
        .iter()
        .rev()
        .find(|line| scope_pattern().is_match(line))
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| TOP_LEVEL_SCOPE.to_string())
}

fn modified_time(path: &Path) -> Option<DateTime<Local>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}
