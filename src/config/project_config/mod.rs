//! Project-level configuration support
//!
//! Loads per-project configuration from `whattodo.toml` (or
//! `.whattodorc.json`) in the scanned directory, or from an explicit
//! `--config` path.
//!
//! # Configuration Format
//!
//! ```toml
//! # whattodo.toml
//!
//! [todo]
//! pattern = '(?:^|\s)(?:#+|//+)\s*TODO[\s:-](.+)'
//!
//! [scan]
//! extensions = ["py", "sh"]
//! exclude = ["generated/"]
//!
//! [history]
//! backend = "git"
//! max_revisions = 200
//!
//! [defaults]
//! format = "markdown"
//! newest_first = true
//! workers = 4
//! ```

use crate::git::GitBackend;
use crate::todo::{
    ScanOptions, TodoExtractor, DEFAULT_EXTENSIONS, DEFAULT_SCAN_PATTERN, DEFAULT_TODO_PATTERN,
};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "whattodo.toml";
const JSON_CONFIG_FILE_NAME: &str = ".whattodorc.json";

/// Built-in default exclusion patterns for vendored/third-party code.
/// These are applied automatically unless `skip_defaults = true` in config.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/vendor/**",
    "**/node_modules/**",
    "**/third_party/**",
    "**/third-party/**",
    "**/site-packages/**",
    "**/.venv/**",
    "**/venv/**",
    "**/dist/**",
];

/// Written by `whattodo init`
pub const EXAMPLE_CONFIG: &str = r#"# whattodo configuration
# CLI flags override everything in this file.

[todo]
# Regex for TODO comments, matched case-insensitively.
# Group 1 is the TODO text; without groups the whole match is used.
# pattern = '(?:^|\s)(?:#+|//+)\s*TODO[\s:-](.+)'

[scan]
# File extensions to scan (without the dot)
extensions = ["py", "R", "sh", "c", "cpp", "pl"]
# Extra glob patterns to skip, relative to the scanned directory
exclude = []
# Set to true to disable the built-in vendor/node_modules/... exclusions
skip_defaults = false

[history]
# "libgit2" (built in) or "git" (runs the git binary)
backend = "libgit2"
# Only reconcile the newest N revisions (0 = all)
max_revisions = 0

[defaults]
# text, markdown, json (tsv for scan only)
format = "text"
newest_first = false
workers = 8
"#;

/// Project-level configuration loaded from whattodo.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub todo: TodoConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TodoConfig {
    /// Custom TODO regex
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Tree scanner settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScanConfig {
    /// Extensions to scan; empty means the built-in list
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Paths/patterns to exclude from scanning
    #[serde(default)]
    pub exclude: Vec<String>,

    /// If true, disable built-in default exclusion patterns
    #[serde(default)]
    pub skip_defaults: bool,
}

impl ScanConfig {
    /// Returns effective exclusion patterns (defaults + user patterns).
    /// If `skip_defaults` is true, only user patterns are returned.
    pub fn effective_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();

        if !self.skip_defaults {
            patterns.extend(DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()));
        }

        for p in &self.exclude {
            if !patterns.contains(p) {
                patterns.push(p.clone());
            }
        }

        patterns
    }

    /// Configured extensions, or the built-in list when none are set
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.extensions.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryConfig {
    /// `libgit2` or `git`
    #[serde(default)]
    pub backend: Option<String>,

    /// Newest N revisions to reconcile (0 = all)
    #[serde(default)]
    pub max_revisions: Option<usize>,
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, markdown, json, tsv)
    #[serde(default)]
    pub format: Option<String>,

    /// Show history newest first by default
    #[serde(default)]
    pub newest_first: Option<bool>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Load project configuration.
///
/// An `explicit` path must exist and parse. Otherwise `whattodo.toml` and
/// then `.whattodorc.json` are tried in `root`; a broken implicit file is
/// reported with a warning and defaults are used.
pub fn load_project_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<ProjectConfig> {
    if let Some(path) = explicit {
        let config = load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        debug!("Loaded project config from {}", path.display());
        return Ok(config);
    }

    // A file target reads config from its directory
    let dir = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };

    for name in [CONFIG_FILE_NAME, JSON_CONFIG_FILE_NAME] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return Ok(config);
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    Ok(ProjectConfig::default())
}

fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

impl ProjectConfig {
    /// TODO extractor for `pattern` (CLI), the configured pattern, or the default
    pub fn extractor(&self, pattern: Option<&str>) -> anyhow::Result<TodoExtractor> {
        self.extractor_or(pattern, DEFAULT_TODO_PATTERN)
    }

    /// Like [`ProjectConfig::extractor`], falling back to the scan pattern
    pub fn scan_extractor(&self, pattern: Option<&str>) -> anyhow::Result<TodoExtractor> {
        self.extractor_or(pattern, DEFAULT_SCAN_PATTERN)
    }

    fn extractor_or(&self, pattern: Option<&str>, default: &str) -> anyhow::Result<TodoExtractor> {
        let pattern = pattern.or(self.todo.pattern.as_deref()).unwrap_or(default);
        Ok(TodoExtractor::new(pattern)?)
    }

    /// Git backend from `backend` (CLI), config, or the default
    pub fn backend(&self, backend: Option<&str>) -> anyhow::Result<GitBackend> {
        match backend.or(self.history.backend.as_deref()) {
            Some(name) => name.parse(),
            None => Ok(GitBackend::default()),
        }
    }

    /// Scanner options, with CLI `extensions` taking precedence when given
    pub fn scan_options(&self, extensions: &[String]) -> ScanOptions {
        ScanOptions {
            extensions: if extensions.is_empty() {
                self.scan.effective_extensions()
            } else {
                extensions.to_vec()
            },
            exclude: self.scan.effective_patterns(),
        }
    }
}

/// Simple glob pattern matching
pub fn glob_match(pattern: &str, path: &str) -> bool {
    // Handle **/X/** patterns (match if path contains X as a directory)
    if let Some(middle) = pattern
        .strip_prefix("**/")
        .and_then(|rest| rest.strip_suffix("/**"))
    {
        return path.contains(&format!("/{}/", middle)) || path.starts_with(&format!("{}/", middle));
    }

    // `**/<suffix>`, where suffix may contain one `*` (e.g. **/*.min.py)
    if let Some((prefix, suffix)) = pattern.split_once("**") {
        let prefix = prefix.trim_end_matches('/');
        let suffix = suffix.trim_start_matches('/');

        if !prefix.is_empty() && !path.starts_with(prefix) {
            return false;
        }
        return match suffix.split_once('*') {
            None => suffix.is_empty() || path.ends_with(suffix),
            Some(("", after)) => path.ends_with(after),
            Some((before, after)) => path.contains(before) && path.ends_with(after),
        };
    }

    // Handle single * (match within segment)
    if let Some((prefix, suffix)) = pattern.split_once('*') {
        return path.starts_with(prefix) && path.ends_with(suffix);
    }

    // "vendor/" only matches "vendor/foo.py", NOT "src/vendor/foo.py"
    path.starts_with(pattern)
}
