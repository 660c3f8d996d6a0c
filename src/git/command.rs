//! History source that shells out to the `git` binary
//!
//! Uses `git log --follow --name-status` with a control-character delimited
//! format so subjects containing `|` or tabs parse correctly. Git is run with
//! `core.quotePath=false`; paths it still quotes (tabs, quotes, backslashes)
//! are unquoted before use.

use super::HistorySource;
use crate::error::{HistoryError, HistoryResult};
use crate::models::{FileStatus, LogEntry};
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Starts a commit header line
const RECORD_SEP: char = '\x1e';
/// Separates header fields
const FIELD_SEP: char = '\x1f';

const LOG_FORMAT: &str = "--format=%x1e%H%x1f%an%x1f%ae%x1f%at%x1f%s";

/// Keep non-ASCII path bytes verbatim in git's output
const GIT_CONFIG: [&str; 2] = ["-c", "core.quotePath=false"];

/// [`HistorySource`] that runs `git` as a subprocess.
#[derive(Debug, Clone)]
pub struct GitCommandSource {
    program: PathBuf,
}

impl Default for GitCommandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCommandSource {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git in `dir` and return stdout, or an error carrying stderr.
    fn run(&self, dir: &Path, args: &[&str]) -> HistoryResult<Vec<u8>> {
        let output = Command::new(&self.program)
            .args(GIT_CONFIG)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HistoryError::unavailable(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::unavailable(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or(""),
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl HistorySource for GitCommandSource {
    fn name(&self) -> &'static str {
        "git"
    }

    fn find_root(&self, start: &Path) -> Option<PathBuf> {
        let stdout = self.run(start, &["rev-parse", "--show-toplevel"]).ok()?;
        let root = String::from_utf8(stdout).ok()?;
        let root = PathBuf::from(root.trim());
        if root.as_os_str().is_empty() {
            return None;
        }
        Some(root.canonicalize().unwrap_or(root))
    }

    fn file_log(&self, root: &Path, relative_path: &str) -> HistoryResult<Vec<LogEntry>> {
        let stdout = self.run(
            root,
            &["log", "--follow", "--name-status", LOG_FORMAT, "--", relative_path],
        )?;
        Ok(parse_log(&String::from_utf8_lossy(&stdout)))
    }

    fn read_at_revision(&self, root: &Path, revision: &str, path: &str) -> HistoryResult<String> {
        // Reject values that git would read as flags
        if revision.starts_with('-') {
            return Err(HistoryError::snapshot_missing(revision, path));
        }
        let object = format!("{revision}:{path}");
        match self.run(root, &["show", &object]) {
            Ok(stdout) => Ok(String::from_utf8_lossy(&stdout).into_owned()),
            Err(e) => {
                debug!("git show {} failed: {}", object, e);
                Err(HistoryError::snapshot_missing(revision, path))
            }
        }
    }
}

/// Parse `git log --name-status` output produced with [`LOG_FORMAT`].
///
/// Malformed header lines are skipped together with their status lines;
/// the rest of the log is kept.
pub(crate) fn parse_log(output: &str) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    // Status lines belong to the last header only if that header parsed
    let mut accepting = false;

    for line in output.lines() {
        if let Some(header) = line.strip_prefix(RECORD_SEP) {
            match parse_header(header) {
                Ok(entry) => {
                    entries.push(entry);
                    accepting = true;
                }
                Err(e) => {
                    warn!("Skipping log entry: {}", e);
                    accepting = false;
                }
            }
            continue;
        }

        if line.trim().is_empty() || !accepting {
            continue;
        }
        if let (Some(entry), Some(status)) = (entries.last_mut(), parse_status(line)) {
            entry.statuses.push(status);
        }
    }

    entries
}

fn parse_header(header: &str) -> HistoryResult<LogEntry> {
    let malformed = || HistoryError::MalformedLogEntry {
        line: header.replace(FIELD_SEP, "|"),
    };

    let fields: Vec<&str> = header.splitn(5, FIELD_SEP).collect();
    let &[id, author, email, timestamp, subject] = fields.as_slice() else {
        return Err(malformed());
    };
    if id.is_empty() {
        return Err(malformed());
    }
    let seconds: i64 = timestamp.trim().parse().map_err(|_| malformed())?;
    let timestamp = Utc.timestamp_opt(seconds, 0).single().ok_or_else(malformed)?;

    Ok(LogEntry::new(id, author, email, timestamp, subject))
}

/// `M\tpath`, `R100\told\tnew`, `C75\tsrc\tdst`
fn parse_status(line: &str) -> Option<FileStatus> {
    let mut parts = line.split('\t');
    let code = parts.next()?.trim();
    let first = parts.next()?;
    let second = parts.next();

    let old_path = match (code.chars().next(), second) {
        (Some('R' | 'C'), Some(_)) => Some(unquote_path(first)),
        _ => None,
    };
    Some(FileStatus {
        code: code.to_string(),
        old_path,
    })
}

/// Undo git's C-style path quoting: `"a\tb"`, `"se\303\261al.py"`.
/// Unquoted paths are returned unchanged.
fn unquote_path(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some((&escape, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match escape {
            b'0'..=b'7' => {
                // Three octal digits encode one raw byte
                let digits: Vec<u8> = std::iter::once(escape)
                    .chain(rest.iter().copied().take(2).take_while(|d| (b'0'..=b'7').contains(d)))
                    .collect();
                rest = &rest[digits.len() - 1..];
                let value = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                bytes.push(value as u8);
            }
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'v' => bytes.push(0x0b),
            other => bytes.push(other),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
