//! Scan command - list TODO comments in the working tree

use super::{emit, resolve_format};
use crate::config::ProjectConfig;
use crate::reporters::{report_scan, OutputFormat};
use crate::todo;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn run(
    path: &Path,
    config: &ProjectConfig,
    extensions: &[String],
    pattern: Option<&str>,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let extractor = config.scan_extractor(pattern)?;
    let options = config.scan_options(extensions);
    // Unknown output extensions get TSV
    let format = resolve_format(format, output, config, OutputFormat::Tsv)?;

    info!(
        "Scanning {} for .{} files",
        path.display(),
        options.extensions.join(", .")
    );
    let todos = todo::scan(path, &options, &extractor)?;

    let rendered = report_scan(&todos, format)?;
    emit(&rendered, output, &format!("{} TODOs", todos.len()))
}
