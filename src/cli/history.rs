//! History command - trace TODO additions and removals across a file's commits

use super::{emit, resolve_format};
use crate::config::ProjectConfig;
use crate::history::{HistoryOptions, TodoHistory};
use crate::reporters::{report_history, OutputFormat};
use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Flags of the `history` subcommand, after global flag resolution
#[derive(Debug, Clone, Copy)]
pub struct HistoryArgs<'a> {
    pub format: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub backend: Option<&'a str>,
    pub pattern: Option<&'a str>,
    pub newest_first: bool,
    pub max_revisions: Option<usize>,
    pub workers: usize,
}

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

pub fn run(file: &Path, config: &ProjectConfig, args: HistoryArgs<'_>) -> Result<()> {
    if !file.is_file() {
        bail!(
            "`history` needs a file, got {} (usage: whattodo history <FILE>)",
            file.display()
        );
    }

    let extractor = config.extractor(args.pattern)?;
    let backend = config.backend(args.backend)?;
    let format = resolve_format(args.format, args.output, config, OutputFormat::Text)?;
    if format == OutputFormat::Tsv {
        bail!("TSV output is only available for `scan`; use text, markdown or json");
    }

    let options = HistoryOptions {
        workers: args.workers,
        max_revisions: args
            .max_revisions
            .or(config.history.max_revisions)
            .unwrap_or(0),
    };

    let source = backend.source();
    let history = TodoHistory::new(source.as_ref(), extractor).with_options(options);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message(format!(
        "Reading history of {} ({})...",
        file.display(),
        backend
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut events = history.reconcile(file);

    spinner.finish_with_message(format!(
        "{}Found {} commits that changed TODOs",
        style("✓ ").green(),
        events.len()
    ));

    let newest_first = args.newest_first || config.defaults.newest_first.unwrap_or(false);
    if newest_first {
        events.reverse();
    }

    let rendered = report_history(&events, format)
        .with_context(|| format!("Failed to render history as {format}"))?;
    emit(&rendered, args.output, &format!("{} TODO changes", events.len()))
}
